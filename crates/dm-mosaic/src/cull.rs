use dm_core::grid::{Cell, CellGrid};
use dm_core::palette::Palette;

/// Seuil sous lequel une couleur est considérée rare.
pub const DEFAULT_MIN_COUNT: u64 = 30;

/// Compte les cellules par entrée de palette.
///
/// Retourne `(counts, blank)` : `counts[ix]` pour chaque index de palette,
/// et le nombre de cellules `Blank` à part.
///
/// # Example
/// ```
/// use dm_core::grid::{Cell, CellGrid};
/// use dm_mosaic::cull::count_cells;
/// let mut grid = CellGrid::new(2, 2);
/// grid.set(0, 0, Cell::Entry(0));
/// let (counts, blank) = count_cells(&grid, 1);
/// assert_eq!(counts[0], 1);
/// assert_eq!(blank, 3);
/// ```
#[must_use]
pub fn count_cells(grid: &CellGrid, palette_len: usize) -> (Vec<u64>, u64) {
    let mut counts = vec![0u64; palette_len];
    let mut blank = 0u64;
    for cell in &grid.cells {
        match *cell {
            Cell::Blank => blank += 1,
            Cell::Entry(ix) => counts[ix as usize] += 1,
        }
    }
    (counts, blank)
}

/// Consolide les couleurs rares de la grille appariée.
///
/// Les entrées présentes sont partagées en majeures (compte ≥ `min_count`)
/// et mineures ; `Blank` n'entre pas dans le partage. Chaque cellule
/// mineure est réappariée à la majeure la plus proche en Lab (distance au
/// carré, première gagnante dans l'ordre des majeures). Sans majeure, la
/// grille est laissée telle quelle.
///
/// Mutation en place : la grille a un propriétaire unique pendant cette
/// fenêtre du pipeline.
pub fn cull_rare(grid: &mut CellGrid, palette: &Palette, min_count: u64) {
    let (counts, _) = count_cells(grid, palette.len());

    let major: Vec<u16> = counts
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c >= min_count)
        .map(|(ix, _)| ix as u16)
        .collect();
    let minor_present = counts
        .iter()
        .any(|&c| c > 0 && c < min_count);

    if !minor_present {
        return;
    }
    if major.is_empty() {
        log::warn!("Aucune couleur majeure (seuil {min_count}) — consolidation ignorée");
        return;
    }

    // Remap table over palette indices; identity for majors.
    let mut remap: Vec<u16> = (0..palette.len() as u16).collect();
    let mut remapped = 0u64;
    for (ix, &count) in counts.iter().enumerate() {
        if count == 0 || count >= min_count {
            continue;
        }
        let lab = palette.get(ix as u16).lab;
        let mut best = major[0];
        let mut best_d = palette.get(best).lab.dist_sq(lab);
        for &m in &major[1..] {
            let d = palette.get(m).lab.dist_sq(lab);
            if d < best_d {
                best = m;
                best_d = d;
            }
        }
        remap[ix] = best;
        remapped += count;
    }

    for cell in &mut grid.cells {
        if let Cell::Entry(ix) = *cell {
            *cell = Cell::Entry(remap[ix as usize]);
        }
    }

    log::debug!(
        "Consolidation : {remapped} cellules réappariées vers {} couleurs majeures",
        major.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_core::palette::PaletteEntry;

    fn palette_xyz() -> Palette {
        Palette::new(vec![
            PaletteEntry::new("X", "Crimson", 220, 20, 60),
            PaletteEntry::new("Y", "Scarlet", 255, 36, 0),
            PaletteEntry::new("Z", "Navy", 0, 0, 128),
        ])
    }

    fn grid_with_counts(palette_len: u16, counts: &[(u16, u64)]) -> CellGrid {
        let total: u64 = counts.iter().map(|&(_, c)| c).sum();
        let width = 10u32;
        let height = total.div_ceil(u64::from(width)) as u32;
        let mut grid = CellGrid::new(width, height.max(1));
        let mut flat = 0usize;
        for &(ix, count) in counts {
            assert!(ix < palette_len);
            for _ in 0..count {
                grid.cells[flat] = Cell::Entry(ix);
                flat += 1;
            }
        }
        grid
    }

    #[test]
    fn rare_color_is_remapped_to_nearest_major() {
        let palette = palette_xyz();
        // 99 scarlet, 1 crimson: crimson is rare and perceptually closer
        // to scarlet than to navy.
        let mut grid = grid_with_counts(3, &[(1, 99), (0, 1)]);
        cull_rare(&mut grid, &palette, 30);
        let (counts, _) = count_cells(&grid, palette.len());
        assert_eq!(counts[0], 0, "aucune cellule mineure ne doit rester");
        assert_eq!(counts[1], 100);
        assert_eq!(counts[2], 0);
    }

    #[test]
    fn all_rare_skips_the_cull() {
        let palette = palette_xyz();
        let mut grid = grid_with_counts(3, &[(0, 5), (2, 5)]);
        let before = grid.cells.clone();
        cull_rare(&mut grid, &palette, 30);
        assert_eq!(grid.cells, before);
    }

    #[test]
    fn no_minor_color_is_a_no_op() {
        let palette = palette_xyz();
        let mut grid = grid_with_counts(3, &[(0, 40), (2, 60)]);
        let before = grid.cells.clone();
        cull_rare(&mut grid, &palette, 30);
        assert_eq!(grid.cells, before);
    }

    #[test]
    fn blank_cells_are_excluded_and_untouched() {
        let palette = palette_xyz();
        // 50 scarlet + 50 blank on a 10×10 grid; blanks stay blank even
        // though 50 ≥ min_count.
        let mut grid = CellGrid::new(10, 10);
        for cell in grid.cells.iter_mut().take(50) {
            *cell = Cell::Entry(1);
        }
        cull_rare(&mut grid, &palette, 30);
        let (counts, blank) = count_cells(&grid, palette.len());
        assert_eq!(counts[1], 50);
        assert_eq!(blank, 50);
    }

    #[test]
    fn post_cull_every_cell_is_major_or_blank() {
        let palette = palette_xyz();
        let mut grid = grid_with_counts(3, &[(0, 3), (1, 45), (2, 31)]);
        cull_rare(&mut grid, &palette, 30);
        let (counts, _) = count_cells(&grid, palette.len());
        for (ix, &count) in counts.iter().enumerate() {
            assert!(
                count == 0 || count >= 30,
                "l'entrée {ix} reste mineure après consolidation ({count})"
            );
        }
    }
}
