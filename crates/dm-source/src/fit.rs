use dm_core::grid::IndexGrid;

/// Rectangle d'ajustement de la source dans la grille utilisateur.
///
/// L'image occupe `[offset_x, offset_x + fit_w) × [offset_y, offset_y + fit_h)` ;
/// le complément est du remplissage. L'ancrage est fixé en haut à gauche,
/// le remplissage s'étend donc à droite et/ou en bas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fit {
    /// Fitted width in cells.
    pub fit_w: u32,
    /// Fitted height in cells.
    pub fit_h: u32,
    /// Horizontal anchor, always 0.
    pub offset_x: u32,
    /// Vertical anchor, always 0.
    pub offset_y: u32,
}

/// Calcule l'ajustement de `src_w × src_h` dans `grid_w × grid_h` en
/// préservant le ratio d'aspect.
///
/// Source plus large que la grille : `fit_w = grid_w`,
/// `fit_h = ⌊grid_w / src_ratio⌋`. Sinon : `fit_h = grid_h`,
/// `fit_w = ⌊grid_h · src_ratio⌋`. Chaque dimension est bornée à 1 pour
/// que le redimensionnement reste valide sur les ratios extrêmes.
///
/// # Example
/// ```
/// use dm_source::fit::fit_to_grid;
/// let fit = fit_to_grid(200, 100, 10, 10);
/// assert_eq!((fit.fit_w, fit.fit_h), (10, 5));
/// ```
#[must_use]
pub fn fit_to_grid(src_w: u32, src_h: u32, grid_w: u32, grid_h: u32) -> Fit {
    let src_ratio = f64::from(src_w) / f64::from(src_h);
    let grid_ratio = f64::from(grid_w) / f64::from(grid_h);

    let (fit_w, fit_h) = if src_ratio > grid_ratio {
        let h = (f64::from(grid_w) / src_ratio).floor() as u32;
        (grid_w, h.max(1))
    } else {
        let w = (f64::from(grid_h) * src_ratio).floor() as u32;
        (w.max(1), grid_h)
    };

    Fit {
        fit_w,
        fit_h,
        offset_x: 0,
        offset_y: 0,
    }
}

/// Construit la carte cellule → pixel pour un ajustement donné.
///
/// Les cellules du rectangle d'ajustement pointent vers le pixel de même
/// coordonnée dans l'image redimensionnée ; le reste est `None`.
///
/// # Example
/// ```
/// use dm_source::fit::{build_index_grid, fit_to_grid};
/// let fit = fit_to_grid(200, 100, 10, 10);
/// let index = build_index_grid(fit, 10, 10);
/// assert_eq!(index.get(0, 0), Some((0, 0)));
/// assert_eq!(index.get(0, 5), None); // padding row
/// ```
#[must_use]
pub fn build_index_grid(fit: Fit, grid_w: u32, grid_h: u32) -> IndexGrid {
    let mut index = IndexGrid::new(grid_w, grid_h);
    for y in 0..grid_h {
        for x in 0..grid_w {
            let inside_x = x >= fit.offset_x && x < fit.offset_x + fit.fit_w;
            let inside_y = y >= fit.offset_y && y < fit.offset_y + fit.fit_h;
            if inside_x && inside_y {
                index.cells[y as usize * grid_w as usize + x as usize] =
                    Some((x - fit.offset_x, y - fit.offset_y));
            }
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_source_pins_width() {
        let fit = fit_to_grid(200, 100, 10, 10);
        assert_eq!((fit.fit_w, fit.fit_h), (10, 5));
        assert_eq!((fit.offset_x, fit.offset_y), (0, 0));
    }

    #[test]
    fn tall_source_pins_height() {
        let fit = fit_to_grid(100, 200, 10, 10);
        assert_eq!((fit.fit_w, fit.fit_h), (5, 10));
    }

    #[test]
    fn matching_ratio_fills_the_grid() {
        let fit = fit_to_grid(300, 300, 16, 16);
        assert_eq!((fit.fit_w, fit.fit_h), (16, 16));
    }

    #[test]
    fn narrow_source_pads_right() {
        // Source narrower than the grid ratio: fit_w < grid_w.
        let fit = fit_to_grid(50, 100, 10, 10);
        assert!(fit.fit_w < 10);
        assert_eq!(fit.fit_h, 10);
    }

    #[test]
    fn extreme_ratio_clamps_to_one_cell() {
        let fit = fit_to_grid(1000, 1, 10, 10);
        assert_eq!((fit.fit_w, fit.fit_h), (10, 1));
        let fit = fit_to_grid(1, 1000, 10, 10);
        assert_eq!((fit.fit_w, fit.fit_h), (1, 10));
    }

    #[test]
    fn aspect_is_preserved_within_truncation() {
        for (sw, sh) in [(640u32, 480u32), (1920, 1080), (123, 457), (300, 200)] {
            let fit = fit_to_grid(sw, sh, 40, 40);
            let src_ratio = f64::from(sw) / f64::from(sh);
            let fit_ratio = f64::from(fit.fit_w) / f64::from(fit.fit_h);
            let tolerance = 1.0 / f64::from(fit.fit_w.min(fit.fit_h));
            assert!(
                (fit_ratio - src_ratio).abs() <= tolerance,
                "ratio {fit_ratio} trop loin de {src_ratio} pour {sw}×{sh}"
            );
        }
    }

    #[test]
    fn index_grid_is_a_contiguous_rectangle() {
        let fit = fit_to_grid(200, 100, 8, 8);
        let index = build_index_grid(fit, 8, 8);
        let present = index.cells.iter().filter(|c| c.is_some()).count();
        assert_eq!(present, (fit.fit_w * fit.fit_h) as usize);
        assert_eq!(index.get(fit.fit_w - 1, fit.fit_h - 1), Some((fit.fit_w - 1, fit.fit_h - 1)));
        assert_eq!(index.get(0, fit.fit_h), None);
    }
}
