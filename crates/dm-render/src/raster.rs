use dm_core::frame::FrameBuffer;
use dm_core::grid::{Cell, CellGrid, ColorUsage};
use dm_core::palette::{Palette, PaletteEntry};
use rayon::prelude::*;

/// Côté d'une cellule rendue, en pixels.
pub const CELL_SIZE: u32 = 10;

/// Couleur du quadrillage entre cellules.
pub const GRID_LINE_RGB: [u8; 3] = [90, 90, 90];

/// Options de rasterisation.
#[derive(Clone, Copy, Debug)]
pub struct RasterOptions {
    /// Draw the 1-px gray border around each cell. On by default; the
    /// borderless variant must be requested explicitly.
    pub grid_lines: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self { grid_lines: true }
    }
}

/// Peint la grille appariée en image RGBA.
///
/// Sortie de `(width·10) × (height·10)` pixels : chaque cellule est un
/// carré plein de la couleur de son entrée, bordé d'un liseré gris d'un
/// pixel quand `grid_lines` est actif. Une bande de rangée de cellules
/// par tâche, jointes avant le retour.
///
/// # Example
/// ```
/// use dm_core::grid::CellGrid;
/// use dm_core::palette::Palette;
/// use dm_render::raster::{RasterOptions, render_mosaic};
/// let grid = CellGrid::new(4, 3);
/// let palette = Palette::new(vec![]);
/// let fb = render_mosaic(&grid, &palette, RasterOptions::default());
/// assert_eq!((fb.width, fb.height), (40, 30));
/// ```
#[must_use]
pub fn render_mosaic(grid: &CellGrid, palette: &Palette, opts: RasterOptions) -> FrameBuffer {
    let cell = CELL_SIZE as usize;
    let width_cells = grid.width as usize;
    let mut fb = FrameBuffer::new(grid.width * CELL_SIZE, grid.height * CELL_SIZE);
    if grid.is_empty() {
        return fb;
    }

    // Resolve the 8-bit colors once, outside the bands.
    let colors: Vec<[u8; 3]> = palette.entries().iter().map(PaletteEntry::rgb8).collect();
    let blank_rgb = palette.blank().rgb8();

    let stride = fb.stride();
    let band_size = stride * cell;

    fb.data
        .par_chunks_exact_mut(band_size)
        .enumerate()
        .for_each(|(gy, band)| {
            for gx in 0..width_cells {
                let rgb = match grid.cells[gy * width_cells + gx] {
                    Cell::Blank => blank_rgb,
                    Cell::Entry(ix) => colors[ix as usize],
                };
                for py in 0..cell {
                    let row_off = py * stride + gx * cell * 4;
                    for px in 0..cell {
                        let on_border = opts.grid_lines
                            && (px == 0 || py == 0 || px == cell - 1 || py == cell - 1);
                        let idx = row_off + px * 4;
                        let src = if on_border { &GRID_LINE_RGB } else { &rgb };
                        band[idx..idx + 3].copy_from_slice(src);
                        band[idx + 3] = 255;
                    }
                }
            }
        });

    fb
}

/// Statistiques d'utilisation : nombre de cellules par couleur.
///
/// Comptage par rangée en parallèle, shards fusionnés à la jointure.
/// Émission dans l'ordre de la palette, `BLANK` en dernier ; chaque
/// entrée émise porte le symbole assigné. La somme des comptes vaut
/// `width × height`.
#[must_use]
pub fn collect_usages(
    grid: &CellGrid,
    palette: &Palette,
    symbols: &[Option<char>],
) -> Vec<ColorUsage> {
    let width = grid.width as usize;
    let (counts, blank) = if width == 0 {
        (vec![0u64; palette.len()], 0u64)
    } else {
        grid.cells
            .par_chunks(width)
            .map(|row| {
                let mut counts = vec![0u64; palette.len()];
                let mut blank = 0u64;
                for cell in row {
                    match *cell {
                        Cell::Blank => blank += 1,
                        Cell::Entry(ix) => counts[ix as usize] += 1,
                    }
                }
                (counts, blank)
            })
            .reduce(
                || (vec![0u64; palette.len()], 0u64),
                |(mut counts, blank_a), (other, blank_b)| {
                    for (acc, add) in counts.iter_mut().zip(&other) {
                        *acc += add;
                    }
                    (counts, blank_a + blank_b)
                },
            )
    };

    let mut usages = Vec::new();
    for (ix, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let mut entry = palette.get(ix as u16).clone();
        entry.symbol = symbols.get(ix).copied().flatten();
        usages.push(ColorUsage { entry, count });
    }
    if blank > 0 {
        usages.push(ColorUsage {
            entry: palette.blank().clone(),
            count: blank,
        });
    }
    usages
}
