use dm_core::color::rgb8_to_lab;
use dm_core::frame::FrameBuffer;
use dm_core::grid::{Cell, CellGrid, IndexGrid};
use dm_core::palette::Palette;
use rayon::prelude::*;

/// Apparie chaque cellule à l'entrée de palette la plus proche en Lab.
///
/// Cellule de remplissage → `Blank`. Sinon le pixel indexé de l'image
/// redimensionnée est converti en Lab et comparé à toute la palette
/// (distance au carré, première entrée gagnante en cas d'égalité).
/// Rangées traitées en parallèle, cellules séquentielles dans la rangée.
///
/// # Example
/// ```
/// use dm_core::frame::FrameBuffer;
/// use dm_core::grid::{Cell, IndexGrid};
/// use dm_core::palette::{Palette, PaletteEntry};
/// use dm_mosaic::quantize::match_to_palette;
///
/// let resized = FrameBuffer::new(2, 2);
/// let index = IndexGrid::new(2, 2); // all padding
/// let palette = Palette::new(vec![PaletteEntry::new("W", "White", 255, 255, 255)]);
/// let matched = match_to_palette(&resized, &index, &palette);
/// assert_eq!(matched.get(0, 0), Cell::Blank);
/// ```
#[must_use]
pub fn match_to_palette(resized: &FrameBuffer, index: &IndexGrid, palette: &Palette) -> CellGrid {
    let mut grid = CellGrid::new(index.width, index.height);
    let width = index.width as usize;
    if width == 0 {
        return grid;
    }

    grid.cells
        .par_chunks_exact_mut(width)
        .zip(index.cells.par_chunks_exact(width))
        .for_each(|(cell_row, index_row)| {
            for (cell, mapped) in cell_row.iter_mut().zip(index_row) {
                if let Some((sx, sy)) = *mapped {
                    let (r, g, b, _) = resized.pixel(sx, sy);
                    let lab = rgb8_to_lab(r, g, b);
                    *cell = match palette.nearest(lab) {
                        Some(ix) => Cell::Entry(ix),
                        None => Cell::Blank,
                    };
                }
            }
        });

    grid
}
