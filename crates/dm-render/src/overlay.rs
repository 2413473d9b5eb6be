use std::collections::HashMap;

use ab_glyph::{Font, FontRef, PxScale, point};
use dm_core::color::Lab;
use dm_core::error::MosaicError;
use dm_core::frame::FrameBuffer;
use dm_core::grid::{Cell, CellGrid};
use dm_core::palette::Palette;

use crate::raster::CELL_SIZE;

/// Taille de police en fraction du côté de cellule.
pub const SYMBOL_SCALE: f32 = 0.7;

/// Surimpression des symboles sur la mosaïque rasterisée.
///
/// Les masques alpha des glyphes sont pré-rasterisés une fois par symbole
/// distinct (atlas logiciel) ; la police n'est pas conservée au-delà de la
/// construction. L'encre est choisie cellule par cellule : noire sur fond
/// clair (Lab-L > 0.5), blanche sinon.
#[derive(Debug)]
pub struct SymbolPainter {
    cell: u32,
    /// Maps a symbol to its alpha mask (size = cell × cell).
    glyphs: HashMap<char, Vec<u8>>,
}

impl SymbolPainter {
    /// Parse la police et pré-rasterise les symboles demandés.
    ///
    /// Un glyphe absent de la police est signalé et ignoré — les cellules
    /// concernées restent sans symbole, le rendu continue.
    ///
    /// # Errors
    /// `MosaicError::FontLoadFailed` si les bytes ne sont pas une police
    /// exploitable.
    pub fn new<I>(font_data: &[u8], symbols: I) -> Result<Self, MosaicError>
    where
        I: IntoIterator<Item = char>,
    {
        let font = FontRef::try_from_slice(font_data)
            .map_err(|e| MosaicError::FontLoadFailed(e.to_string()))?;

        let cell = CELL_SIZE;
        let scale = PxScale::from(SYMBOL_SCALE * cell as f32);
        // Baseline inside the cell, measured from its top-left corner.
        let x_off = cell as f32 / 5.0;
        let baseline = 5.0 * cell as f32 / 6.0;

        let mut glyphs: HashMap<char, Vec<u8>> = HashMap::new();
        for ch in symbols {
            if glyphs.contains_key(&ch) {
                continue;
            }
            // glyph_id 0 is .notdef — skip rather than print placeholder boxes.
            let gid = font.glyph_id(ch);
            if gid.0 == 0 {
                log::warn!("Glyphe {ch:?} absent de la police — cellules laissées sans symbole");
                continue;
            }

            let mut mask = vec![0u8; (cell * cell) as usize];
            let glyph = gid.with_scale_and_position(scale, point(x_off, baseline));
            if let Some(outline) = font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                #[allow(clippy::cast_possible_wrap)]
                outline.draw(|x, y, v| {
                    let px = (x as i32 + bounds.min.x as i32).max(0) as u32;
                    let py = (y as i32 + bounds.min.y as i32).max(0) as u32;
                    if px < cell && py < cell {
                        let idx = (py * cell + px) as usize;
                        mask[idx] = mask[idx].max((v * 255.0).round() as u8);
                    }
                });
            }
            glyphs.insert(ch, mask);
        }

        Ok(Self { cell, glyphs })
    }

    /// Encre du symbole selon la clarté du fond.
    #[inline]
    #[must_use]
    pub fn ink_for(background: Lab) -> [u8; 3] {
        if background.l > 0.5 {
            [0, 0, 0]
        } else {
            [255, 255, 255]
        }
    }

    /// Dessine le symbole de chaque cellule non `Blank` sur la mosaïque.
    ///
    /// `symbols` est indexé comme la palette. Les cellules sans symbole
    /// assigné ou dont le glyphe n'a pas pu être rasterisé sont sautées.
    pub fn paint(
        &self,
        fb: &mut FrameBuffer,
        grid: &CellGrid,
        palette: &Palette,
        symbols: &[Option<char>],
    ) {
        let expected_w = grid.width * self.cell;
        let expected_h = grid.height * self.cell;
        if fb.width != expected_w || fb.height != expected_h {
            log::error!(
                "SymbolPainter dimension mismatch: fb={}x{} expected={}x{}",
                fb.width,
                fb.height,
                expected_w,
                expected_h
            );
            return;
        }

        let cell = self.cell as usize;
        let stride = fb.stride();

        for gy in 0..grid.height {
            for gx in 0..grid.width {
                let Cell::Entry(ix) = grid.get(gx, gy) else {
                    continue;
                };
                let Some(ch) = symbols.get(ix as usize).copied().flatten() else {
                    continue;
                };
                let Some(mask) = self.glyphs.get(&ch) else {
                    continue;
                };

                let ink = Self::ink_for(palette.get(ix).lab);
                let origin = gy as usize * cell * stride + gx as usize * cell * 4;
                for my in 0..cell {
                    let row_off = origin + my * stride;
                    for mx in 0..cell {
                        let alpha = mask[my * cell + mx];
                        if alpha == 0 {
                            continue;
                        }
                        let af = f32::from(alpha) / 255.0;
                        let idx = row_off + mx * 4;
                        for c in 0..3 {
                            let bg = f32::from(fb.data[idx + c]);
                            fb.data[idx + c] = (f32::from(ink[c]) * af + bg * (1.0 - af)) as u8;
                        }
                    }
                }
            }
        }
    }
}
