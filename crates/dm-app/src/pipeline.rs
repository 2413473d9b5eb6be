use std::time::Instant;

use dm_core::cancel::CancelToken;
use dm_core::error::MosaicError;
use dm_core::frame::FrameBuffer;
use dm_core::grid::ColorUsage;
use dm_core::palette::Palette;
use dm_core::symbols::assign_symbols;
use dm_mosaic::cull::{DEFAULT_MIN_COUNT, cull_rare};
use dm_mosaic::denoise::median3x3;
use dm_mosaic::quantize::match_to_palette;
use dm_mosaic::size::{MosaicSizeInfo, grid_cells, report};
use dm_render::overlay::SymbolPainter;
use dm_render::raster::{RasterOptions, collect_usages, render_mosaic};
use dm_source::decode::decode_bytes;
use dm_source::fit::{build_index_grid, fit_to_grid};
use dm_source::resize::resize_frame;

/// Borne supérieure des dimensions de base, en cm.
pub const MAX_BASE_CM: u32 = 2000;

/// Résultat complet d'une requête : la mosaïque rasterisée, la liste des
/// couleurs utilisées (symboles assignés), et le rapport de taille.
#[derive(Debug)]
pub struct MosaicChart {
    /// Rendered mosaic, `(grid_w·10) × (grid_h·10)` RGBA.
    pub image: FrameBuffer,
    /// Colors used, palette order, BLANK last.
    pub usages: Vec<ColorUsage>,
    /// Physical and cell-count dimensions.
    pub size: MosaicSizeInfo,
}

/// Options par requête.
pub struct ProcessOptions<'a> {
    /// TTF bytes for the symbol overlay. Without a font the chart is
    /// returned symbol-less.
    pub font_data: Option<&'a [u8]>,
    /// Rasterization options (grid lines on by default).
    pub raster: RasterOptions,
    /// Rare-color consolidation threshold.
    pub min_count: u64,
    /// Request-scope cancellation signal.
    pub cancel: CancelToken,
}

impl Default for ProcessOptions<'_> {
    fn default() -> Self {
        Self {
            font_data: None,
            raster: RasterOptions::default(),
            min_count: DEFAULT_MIN_COUNT,
            cancel: CancelToken::new(),
        }
    }
}

/// Convertit une image source en schéma de mosaïque.
///
/// Enchaînement strict : décodage → ajustement → redimensionnement →
/// filtre médian → appariement palette → consolidation des couleurs
/// rares → symboles → rasterisation → surimpression. Le token
/// d'annulation est vérifié entre chaque étape.
///
/// L'échec du chargement de la police n'est pas fatal : le schéma est
/// retourné sans symboles et l'échec est journalisé.
///
/// # Errors
/// `InvalidDimensions`, `EmptyPalette`, `DecodeFailed`, `ResizeFailed`,
/// ou `Cancelled`.
pub fn process(
    raw: &[u8],
    palette: &Palette,
    width_cm: u32,
    height_cm: u32,
    opts: &ProcessOptions<'_>,
) -> Result<MosaicChart, MosaicError> {
    if !(1..=MAX_BASE_CM).contains(&width_cm) || !(1..=MAX_BASE_CM).contains(&height_cm) {
        return Err(MosaicError::InvalidDimensions {
            width: width_cm,
            height: height_cm,
        });
    }
    if palette.is_empty() {
        return Err(MosaicError::EmptyPalette);
    }

    let decoded = decode_bytes(raw)?;
    opts.cancel.checkpoint()?;

    let grid_w = grid_cells(width_cm);
    let grid_h = grid_cells(height_cm);
    let fit = fit_to_grid(decoded.width, decoded.height, grid_w, grid_h);
    let index = build_index_grid(fit, grid_w, grid_h);
    log::debug!(
        "Grille {grid_w}×{grid_h}, image ajustée {}×{}",
        fit.fit_w,
        fit.fit_h
    );

    let resized = resize_frame(&decoded, fit.fit_w, fit.fit_h)
        .map_err(|e| MosaicError::ResizeFailed(format!("{e:#}")))?;
    opts.cancel.checkpoint()?;

    let start = Instant::now();
    let denoised = median3x3(&resized);
    log::debug!("MedianFilter : {:?}", start.elapsed());
    opts.cancel.checkpoint()?;

    let start = Instant::now();
    let mut matched = match_to_palette(&denoised, &index, palette);
    log::debug!("MatchToPalette : {:?}", start.elapsed());
    opts.cancel.checkpoint()?;

    cull_rare(&mut matched, palette, opts.min_count);
    let symbols = assign_symbols(&matched, palette.len());
    opts.cancel.checkpoint()?;

    let start = Instant::now();
    let mut image = render_mosaic(&matched, palette, opts.raster);
    let usages = collect_usages(&matched, palette, &symbols);
    log::debug!("RenderMosaic : {:?}", start.elapsed());
    opts.cancel.checkpoint()?;

    if let Some(font_data) = opts.font_data {
        match SymbolPainter::new(font_data, symbols.iter().copied().flatten()) {
            Ok(painter) => painter.paint(&mut image, &matched, palette, &symbols),
            Err(e) => log::warn!("Schéma rendu sans symboles : {e}"),
        }
    }

    let size = report(width_cm, height_cm, grid_w, grid_h, fit.fit_w, fit.fit_h);
    Ok(MosaicChart {
        image,
        usages,
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_core::palette::{BLANK_CODE, PaletteEntry};
    use std::io::Cursor;

    fn png_from_rows(width: u32, height: u32, rows: &[[u8; 4]]) -> Vec<u8> {
        assert_eq!(rows.len(), height as usize);
        let mut img = image::RgbaImage::new(width, height);
        for (y, rgba) in rows.iter().enumerate() {
            for x in 0..width {
                img.put_pixel(x, y as u32, image::Rgba(*rgba));
            }
        }
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn white_png(width: u32, height: u32) -> Vec<u8> {
        png_from_rows(
            width,
            height,
            &vec![[255u8, 255, 255, 255]; height as usize],
        )
    }

    #[test]
    fn white_source_fills_a_square_grid() {
        let palette = Palette::new(vec![PaletteEntry::new("W", "White", 255, 255, 255)]);
        let chart = process(
            &white_png(10, 10),
            &palette,
            4,
            4,
            &ProcessOptions::default(),
        )
        .unwrap();

        assert_eq!((chart.image.width, chart.image.height), (160, 160));
        assert_eq!(chart.usages.len(), 1);
        assert_eq!(chart.usages[0].entry.code, "W");
        assert_eq!(chart.usages[0].count, 256);
        assert_eq!(chart.usages[0].entry.symbol, Some('A'));
        assert_eq!(chart.size.grid_width, 16);
        assert_eq!(chart.size.img_width_cells, 16);
        assert_eq!(chart.size.img_width_cm, 4);
        // Interior of a cell is white, its edge carries the grid line.
        assert_eq!(chart.image.pixel(5, 5), (255, 255, 255, 255));
        assert_eq!(chart.image.pixel(0, 0), (90, 90, 90, 255));
    }

    #[test]
    fn two_tone_source_splits_top_and_bottom() {
        let palette = Palette::new(vec![
            PaletteEntry::new("R", "Red", 255, 0, 0),
            PaletteEntry::new("B", "Blue", 0, 0, 255),
        ]);
        let raw = png_from_rows(2, 2, &[[255, 0, 0, 255], [0, 0, 255, 255]]);
        let chart = process(&raw, &palette, 4, 4, &ProcessOptions::default()).unwrap();

        let total: u64 = chart.usages.iter().map(|u| u.count).sum();
        assert_eq!(total, 256);
        assert_eq!(chart.usages.len(), 2, "deux couleurs, pas de BLANK");
        for usage in &chart.usages {
            assert!(usage.count >= 30, "{} sous le seuil", usage.entry.code);
        }
        let symbols: Vec<_> = chart.usages.iter().filter_map(|u| u.entry.symbol).collect();
        assert_eq!(symbols.len(), 2);
        assert_ne!(symbols[0], symbols[1]);
        // Top-left cell interior is red, bottom-left blue.
        assert_eq!(chart.image.pixel(5, 5), (255, 0, 0, 255));
        assert_eq!(chart.image.pixel(5, 154), (0, 0, 255, 255));
    }

    #[test]
    fn wide_source_pads_the_bottom_with_blank() {
        let palette = Palette::new(vec![PaletteEntry::new("K", "Black", 0, 0, 0)]);
        let raw = png_from_rows(200, 100, &vec![[0u8, 0, 0, 255]; 100]);
        let chart = process(&raw, &palette, 2, 2, &ProcessOptions::default()).unwrap();

        // 8×8 grid, fit 8×4: the lower half is padding.
        assert_eq!(chart.size.img_width_cells, 8);
        assert_eq!(chart.size.img_height_cells, 4);
        let blank = chart
            .usages
            .iter()
            .find(|u| u.entry.code == BLANK_CODE)
            .unwrap();
        assert_eq!(blank.count, 32);
        assert_eq!(blank.entry.symbol, None);
        // Padding cells render white.
        assert_eq!(chart.image.pixel(5, 75), (255, 255, 255, 255));
    }

    #[test]
    fn degenerate_dimensions_are_rejected() {
        let palette = Palette::new(vec![PaletteEntry::new("W", "White", 255, 255, 255)]);
        let raw = white_png(4, 4);
        for (w, h) in [(0u32, 4u32), (4, 0), (2001, 4), (4, 2001)] {
            let err = process(&raw, &palette, w, h, &ProcessOptions::default()).unwrap_err();
            assert!(
                matches!(err, MosaicError::InvalidDimensions { .. }),
                "{w}×{h} accepté à tort"
            );
        }
    }

    #[test]
    fn empty_palette_is_rejected() {
        let err = process(
            &white_png(4, 4),
            &Palette::new(vec![]),
            4,
            4,
            &ProcessOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MosaicError::EmptyPalette));
    }

    #[test]
    fn undecodable_bytes_are_rejected() {
        let palette = Palette::new(vec![PaletteEntry::new("W", "White", 255, 255, 255)]);
        let err = process(b"rien", &palette, 4, 4, &ProcessOptions::default()).unwrap_err();
        assert!(matches!(err, MosaicError::DecodeFailed(_)));
    }

    #[test]
    fn cancelled_token_stops_the_pipeline() {
        let palette = Palette::new(vec![PaletteEntry::new("W", "White", 255, 255, 255)]);
        let opts = ProcessOptions::default();
        opts.cancel.cancel();
        let err = process(&white_png(4, 4), &palette, 4, 4, &opts).unwrap_err();
        assert!(matches!(err, MosaicError::Cancelled));
    }

    #[test]
    fn repeated_runs_are_byte_identical() {
        let palette = Palette::new(vec![
            PaletteEntry::new("R", "Red", 255, 0, 0),
            PaletteEntry::new("B", "Blue", 0, 0, 255),
            PaletteEntry::new("W", "White", 255, 255, 255),
        ]);
        let raw = png_from_rows(3, 2, &[[200, 30, 30, 255], [30, 30, 200, 255]]);
        let a = process(&raw, &palette, 3, 2, &ProcessOptions::default()).unwrap();
        let b = process(&raw, &palette, 3, 2, &ProcessOptions::default()).unwrap();
        assert_eq!(a.image.data, b.image.data);
        let counts_a: Vec<_> = a.usages.iter().map(|u| (u.entry.code.clone(), u.count)).collect();
        let counts_b: Vec<_> = b.usages.iter().map(|u| (u.entry.code.clone(), u.count)).collect();
        assert_eq!(counts_a, counts_b);
    }

    #[test]
    fn invalid_font_still_yields_a_chart() {
        let palette = Palette::new(vec![PaletteEntry::new("W", "White", 255, 255, 255)]);
        let opts = ProcessOptions {
            font_data: Some(b"pas une police".as_slice()),
            ..ProcessOptions::default()
        };
        let with_bad_font = process(&white_png(8, 8), &palette, 2, 2, &opts).unwrap();
        let without = process(
            &white_png(8, 8),
            &palette,
            2,
            2,
            &ProcessOptions::default(),
        )
        .unwrap();
        assert_eq!(with_bad_font.image.data, without.image.data);
    }
}
