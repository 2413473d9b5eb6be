use anyhow::{Context, Result};
use clap::Parser;
use dm_app::pipeline::{ProcessOptions, process};
use dm_core::cancel::CancelToken;
use dm_core::palette::{DEFAULT_MIN_LAB_DIST, Palette, load_palette};
use dm_render::raster::RasterOptions;

mod cli;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger et filtrer la palette
    let entries = load_palette(&cli.palette)?;
    let loaded = entries.len();
    let palette = Palette::filtered(entries, DEFAULT_MIN_LAB_DIST);
    log::info!("Palette : {loaded} couleurs chargées, {} retenues", palette.len());

    // 4. Lire l'image source et la police optionnelle
    let raw = std::fs::read(&cli.image)
        .with_context(|| format!("Impossible de lire {}", cli.image.display()))?;
    let font_data = match &cli.font {
        Some(path) => Some(
            std::fs::read(path)
                .with_context(|| format!("Impossible de lire {}", path.display()))?,
        ),
        None => None,
    };

    // 5. Pipeline
    let opts = ProcessOptions {
        font_data: font_data.as_deref(),
        raster: RasterOptions {
            grid_lines: !cli.no_grid,
        },
        min_count: cli.min_count,
        cancel: CancelToken::new(),
    };
    let chart = process(&raw, &palette, cli.width_cm, cli.height_cm, &opts)?;

    // 6. Écrire le schéma PNG
    let image = image::RgbaImage::from_raw(
        chart.image.width,
        chart.image.height,
        chart.image.data,
    )
    .context("Buffer de mosaïque incohérent")?;
    image
        .save(&cli.output)
        .with_context(|| format!("Impossible d'écrire {}", cli.output.display()))?;

    // 7. Légende et dimensions
    println!("Schéma écrit : {}", cli.output.display());
    println!(
        "Base : {} × {} cm ({} × {} cellules)",
        chart.size.base_width_cm,
        chart.size.base_height_cm,
        chart.size.grid_width,
        chart.size.grid_height
    );
    println!(
        "Image : {} × {} cm ({} × {} cellules)",
        chart.size.img_width_cm,
        chart.size.img_height_cm,
        chart.size.img_width_cells,
        chart.size.img_height_cells
    );
    println!("Légende :");
    for usage in &chart.usages {
        let symbol = usage.entry.symbol.unwrap_or(' ');
        println!(
            "  {symbol}  {:<8} {:<24} {}",
            usage.entry.code, usage.entry.name, usage.count
        );
    }

    Ok(())
}
