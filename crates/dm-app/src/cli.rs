use std::path::PathBuf;

use clap::Parser;

/// dmosaic — Générateur de schémas de mosaïque en diamant.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image source (PNG, JPEG, BMP, GIF).
    #[arg(long)]
    pub image: PathBuf,

    /// Fichier palette TOML (tables [[colors]] : code, name, r, g, b).
    #[arg(long)]
    pub palette: PathBuf,

    /// Largeur de la base en centimètres (1..=2000).
    #[arg(long)]
    pub width_cm: u32,

    /// Hauteur de la base en centimètres (1..=2000).
    #[arg(long)]
    pub height_cm: u32,

    /// Police TTF pour les symboles. Sans police, schéma sans symboles.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Fichier PNG de sortie.
    #[arg(short, long, default_value = "mosaic.png")]
    pub output: PathBuf,

    /// Désactiver le quadrillage gris entre cellules.
    #[arg(long, default_value_t = false)]
    pub no_grid: bool,

    /// Seuil de consolidation des couleurs rares.
    #[arg(long, default_value_t = dm_mosaic::cull::DEFAULT_MIN_COUNT)]
    pub min_count: u64,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
