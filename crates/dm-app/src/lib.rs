/// Orchestration dmosaic : l'enchaînement complet image → schéma.
///
/// La couche d'intake (HTTP ou CLI) appelle `pipeline::process` avec les
/// bytes de l'image, la palette filtrée et les dimensions de base.

pub mod pipeline;

pub use pipeline::{MosaicChart, ProcessOptions, process};
