use thiserror::Error;

/// Errors surfaced by the mosaic pipeline.
///
/// All failures are terminal for the request; no retries.
#[derive(Error, Debug)]
pub enum MosaicError {
    /// Source bytes are not a decodable raster image.
    #[error("Décodage de l'image impossible : {0}")]
    DecodeFailed(String),

    /// Base dimensions outside the accepted range.
    #[error("Dimensions invalides : {width}×{height} cm (attendu 1..=2000)")]
    InvalidDimensions {
        /// Width in cm.
        width: u32,
        /// Height in cm.
        height: u32,
    },

    /// No palette entry available for matching.
    #[error("Palette vide après filtrage")]
    EmptyPalette,

    /// Resample target refused by the resizer.
    #[error("Redimensionnement impossible : {0}")]
    ResizeFailed(String),

    /// Font bytes rejected by the glyph rasterizer.
    #[error("Chargement de la police impossible : {0}")]
    FontLoadFailed(String),

    /// Request cancelled between two stages.
    #[error("Traitement annulé")]
    Cancelled,
}
