use dm_core::error::MosaicError;
use dm_core::frame::FrameBuffer;

/// Décode des bytes image (PNG, JPEG, BMP, GIF) en buffer RGBA.
///
/// # Errors
/// `MosaicError::DecodeFailed` si les bytes ne sont pas une image
/// reconnue.
///
/// # Example
/// ```
/// use dm_source::decode::decode_bytes;
/// assert!(decode_bytes(b"pas une image").is_err());
/// ```
pub fn decode_bytes(bytes: &[u8]) -> Result<FrameBuffer, MosaicError> {
    let img =
        image::load_from_memory(bytes).map_err(|e| MosaicError::DecodeFailed(e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("Image décodée : {width}×{height}");
    Ok(FrameBuffer {
        data: rgba.into_raw(),
        width,
        height,
    })
}
