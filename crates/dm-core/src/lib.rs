/// Types, color math, and shared structures for dmosaic.
///
/// This crate contains the palette model, the cell/index grids, the Lab
/// colorspace conversions, and the error and cancellation types used
/// across the dmosaic workspace.

pub mod cancel;
pub mod color;
pub mod error;
pub mod frame;
pub mod grid;
pub mod palette;
pub mod symbols;

pub use cancel::CancelToken;
pub use color::Lab;
pub use error::MosaicError;
pub use frame::FrameBuffer;
pub use grid::{Cell, CellGrid, ColorUsage, IndexGrid};
pub use palette::{Palette, PaletteEntry};
