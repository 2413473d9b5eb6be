/// Source intake for dmosaic: raster decoding, aspect-preserving fit,
/// and Catmull-Rom resampling.

pub mod decode;
pub mod fit;
pub mod resize;

pub use decode::decode_bytes;
pub use fit::{Fit, build_index_grid, fit_to_grid};
pub use resize::{Resizer, resize_frame};
