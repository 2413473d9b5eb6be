/// Rendering for dmosaic: mosaic rasterization with grid lines and usage
/// statistics, and the per-cell symbol overlay.

pub mod overlay;
pub mod raster;

pub use overlay::SymbolPainter;
pub use raster::{CELL_SIZE, GRID_LINE_RGB, RasterOptions, collect_usages, render_mosaic};
