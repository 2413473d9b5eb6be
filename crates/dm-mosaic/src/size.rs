/// Pas physique d'une perle, en millimètres.
pub const CELL_SIZE_MM: f32 = 2.5;

/// Cellules par centimètre de base (10 mm / 2.5 mm).
pub const CELLS_PER_CM: u32 = 4;

/// Dimensions physiques et en cellules de la mosaïque.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MosaicSizeInfo {
    /// Base width, cm (as requested).
    pub base_width_cm: u32,
    /// Base height, cm (as requested).
    pub base_height_cm: u32,
    /// Base width in cells.
    pub grid_width: u32,
    /// Base height in cells.
    pub grid_height: u32,
    /// Fitted image width, cm (truncated).
    pub img_width_cm: u32,
    /// Fitted image height, cm (truncated).
    pub img_height_cm: u32,
    /// Fitted image width in cells.
    pub img_width_cells: u32,
    /// Fitted image height in cells.
    pub img_height_cells: u32,
}

/// Nombre de cellules couvrant `cm` centimètres de base.
///
/// # Example
/// ```
/// use dm_mosaic::size::grid_cells;
/// assert_eq!(grid_cells(4), 16);
/// ```
#[inline]
#[must_use]
pub const fn grid_cells(cm: u32) -> u32 {
    cm * CELLS_PER_CM
}

/// Rapport de taille : base en entrée, image ajustée convertie en cm.
///
/// `img_width_cm = ⌊fit_w · 2.5 / 10⌋`, pareil pour la hauteur.
///
/// # Example
/// ```
/// use dm_mosaic::size::report;
/// let info = report(4, 4, 16, 16, 16, 10);
/// assert_eq!(info.img_width_cm, 4);
/// assert_eq!(info.img_height_cm, 2); // ⌊10 · 0.25⌋
/// ```
#[must_use]
pub fn report(
    base_width_cm: u32,
    base_height_cm: u32,
    grid_width: u32,
    grid_height: u32,
    fit_w: u32,
    fit_h: u32,
) -> MosaicSizeInfo {
    MosaicSizeInfo {
        base_width_cm,
        base_height_cm,
        grid_width,
        grid_height,
        img_width_cm: (fit_w as f32 * CELL_SIZE_MM / 10.0).floor() as u32,
        img_height_cm: (fit_h as f32 * CELL_SIZE_MM / 10.0).floor() as u32,
        img_width_cells: fit_w,
        img_height_cells: fit_h,
    }
}
