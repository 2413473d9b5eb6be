use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::color::{Lab, rgb8_to_lab};
use crate::grid::Cell;

/// Code réservé de l'entrée sentinelle de remplissage.
pub const BLANK_CODE: &str = "BLANK";

/// Distance Lab minimale entre deux entrées de la palette filtrée.
pub const DEFAULT_MIN_LAB_DIST: f32 = 0.11;

/// Une couleur de fil/perle DMC.
///
/// Immuable après chargement ; `symbol` est rempli par requête sur les
/// clones émis dans la légende, jamais sur la palette partagée.
///
/// # Example
/// ```
/// use dm_core::palette::PaletteEntry;
/// let e = PaletteEntry::new("310", "Black", 0, 0, 0);
/// assert_eq!(e.rgb8(), [0, 0, 0]);
/// assert!(e.lab.l < 0.01);
/// ```
#[derive(Clone, Debug)]
pub struct PaletteEntry {
    /// Short DMC identifier, e.g. "310".
    pub code: String,
    /// Human-readable color name.
    pub name: String,
    /// sRGB channels scaled to [0, 1].
    pub rgb: [f32; 3],
    /// Lab coordinates, precomputed at load.
    pub lab: Lab,
    /// Chart glyph, assigned per request.
    pub symbol: Option<char>,
}

impl PaletteEntry {
    /// Construit une entrée depuis des canaux 8 bits, Lab précalculé.
    #[must_use]
    pub fn new(code: &str, name: &str, r: u8, g: u8, b: u8) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            rgb: [
                f32::from(r) / 255.0,
                f32::from(g) / 255.0,
                f32::from(b) / 255.0,
            ],
            lab: rgb8_to_lab(r, g, b),
            symbol: None,
        }
    }

    /// L'entrée sentinelle : blanc, sans symbole, code `BLANK`.
    ///
    /// # Example
    /// ```
    /// use dm_core::palette::PaletteEntry;
    /// let blank = PaletteEntry::blank();
    /// assert_eq!(blank.code, "BLANK");
    /// assert_eq!(blank.symbol, None);
    /// ```
    #[must_use]
    pub fn blank() -> Self {
        Self::new(BLANK_CODE, "Blank", 255, 255, 255)
    }

    /// Canaux sRGB quantifiés sur 8 bits.
    #[inline]
    #[must_use]
    pub fn rgb8(&self) -> [u8; 3] {
        [
            (self.rgb[0] * 255.0).round() as u8,
            (self.rgb[1] * 255.0).round() as u8,
            (self.rgb[2] * 255.0).round() as u8,
        ]
    }
}

/// Garde un sous-ensemble maximal d'entrées deux à deux distantes d'au
/// moins `min_dist` en Lab, dans l'ordre d'itération.
///
/// Glouton : chaque entrée est acceptée si sa distance à toutes les
/// entrées déjà acceptées est ≥ `min_dist`. Comparaison au carré.
///
/// # Example
/// ```
/// use dm_core::palette::{filter_distinct, PaletteEntry};
/// let entries = vec![
///     PaletteEntry::new("1", "White", 255, 255, 255),
///     PaletteEntry::new("2", "Near white", 254, 254, 254),
///     PaletteEntry::new("3", "Black", 0, 0, 0),
/// ];
/// let kept = filter_distinct(entries, 0.11);
/// assert_eq!(kept.len(), 2);
/// assert_eq!(kept[1].code, "3");
/// ```
#[must_use]
pub fn filter_distinct(entries: Vec<PaletteEntry>, min_dist: f32) -> Vec<PaletteEntry> {
    let min_sq = min_dist * min_dist;
    let mut kept: Vec<PaletteEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if kept.iter().all(|k| k.lab.dist_sq(entry.lab) >= min_sq) {
            kept.push(entry);
        }
    }
    kept
}

/// La palette filtrée, partagée en lecture seule entre toutes les requêtes.
#[derive(Clone, Debug)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    blank: PaletteEntry,
}

impl Palette {
    /// Construit une palette depuis des entrées déjà filtrées.
    #[must_use]
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        Self {
            entries,
            blank: PaletteEntry::blank(),
        }
    }

    /// Filtre puis construit, en un appel.
    ///
    /// # Example
    /// ```
    /// use dm_core::palette::{Palette, PaletteEntry, DEFAULT_MIN_LAB_DIST};
    /// let palette = Palette::filtered(
    ///     vec![PaletteEntry::new("Ecru", "Ecru", 240, 235, 213)],
    ///     DEFAULT_MIN_LAB_DIST,
    /// );
    /// assert_eq!(palette.len(), 1);
    /// ```
    #[must_use]
    pub fn filtered(entries: Vec<PaletteEntry>, min_dist: f32) -> Self {
        let loaded = entries.len();
        let kept = filter_distinct(entries, min_dist);
        log::debug!(
            "Filtrage palette : {} entrées retenues sur {loaded} (distance min {min_dist})",
            kept.len()
        );
        Self::new(kept)
    }

    /// Number of palette entries (BLANK excluded).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entry survived filtering.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in iteration order.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// Entry by index.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, ix: u16) -> &PaletteEntry {
        &self.entries[ix as usize]
    }

    /// The BLANK sentinel.
    #[inline(always)]
    #[must_use]
    pub fn blank(&self) -> &PaletteEntry {
        &self.blank
    }

    /// Résout une cellule vers son entrée de palette.
    #[inline(always)]
    #[must_use]
    pub fn resolve(&self, cell: Cell) -> &PaletteEntry {
        match cell {
            Cell::Blank => &self.blank,
            Cell::Entry(ix) => self.get(ix),
        }
    }

    /// Index de l'entrée la plus proche en Lab (distance au carré).
    ///
    /// Égalités tranchées par l'ordre d'itération : la première gagne.
    /// `None` uniquement si la palette est vide.
    #[must_use]
    pub fn nearest(&self, lab: Lab) -> Option<u16> {
        let mut best: Option<(u16, f32)> = None;
        for (ix, entry) in self.entries.iter().enumerate() {
            let d = entry.lab.dist_sq(lab);
            match best {
                Some((_, bd)) if d >= bd => {}
                _ => best = Some((ix as u16, d)),
            }
        }
        best.map(|(ix, _)| ix)
    }
}

#[derive(Deserialize)]
struct PaletteFile {
    colors: Vec<PaletteRow>,
}

/// Une ligne du fichier palette : `(code, name, r, g, b)`, canaux 0..=255.
#[derive(Deserialize)]
struct PaletteRow {
    code: String,
    name: String,
    r: u8,
    g: u8,
    b: u8,
}

/// Parse le format TOML de la palette.
///
/// ```toml
/// [[colors]]
/// code = "310"
/// name = "Black"
/// r = 0
/// g = 0
/// b = 0
/// ```
///
/// # Errors
/// Returns an error on malformed TOML or missing fields.
pub fn parse_palette(content: &str) -> Result<Vec<PaletteEntry>> {
    let file: PaletteFile = toml::from_str(content).context("Palette TOML invalide")?;
    Ok(file
        .colors
        .into_iter()
        .map(|row| PaletteEntry::new(&row.code, &row.name, row.r, row.g, row.b))
        .collect())
}

/// Charge et parse un fichier palette TOML.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_palette(path: &Path) -> Result<Vec<PaletteEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_palette(&content)
}
