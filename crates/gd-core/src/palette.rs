use crate::error::CoreError;

/// 38 glyphs, du plus clair au plus dense.
pub const DEFAULT_GLYPHS: &str = " `'^,~*)/{}[?+iclr&utIzx$knhbdXqmQ#BMW";

/// Measured ink coverage of [`DEFAULT_GLYPHS`], one entry per glyph.
///
/// Raw scale; normalized so the densest glyph sits at 255.
pub const DEFAULT_THRESHOLDS: [u8; 38] = [
    3, 8, 9, 11, 12, 14, 16, 17, 20, 21, 22, 23, 24, 25, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36,
    37, 39, 39, 40, 41, 42, 43, 46, 47, 49, 53, 54, 55, 57,
];

/// 10 caractères — compact, bon contraste.
pub const CHARSET_COMPACT: &str = " .:-=+*#%@";

/// Blocs Unicode — pseudo-pixels.
pub const CHARSET_BLOCKS: &str = " ░▒▓█";

/// Result of a nearest-threshold lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantized {
    /// Index of the selected palette entry.
    pub index: usize,
    /// Glyph at that index.
    pub glyph: char,
    /// Signed quantization error: `value - threshold[index]`.
    pub error: f64,
}

/// Ordered glyph table with luminance thresholds normalized to [0, 255].
///
/// Thresholds are rescaled exactly once, in the constructor, so that the
/// largest equals 255. The table is never mutated afterwards and can be
/// shared by any number of conversions.
///
/// # Example
/// ```
/// use gd_core::palette::GlyphPalette;
/// let palette = GlyphPalette::new(" .#", &[0.0, 51.0, 102.0]).unwrap();
/// assert_eq!(palette.thresholds(), &[0.0, 127.5, 255.0]);
/// assert_eq!(palette.nearest(0.0).glyph, ' ');
/// assert_eq!(palette.nearest(255.0).glyph, '#');
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphPalette {
    glyphs: Vec<char>,
    thresholds: Vec<f64>,
}

impl GlyphPalette {
    /// Build a palette from glyphs ordered lightest→densest and their thresholds.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidPalette`] if the sequences differ in length,
    /// hold fewer than 2 entries, contain a non-finite threshold, have no
    /// positive maximum, or are not non-decreasing.
    pub fn new(glyphs: &str, thresholds: &[f64]) -> Result<Self, CoreError> {
        let glyphs: Vec<char> = glyphs.chars().collect();
        if glyphs.len() != thresholds.len() {
            return Err(CoreError::InvalidPalette(format!(
                "{} glyphes pour {} seuils",
                glyphs.len(),
                thresholds.len()
            )));
        }
        if glyphs.len() < 2 {
            return Err(CoreError::InvalidPalette(
                "au moins 2 entrées requises".into(),
            ));
        }
        if thresholds.iter().any(|t| !t.is_finite()) {
            return Err(CoreError::InvalidPalette("seuil non fini".into()));
        }

        let thresholds = normalize(thresholds)?;
        if let Some(i) = thresholds.windows(2).position(|w| w[1] < w[0]) {
            return Err(CoreError::InvalidPalette(format!(
                "seuils décroissants aux positions {i} et {}",
                i + 1
            )));
        }

        Ok(Self { glyphs, thresholds })
    }

    /// Palette with thresholds spread evenly over [0, 255].
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidPalette`] for fewer than 2 glyphs.
    ///
    /// # Example
    /// ```
    /// use gd_core::palette::GlyphPalette;
    /// let palette = GlyphPalette::uniform(" .:#@").unwrap();
    /// assert_eq!(palette.thresholds(), &[0.0, 63.75, 127.5, 191.25, 255.0]);
    /// ```
    pub fn uniform(glyphs: &str) -> Result<Self, CoreError> {
        let n = glyphs.chars().count();
        let steps = n.saturating_sub(1).max(1) as f64;
        let thresholds: Vec<f64> = (0..n).map(|i| i as f64 * 255.0 / steps).collect();
        Self::new(glyphs, &thresholds)
    }

    /// Glyphs in palette order.
    #[must_use]
    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    /// Normalized thresholds, non-decreasing, last entry 255.
    #[must_use]
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always `false`: a palette holds at least two entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Nearest-threshold lookup.
    ///
    /// The search key is clamped to 255, then the left insertion point is
    /// found by binary search. The entry just below wins only when it is
    /// strictly closer; on a tie the upper entry is kept. The error is
    /// measured against the unclamped `value`.
    ///
    /// # Example
    /// ```
    /// use gd_core::palette::GlyphPalette;
    /// let palette = GlyphPalette::new("ab", &[0.0, 255.0]).unwrap();
    /// let q = palette.nearest(100.0);
    /// assert_eq!(q.index, 0);
    /// assert_eq!(q.error, 100.0);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn nearest(&self, value: f64) -> Quantized {
        let last = self.thresholds.len() - 1;
        let key = value.min(255.0);
        let mut index = self.thresholds.partition_point(|&t| t < key).min(last);
        let mut error = value - self.thresholds[index];

        let below = index.saturating_sub(1);
        if (value - self.thresholds[below]).abs() < error.abs() {
            index = below;
            error = value - self.thresholds[below];
        }

        Quantized {
            index,
            glyph: self.glyphs[index],
            error,
        }
    }
}

impl Default for GlyphPalette {
    fn default() -> Self {
        let raw = DEFAULT_THRESHOLDS.map(f64::from);
        let max = raw.iter().copied().fold(0.0, f64::max);
        let scale = 255.0 / max;
        Self {
            glyphs: DEFAULT_GLYPHS.chars().collect(),
            thresholds: raw.iter().map(|t| t * scale).collect(),
        }
    }
}

/// Scale so that the maximum becomes 255. A table already topped at 255 is
/// returned unchanged.
fn normalize(thresholds: &[f64]) -> Result<Vec<f64>, CoreError> {
    let max = thresholds.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= 0.0 {
        return Err(CoreError::InvalidPalette(
            "le seuil maximal doit être positif".into(),
        ));
    }
    if max == 255.0 {
        return Ok(thresholds.to_vec());
    }
    let scale = 255.0 / max;
    Ok(thresholds.iter().map(|t| t * scale).collect())
}
