use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::CoreError;
use crate::palette::{
    CHARSET_BLOCKS, CHARSET_COMPACT, DEFAULT_GLYPHS, DEFAULT_THRESHOLDS, GlyphPalette,
};

/// Formule de projection pixel → luminance.
///
/// # Example
/// ```
/// use gd_core::config::LuminanceMode;
/// let mode: LuminanceMode = "average".parse().unwrap();
/// assert_eq!(mode, LuminanceMode::Average);
/// assert!("sepia".parse::<LuminanceMode>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LuminanceMode {
    /// BT.709 relative luminance.
    #[default]
    Luminance,
    /// (max + min) / 2 over the three channels.
    Lightness,
    /// (r + g + b) / 3.
    Average,
    /// Euclidean norm / 3.
    Norm,
    /// Red channel.
    R,
    /// Green channel.
    G,
    /// Blue channel.
    B,
    /// Brightest channel.
    Max,
    /// Darkest channel.
    Min,
}

impl LuminanceMode {
    /// Every mode, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Luminance,
        Self::Lightness,
        Self::Average,
        Self::Norm,
        Self::R,
        Self::G,
        Self::B,
        Self::Max,
        Self::Min,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Luminance => "luminance",
            Self::Lightness => "lightness",
            Self::Average => "average",
            Self::Norm => "norm",
            Self::R => "r",
            Self::G => "g",
            Self::B => "b",
            Self::Max => "max",
            Self::Min => "min",
        }
    }
}

impl FromStr for LuminanceMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| CoreError::InvalidMode(s.to_string()))
    }
}

impl fmt::Display for LuminanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resampling filter used when the image is resized before conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResizeFilter {
    /// Nearest neighbour.
    Nearest,
    /// Bilinear convolution.
    Bilinear,
    /// Catmull-Rom cubic convolution.
    CatmullRom,
    /// Lanczos3 convolution.
    #[default]
    Lanczos3,
}

impl FromStr for ResizeFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" => Ok(Self::Bilinear),
            "catmullrom" | "catmull-rom" | "bicubic" => Ok(Self::CatmullRom),
            "lanczos3" | "lanczos" => Ok(Self::Lanczos3),
            other => Err(CoreError::Config(format!("filtre inconnu : {other}"))),
        }
    }
}

/// Resolve a named charset preset to its glyph string.
///
/// `"default"` is the measured-density table; the others use evenly spaced
/// thresholds.
///
/// # Errors
/// [`CoreError::Config`] for an unknown name.
pub fn preset_glyphs(name: &str) -> Result<&'static str, CoreError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "default" => Ok(DEFAULT_GLYPHS),
        "compact" => Ok(CHARSET_COMPACT),
        "blocks" => Ok(CHARSET_BLOCKS),
        other => Err(CoreError::Config(format!("preset de charset inconnu : {other}"))),
    }
}

/// Paramètres complets d'une conversion.
///
/// # Example
/// ```
/// use gd_core::config::{ConvertConfig, LuminanceMode};
/// let config = ConvertConfig::default();
/// assert_eq!(config.mode, LuminanceMode::Luminance);
/// assert_eq!(config.glyph_repeat, 2);
/// assert!(config.palette().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ConvertConfig {
    // === Projection ===
    /// Luminance formula.
    pub mode: LuminanceMode,
    /// Inverser la luminance (pour fond clair).
    pub invert: bool,
    /// Pondérer par le canal alpha.
    pub alpha: bool,

    // === Palette ===
    /// Glyphs du plus clair au plus dense.
    pub glyphs: String,
    /// Raw thresholds, one per glyph. Empty = evenly spaced.
    pub thresholds: Vec<f64>,

    // === Sortie ===
    /// Keep the per-cell quantization error grid.
    pub record_errors: bool,
    /// Horizontal repetitions of each glyph (2 ≈ square cells).
    pub glyph_repeat: usize,
    /// Appended after each rendered row.
    pub row_terminator: String,
    /// Target width before conversion. None = native.
    pub width: Option<u32>,
    /// Target height before conversion. None = native.
    pub height: Option<u32>,
    /// Resampling filter for the resize step.
    pub filter: ResizeFilter,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            mode: LuminanceMode::Luminance,
            invert: false,
            alpha: false,
            glyphs: DEFAULT_GLYPHS.to_string(),
            thresholds: DEFAULT_THRESHOLDS.iter().map(|&t| f64::from(t)).collect(),
            record_errors: false,
            glyph_repeat: 2,
            row_terminator: "\n".to_string(),
            width: None,
            height: None,
            filter: ResizeFilter::Lanczos3,
        }
    }
}

impl ConvertConfig {
    /// Build the palette described by `glyphs` and `thresholds`.
    ///
    /// # Errors
    /// [`CoreError::InvalidPalette`] if the tables are inconsistent.
    pub fn palette(&self) -> Result<GlyphPalette, CoreError> {
        if self.thresholds.is_empty() {
            GlyphPalette::uniform(&self.glyphs)
        } else {
            GlyphPalette::new(&self.glyphs, &self.thresholds)
        }
    }

    /// Replace the palette with a named preset.
    ///
    /// # Errors
    /// [`CoreError::Config`] for an unknown preset.
    pub fn apply_preset(&mut self, name: &str) -> Result<(), CoreError> {
        let glyphs = preset_glyphs(name)?;
        self.glyphs = glyphs.to_string();
        self.thresholds = if glyphs == DEFAULT_GLYPHS {
            DEFAULT_THRESHOLDS.iter().map(|&t| f64::from(t)).collect()
        } else {
            Vec::new()
        };
        Ok(())
    }

    /// Clamp numeric fields to their valid ranges.
    /// Called after TOML deserialization and CLI overrides.
    pub fn clamp_all(&mut self) {
        self.glyph_repeat = self.glyph_repeat.clamp(1, 8);
        self.width = self.width.filter(|&w| w > 0);
        self.height = self.height.filter(|&h| h > 0);
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    convert: Option<ConvertSection>,
    palette: Option<PaletteSection>,
    output: Option<OutputSection>,
}

/// `[convert]` section, all fields optional for partial override.
#[derive(Deserialize)]
struct ConvertSection {
    mode: Option<String>,
    invert: Option<bool>,
    alpha: Option<bool>,
}

/// `[palette]` section.
#[derive(Deserialize)]
struct PaletteSection {
    preset: Option<String>,
    glyphs: Option<String>,
    thresholds: Option<Vec<f64>>,
}

/// `[output]` section.
#[derive(Deserialize)]
struct OutputSection {
    record_errors: Option<bool>,
    glyph_repeat: Option<usize>,
    row_terminator: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    filter: Option<String>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// The luminance mode and the palette are validated here, so a bad file
/// fails before any pixel is read.
///
/// # Errors
/// Returns an error if the file is missing, cannot be parsed, names an
/// unknown mode/filter/preset, or describes an invalid palette.
///
/// # Example
/// ```no_run
/// use gd_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<ConvertConfig> {
    if !path.exists() {
        return Err(CoreError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))?;

    let mut config = ConvertConfig::default();

    if let Some(c) = file.convert {
        if let Some(v) = c.mode {
            config.mode = v.parse()?;
        }
        if let Some(v) = c.invert {
            config.invert = v;
        }
        if let Some(v) = c.alpha {
            config.alpha = v;
        }
    }

    if let Some(p) = file.palette {
        if let Some(v) = p.preset {
            config.apply_preset(&v)?;
        }
        if let Some(v) = p.glyphs {
            config.glyphs = v;
            // Les seuils par défaut ne correspondent qu'au charset par défaut.
            config.thresholds.clear();
        }
        if let Some(v) = p.thresholds {
            config.thresholds = v;
        }
    }

    if let Some(o) = file.output {
        if let Some(v) = o.record_errors {
            config.record_errors = v;
        }
        if let Some(v) = o.glyph_repeat {
            config.glyph_repeat = v;
        }
        if let Some(v) = o.row_terminator {
            config.row_terminator = v;
        }
        if let Some(v) = o.width {
            config.width = Some(v);
        }
        if let Some(v) = o.height {
            config.height = Some(v);
        }
        if let Some(v) = o.filter {
            config.filter = v.parse()?;
        }
    }

    config.clamp_all();
    config
        .palette()
        .with_context(|| format!("Palette invalide dans {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn shipped_default_matches_builtin() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config, ConvertConfig::default());
    }

    #[test]
    fn mode_names_round_trip() {
        for mode in LuminanceMode::ALL {
            assert_eq!(mode.name().parse::<LuminanceMode>().unwrap(), mode);
        }
        assert_eq!("  MAX ".parse::<LuminanceMode>().unwrap(), LuminanceMode::Max);
    }

    #[test]
    fn unknown_mode_is_invalid_mode() {
        let err = "sepia".parse::<LuminanceMode>().unwrap_err();
        assert_eq!(err, CoreError::InvalidMode("sepia".into()));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config, ConvertConfig::default());
    }

    #[test]
    fn sections_overlay_defaults() {
        let file = write_config(
            r#"
[convert]
mode = "min"
invert = true

[palette]
glyphs = " .#"

[output]
glyph_repeat = 1
row_terminator = "|\n"
width = 80
filter = "nearest"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.mode, LuminanceMode::Min);
        assert!(config.invert);
        assert!(!config.alpha);
        assert_eq!(config.glyphs, " .#");
        assert!(config.thresholds.is_empty());
        assert_eq!(config.glyph_repeat, 1);
        assert_eq!(config.row_terminator, "|\n");
        assert_eq!(config.width, Some(80));
        assert_eq!(config.height, None);
        assert_eq!(config.filter, ResizeFilter::Nearest);
        assert_eq!(config.palette().unwrap().thresholds(), &[0.0, 127.5, 255.0]);
    }

    #[test]
    fn unknown_mode_fails_at_load() {
        let file = write_config("[convert]\nmode = \"sepia\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CoreError>(),
            Some(&CoreError::InvalidMode("sepia".into()))
        );
    }

    #[test]
    fn bad_palette_fails_at_load() {
        let file = write_config("[palette]\nglyphs = \"ab\"\nthresholds = [10.0, 5.0]\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::InvalidPalette(_))
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_config(Path::new("/nonexistent/glyphdither.toml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::FileNotFound { .. })
        ));
    }

    #[test]
    fn repeat_is_clamped() {
        let file = write_config("[output]\nglyph_repeat = 0\nwidth = 0\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.glyph_repeat, 1);
        assert_eq!(config.width, None);
    }

    #[test]
    fn presets_resolve() {
        let mut config = ConvertConfig::default();
        config.apply_preset("blocks").unwrap();
        assert_eq!(config.palette().unwrap().len(), 5);
        config.apply_preset("default").unwrap();
        assert_eq!(config.palette().unwrap(), GlyphPalette::default());
        assert!(config.apply_preset("neon").is_err());
    }
}
