use thiserror::Error;

/// Errors originating from the core module.
///
/// All variants are input-validation failures detected before or at the
/// start of a conversion; none of them leave partial output behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A pixel has a channel count other than 1, 3 or 4.
    #[error("Forme de pixel invalide : {channels} canaux (attendu 1, 3 ou 4)")]
    InvalidPixelShape {
        /// Channel count that was supplied.
        channels: usize,
    },

    /// Unknown luminance mode name.
    #[error("Mode de luminance inconnu : {0}")]
    InvalidMode(String),

    /// Glyph/threshold tables are inconsistent.
    #[error("Palette invalide : {0}")]
    InvalidPalette(String),

    /// Buffer length does not match the declared width × height.
    #[error("Dimensions incohérentes : attendu {expected} valeurs, reçu {actual}")]
    DimensionMismatch {
        /// Number of values implied by the declared dimensions.
        expected: usize,
        /// Number of values actually present.
        actual: usize,
    },

    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Referenced file does not exist.
    #[error("Fichier introuvable : {path}")]
    FileNotFound {
        /// Path that was not found.
        path: String,
    },
}
