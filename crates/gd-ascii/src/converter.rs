use gd_core::config::ConvertConfig;
use gd_core::error::CoreError;
use gd_core::frame::PixelBuffer;
use gd_core::palette::GlyphPalette;

use crate::dither::{DitherOutput, dither};
use crate::luminance::{LuminanceOptions, compute_luminance};

/// Converter orchestre projection → tramage pour un palette fixe.
///
/// The palette is built and normalized once; the same converter can be
/// re-run on any number of buffers, or with new projection options,
/// without the thresholds ever changing.
///
/// # Example
/// ```
/// use gd_core::frame::PixelBuffer;
/// use gd_core::palette::GlyphPalette;
/// use gd_ascii::converter::Converter;
/// use gd_ascii::luminance::LuminanceOptions;
///
/// let converter = Converter::new(GlyphPalette::default(), LuminanceOptions::default());
/// let pixels = PixelBuffer::from_raw(vec![10, 200, 200, 10], 2, 2, 1).unwrap();
/// let out = converter.convert(&pixels).unwrap();
/// assert_eq!(out.glyphs.cells, vec![' ', 'X', 'q', ' ']);
/// ```
#[derive(Clone, Debug)]
pub struct Converter {
    palette: GlyphPalette,
    options: LuminanceOptions,
    record_errors: bool,
}

impl Converter {
    /// Create a converter from a palette and projection options.
    #[must_use]
    pub fn new(palette: GlyphPalette, options: LuminanceOptions) -> Self {
        Self {
            palette,
            options,
            record_errors: false,
        }
    }

    /// Build palette and options from a configuration.
    ///
    /// # Errors
    /// [`CoreError::InvalidPalette`] if the configured tables are inconsistent.
    pub fn from_config(config: &ConvertConfig) -> Result<Self, CoreError> {
        Ok(Self::new(config.palette()?, LuminanceOptions::from(config))
            .record_errors(config.record_errors))
    }

    /// Keep the per-cell error grid in the output.
    #[must_use]
    pub fn record_errors(mut self, enabled: bool) -> Self {
        self.record_errors = enabled;
        self
    }

    /// Swap projection options; the palette is left untouched.
    pub fn set_options(&mut self, options: LuminanceOptions) {
        self.options = options;
    }

    /// Active projection options.
    #[must_use]
    pub fn options(&self) -> &LuminanceOptions {
        &self.options
    }

    /// The palette used for every conversion.
    #[must_use]
    pub fn palette(&self) -> &GlyphPalette {
        &self.palette
    }

    /// Project and dither one pixel buffer.
    ///
    /// # Errors
    /// Any validation error from [`compute_luminance`] or [`dither`]; no
    /// partial output is produced.
    pub fn convert(&self, pixels: &PixelBuffer) -> Result<DitherOutput, CoreError> {
        let grid = compute_luminance(pixels, &self.options)?;
        dither(grid, &self.palette, self.record_errors)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(GlyphPalette::default(), LuminanceOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use gd_core::config::LuminanceMode;

    use super::*;

    #[test]
    fn recalculation_keeps_palette() {
        let pixels = PixelBuffer::from_raw(vec![255, 0, 0, 0, 0, 255], 2, 1, 3).unwrap();
        let mut converter = Converter::default().record_errors(true);
        let palette_before = converter.palette().clone();

        let by_red = converter.convert(&pixels).unwrap();
        converter.set_options(LuminanceOptions {
            mode: LuminanceMode::B,
            invert: false,
            alpha: false,
        });
        let by_blue = converter.convert(&pixels).unwrap();
        converter.set_options(LuminanceOptions::default());
        let again = converter.convert(&pixels).unwrap();

        assert_ne!(by_red.glyphs, by_blue.glyphs);
        assert_eq!(by_red, again);
        assert_eq!(converter.palette(), &palette_before);
        assert!(again.errors.is_some());
    }

    #[test]
    fn from_config_rejects_bad_palette() {
        let config = ConvertConfig {
            glyphs: "ab".into(),
            thresholds: vec![1.0],
            ..ConvertConfig::default()
        };
        assert!(matches!(
            Converter::from_config(&config),
            Err(CoreError::InvalidPalette(_))
        ));
    }

    #[test]
    fn invalid_pixels_abort_without_output() {
        let pixels = PixelBuffer {
            data: vec![0; 4],
            width: 2,
            height: 1,
            channels: 2,
        };
        assert_eq!(
            Converter::default().convert(&pixels).unwrap_err(),
            CoreError::InvalidPixelShape { channels: 2 }
        );
    }
}
