use gd_core::config::{ConvertConfig, LuminanceMode};
use gd_core::error::CoreError;
use gd_core::frame::{LuminanceGrid, PixelBuffer};
use rayon::prelude::*;

/// Options de projection : formule, inversion, pondération alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LuminanceOptions {
    /// Formula applied to multi-channel pixels.
    pub mode: LuminanceMode,
    /// `255 - value` after everything else.
    pub invert: bool,
    /// Multiply by `alpha / 255` (RGBA input only).
    pub alpha: bool,
}

impl From<&ConvertConfig> for LuminanceOptions {
    fn from(config: &ConvertConfig) -> Self {
        Self {
            mode: config.mode,
            invert: config.invert,
            alpha: config.alpha,
        }
    }
}

/// Project a pixel buffer to a luminance grid of the same dimensions.
///
/// Rows are independent, so they are processed in parallel.
///
/// # Errors
/// [`CoreError::InvalidPixelShape`] for an unsupported channel count,
/// [`CoreError::DimensionMismatch`] if the buffer length disagrees with
/// its declared width and height.
///
/// # Example
/// ```
/// use gd_core::frame::PixelBuffer;
/// use gd_ascii::luminance::{compute_luminance, LuminanceOptions};
///
/// let pixels = PixelBuffer::from_raw(vec![128], 1, 1, 1).unwrap();
/// let grid = compute_luminance(&pixels, &LuminanceOptions::default()).unwrap();
/// assert_eq!(grid.cells, vec![128.0]);
///
/// let inverted = LuminanceOptions { invert: true, ..Default::default() };
/// let grid = compute_luminance(&pixels, &inverted).unwrap();
/// assert_eq!(grid.cells, vec![127.0]);
/// ```
pub fn compute_luminance(
    pixels: &PixelBuffer,
    options: &LuminanceOptions,
) -> Result<LuminanceGrid, CoreError> {
    pixels.validate()?;

    let width = pixels.width as usize;
    let height = pixels.height as usize;
    let channels = usize::from(pixels.channels);
    let mut grid = LuminanceGrid::new(width, height);
    if width == 0 || height == 0 {
        return Ok(grid);
    }

    grid.cells
        .par_chunks_mut(width)
        .zip(pixels.data.par_chunks(width * channels))
        .for_each(|(row, src)| {
            for (cell, px) in row.iter_mut().zip(src.chunks_exact(channels)) {
                *cell = project_pixel(px, options);
            }
        });

    Ok(grid)
}

/// Luminance of a single pixel given as 1, 3 or 4 channel values.
///
/// Grayscale input ignores `mode` and `alpha`. For RGB[A] input the mode
/// formula runs first, then alpha weighting, then inversion.
///
/// # Example
/// ```
/// use gd_core::config::LuminanceMode;
/// use gd_ascii::luminance::{project_pixel, LuminanceOptions};
///
/// let opts = LuminanceOptions { mode: LuminanceMode::Min, ..Default::default() };
/// assert_eq!(project_pixel(&[255, 255, 255], &opts), 255.0);
/// ```
#[inline(always)]
#[must_use]
pub fn project_pixel(px: &[u8], options: &LuminanceOptions) -> f64 {
    debug_assert!(matches!(px.len(), 1 | 3 | 4), "forme de pixel invalide");

    if px.len() < 3 {
        let v = f64::from(px[0]);
        return if options.invert { 255.0 - v } else { v };
    }

    let (r, g, b) = (f64::from(px[0]), f64::from(px[1]), f64::from(px[2]));
    let a = px.get(3).map_or(1.0, |&a| f64::from(a) / 255.0);

    let mut lum = match options.mode {
        LuminanceMode::Luminance => round4(0.2126 * r + 0.7152 * g + 0.0722 * b),
        LuminanceMode::Lightness => round4((r.max(g).max(b) + r.min(g).min(b)) / 2.0),
        LuminanceMode::Average => round4((r + g + b) / 3.0),
        LuminanceMode::Norm => round4((r * r + g * g + b * b).sqrt() / 3.0),
        LuminanceMode::R => r,
        LuminanceMode::G => g,
        LuminanceMode::B => b,
        LuminanceMode::Max => r.max(g).max(b),
        LuminanceMode::Min => r.min(g).min(b),
    };

    if options.alpha {
        lum *= a;
    }
    if options.invert {
        lum = 255.0 - lum;
    }
    lum
}

/// Round to 4 decimals, ties to even.
#[inline(always)]
fn round4(v: f64) -> f64 {
    (v * 10_000.0).round_ties_even() / 10_000.0
}
