use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use gd_ascii::converter::Converter;
use gd_ascii::dither::DitherOutput;
use gd_core::config::ConvertConfig;
use gd_core::frame::PixelBuffer;
use gd_source::image::ImageSource;
use gd_source::resize::{resize_pixels, target_size};

/// Dimensions et format de l'image chargée, avant redimensionnement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceInfo {
    /// Native width in pixels.
    pub width: u32,
    /// Native height in pixels.
    pub height: u32,
    /// Channels per pixel after decoding (1, 3 or 4).
    pub channels: u8,
    /// Container format name.
    pub format: String,
}

impl SourceInfo {
    /// Total pixel count.
    #[must_use]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Résultat complet d'une conversion.
pub struct Conversion {
    /// Source image description.
    pub source: SourceInfo,
    /// Glyphs and optional error grid.
    pub output: DitherOutput,
    /// The converter used, kept for stats and further recalculation.
    pub converter: Converter,
}

/// Load `path`, resize per `config`, then project and dither.
///
/// The palette is validated before the image is decoded.
///
/// # Errors
/// Returns an error on an invalid palette, an unreadable image, a failed
/// resize or invalid pixels.
pub fn run(path: &Path, config: &ConvertConfig) -> Result<Conversion> {
    let converter = Converter::from_config(config).context("Palette invalide")?;

    let t0 = Instant::now();
    let image = ImageSource::open(path)?;
    log::info!("Décodage : {:?}", t0.elapsed());

    let source = SourceInfo {
        width: image.pixels.width,
        height: image.pixels.height,
        channels: image.pixels.channels,
        format: image.format_name(),
    };

    let output = convert_pixels(&converter, image.pixels, config)?;
    Ok(Conversion {
        source,
        output,
        converter,
    })
}

/// Resize (if a target is configured) and convert an in-memory buffer.
///
/// # Errors
/// Returns an error if resizing or conversion fails.
pub fn convert_pixels(
    converter: &Converter,
    pixels: PixelBuffer,
    config: &ConvertConfig,
) -> Result<DitherOutput> {
    let pixels = if config.width.is_some() || config.height.is_some() {
        let (w, h) = target_size(pixels.width, pixels.height, config.width, config.height);
        let t0 = Instant::now();
        let resized = resize_pixels(&pixels, w, h, config.filter)?;
        log::info!("Redimensionnement {w}x{h} : {:?}", t0.elapsed());
        resized
    } else {
        pixels
    };

    let t0 = Instant::now();
    let output = converter.convert(&pixels)?;
    log::info!(
        "Conversion {}x{} ({} mode) : {:?}",
        output.glyphs.width,
        output.glyphs.height,
        converter.options().mode,
        t0.elapsed()
    );
    Ok(output)
}
