use std::path::Path;

use anyhow::{Context, Result};
use gd_core::frame::PixelBuffer;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};

/// Image décodée depuis le disque, profondeur de canaux préservée.
///
/// # Example
/// ```no_run
/// use gd_source::image::ImageSource;
/// use std::path::Path;
/// let source = ImageSource::open(Path::new("face.jpg")).unwrap();
/// println!("{}x{}", source.pixels.width, source.pixels.height);
/// ```
pub struct ImageSource {
    /// Decoded pixels.
    pub pixels: PixelBuffer,
    /// Container format guessed from the file contents, if known.
    pub format: Option<ImageFormat>,
}

impl ImageSource {
    /// Load an image from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or decoded.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = ImageReader::open(path)
            .with_context(|| format!("Impossible d'ouvrir {}", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("Impossible de lire {}", path.display()))?;
        let format = reader.format();
        let img = reader
            .decode()
            .with_context(|| format!("Impossible de décoder {}", path.display()))?;
        let pixels = pixels_from_dynamic(img);
        log::debug!(
            "Image chargée : {} ({}x{}, {} canaux, {:?})",
            path.display(),
            pixels.width,
            pixels.height,
            pixels.channels,
            format
        );
        Ok(Self { pixels, format })
    }

    /// Short human-readable format name, `"inconnu"` if undetected.
    #[must_use]
    pub fn format_name(&self) -> String {
        self.format
            .map_or_else(|| "inconnu".to_string(), |f| format!("{f:?}").to_uppercase())
    }
}

/// Convert a decoded image to a [`PixelBuffer`] of 1, 3 or 4 channels.
///
/// 8/16-bit grayscale → 1 channel, RGB (any depth) → 3, everything else
/// (including grayscale + alpha) → RGBA8.
#[must_use]
pub fn pixels_from_dynamic(img: DynamicImage) -> PixelBuffer {
    let (width, height) = (img.width(), img.height());
    let (data, channels) = match img.color() {
        ColorType::L8 | ColorType::L16 => (img.into_luma8().into_raw(), 1),
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => (img.into_rgb8().into_raw(), 3),
        _ => (img.into_rgba8().into_raw(), 4),
    };
    PixelBuffer {
        data,
        width,
        height,
        channels,
    }
}

/// Convenance : charge uniquement les pixels.
///
/// # Errors
/// Returns an error if the image cannot be loaded.
///
/// # Example
/// ```no_run
/// use gd_source::image::load_image;
/// use std::path::Path;
/// let pixels = load_image(Path::new("face.jpg")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    Ok(ImageSource::open(path)?.pixels)
}
