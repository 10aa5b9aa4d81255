use anyhow::{Context, Result, bail};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use gd_core::config::ResizeFilter;
use gd_core::frame::PixelBuffer;

/// Resizer réutilisable wrappant fast_image_resize.
///
/// # Example
/// ```
/// use gd_source::resize::Resizer;
/// let r = Resizer::new();
/// ```
pub struct Resizer {
    inner: FirResizer,
    /// Scratch image for source (owned buffer to avoid the mut borrow issue).
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            src_buf: Vec::new(),
        }
    }

    /// Resize `src` into `dst`. Dimensions of `dst` determine output size.
    ///
    /// # Errors
    /// Returns an error if the channel counts differ, are unsupported, or the
    /// resize operation fails.
    ///
    /// # Example
    /// ```
    /// use gd_source::resize::Resizer;
    /// use gd_core::config::ResizeFilter;
    /// use gd_core::frame::PixelBuffer;
    /// let mut r = Resizer::new();
    /// let src = PixelBuffer::new(100, 100, 3);
    /// let mut dst = PixelBuffer::new(50, 25, 3);
    /// r.resize_into(&src, &mut dst, ResizeFilter::Bilinear).unwrap();
    /// ```
    pub fn resize_into(
        &mut self,
        src: &PixelBuffer,
        dst: &mut PixelBuffer,
        filter: ResizeFilter,
    ) -> Result<()> {
        if src.channels != dst.channels {
            bail!(
                "Canaux incompatibles : {} → {}",
                src.channels,
                dst.channels
            );
        }
        let pixel_type = pixel_type(src.channels)?;

        if src.width == dst.width && src.height == dst.height {
            dst.data.copy_from_slice(&src.data);
            return Ok(());
        }

        // fast_image_resize exige &mut sur la source
        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image = Image::from_slice_u8(src.width, src.height, &mut self.src_buf, pixel_type)
            .context("Invalid source dimensions")?;

        let mut dst_image = Image::from_slice_u8(dst.width, dst.height, &mut dst.data, pixel_type)
            .context("Invalid destination dimensions")?;

        let options = ResizeOptions::new().resize_alg(resize_alg(filter));
        self.inner
            .resize(&src_image, &mut dst_image, Some(&options))
            .context("Resize failed")?;

        Ok(())
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

fn pixel_type(channels: u8) -> Result<PixelType> {
    match channels {
        1 => Ok(PixelType::U8),
        3 => Ok(PixelType::U8x3),
        4 => Ok(PixelType::U8x4),
        n => bail!("Redimensionnement impossible : {n} canaux"),
    }
}

fn resize_alg(filter: ResizeFilter) -> ResizeAlg {
    match filter {
        ResizeFilter::Nearest => ResizeAlg::Nearest,
        ResizeFilter::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
        ResizeFilter::CatmullRom => ResizeAlg::Convolution(FilterType::CatmullRom),
        ResizeFilter::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
    }
}

/// Resolve the output size from optional targets.
///
/// A missing side is derived from the source aspect ratio; both missing
/// keeps the native size.
///
/// # Example
/// ```
/// use gd_source::resize::target_size;
/// assert_eq!(target_size(200, 100, Some(80), None), (80, 40));
/// assert_eq!(target_size(200, 100, None, Some(10)), (20, 10));
/// assert_eq!(target_size(200, 100, None, None), (200, 100));
/// ```
#[must_use]
pub fn target_size(src_w: u32, src_h: u32, width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    let scaled = |num: u32, a: u32, b: u32| -> u32 {
        if b == 0 {
            return 1;
        }
        ((f64::from(num) * f64::from(a) / f64::from(b)).round() as u32).max(1)
    };
    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scaled(w, src_h, src_w)),
        (None, Some(h)) => (scaled(h, src_w, src_h), h),
        (None, None) => (src_w, src_h),
    }
}

/// Convenience for one-shot usage.
///
/// # Errors
/// Returns an error if the resize operation fails.
///
/// # Example
/// ```
/// use gd_source::resize::resize_pixels;
/// use gd_core::config::ResizeFilter;
/// use gd_core::frame::PixelBuffer;
/// let src = PixelBuffer::new(100, 100, 1);
/// let dst = resize_pixels(&src, 50, 50, ResizeFilter::Lanczos3).unwrap();
/// assert_eq!(dst.width, 50);
/// assert_eq!(dst.data.len(), 2500);
/// ```
pub fn resize_pixels(
    src: &PixelBuffer,
    width: u32,
    height: u32,
    filter: ResizeFilter,
) -> Result<PixelBuffer> {
    let mut dst = PixelBuffer::new(width, height, src.channels);
    let mut resizer = Resizer::new();
    resizer.resize_into(src, &mut dst, filter)?;
    log::debug!(
        "Redimensionné {}x{} → {}x{} ({filter:?})",
        src.width,
        src.height,
        width,
        height
    );
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_image_stays_uniform() {
        for channels in [1u8, 3, 4] {
            let mut src = PixelBuffer::new(8, 8, channels);
            src.data.fill(200);
            let dst = resize_pixels(&src, 4, 2, ResizeFilter::Bilinear).unwrap();
            assert_eq!(dst.channels, channels);
            assert_eq!(dst.data.len(), 4 * 2 * usize::from(channels));
            assert!(
                dst.data.iter().all(|&v| v.abs_diff(200) <= 1),
                "canaux {channels}"
            );
        }
    }

    #[test]
    fn nearest_downscale_picks_source_values() {
        let src = PixelBuffer::from_raw(vec![0, 0, 255, 255, 0, 0, 255, 255], 4, 2, 1).unwrap();
        let dst = resize_pixels(&src, 2, 1, ResizeFilter::Nearest).unwrap();
        assert_eq!(dst.data.len(), 2);
        assert!(dst.data.iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn same_size_is_a_copy() {
        let src = PixelBuffer::from_raw((0..12).collect(), 2, 2, 3).unwrap();
        let dst = resize_pixels(&src, 2, 2, ResizeFilter::Lanczos3).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn mismatched_channels_fail() {
        let src = PixelBuffer::new(4, 4, 3);
        let mut dst = PixelBuffer::new(2, 2, 4);
        assert!(Resizer::new().resize_into(&src, &mut dst, ResizeFilter::Nearest).is_err());
    }

    #[test]
    fn target_size_never_zero() {
        assert_eq!(target_size(1000, 1, Some(10), None), (10, 1));
        assert_eq!(target_size(0, 0, Some(10), None), (10, 1));
    }
}
