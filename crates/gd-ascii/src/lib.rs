/// Moteur de conversion image → glyphes pour glyphdither.
///
/// Projects pixels to luminance, then quantizes them to palette glyphs with
/// Floyd-Steinberg error diffusion.
pub mod converter;
pub mod dither;
pub mod luminance;
pub mod stats;

pub use converter::Converter;
pub use dither::{DitherOutput, dither};
pub use luminance::{LuminanceOptions, compute_luminance};
