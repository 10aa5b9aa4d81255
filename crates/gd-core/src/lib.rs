/// Types partagés, palette et configuration pour glyphdither.
///
/// This crate holds everything the conversion core and its collaborators
/// agree on: pixel buffers, grids, the glyph palette, errors and config.

pub mod config;
pub mod error;
pub mod frame;
pub mod palette;

pub use config::{ConvertConfig, LuminanceMode, ResizeFilter};
pub use error::CoreError;
pub use frame::{ErrorGrid, GlyphGrid, Grid, LuminanceGrid, PixelBuffer};
pub use palette::{GlyphPalette, Quantized};
