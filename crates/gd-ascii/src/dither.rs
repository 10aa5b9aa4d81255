//! Tramage par diffusion d'erreur (error diffusion) sur grille de luminance.
//!
//! A single row-major sweep quantizes each cell through the glyph palette
//! and pushes the signed residue onto neighbours that have not been visited
//! yet. Every neighbour write is bounds-checked; mass aimed outside the grid
//! is dropped.
//!
//! The sweep is sequential by construction: a cell may only be quantized
//! after every cell that diffuses into it.

use gd_core::error::CoreError;
use gd_core::frame::{ErrorGrid, GlyphGrid, LuminanceGrid};
use gd_core::palette::GlyphPalette;

/// An error diffusion kernel.
///
/// Each entry is `(dx, dy, weight)`; a neighbour receives
/// `error / divisor * weight`. Offsets only point to cells later in raster
/// order (`dy > 0`, or `dy == 0 && dx > 0`).
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    /// (dx, dy, weight) entries.
    pub entries: &'static [(isize, isize, u8)],
    /// Total divisor for normalizing weights.
    pub divisor: u8,
}

impl Kernel {
    /// Sum of all weights over the divisor; 1.0 for full propagation.
    #[must_use]
    pub fn propagation(&self) -> f64 {
        let total: u32 = self.entries.iter().map(|&(_, _, w)| u32::from(w)).sum();
        f64::from(total) / f64::from(self.divisor)
    }
}

/// Floyd-Steinberg: 4 neighbours, 16/16 propagation.
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[
        (1, 0, 7),  // east
        (1, 1, 1),  // south-east
        (0, 1, 5),  // south
        (-1, 1, 3), // south-west
    ],
    divisor: 16,
};

/// Output of a sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct DitherOutput {
    /// One glyph per cell.
    pub glyphs: GlyphGrid,
    /// Pre-diffusion error per cell, when requested.
    pub errors: Option<ErrorGrid>,
}

/// Dither `grid` with Floyd-Steinberg.
///
/// The grid is consumed: its cells accumulate diffused error during the
/// sweep and are meaningless afterwards.
///
/// # Errors
/// [`CoreError::DimensionMismatch`] if `grid.cells` does not hold exactly
/// `width * height` values.
///
/// # Example
/// ```
/// use gd_core::frame::LuminanceGrid;
/// use gd_core::palette::GlyphPalette;
/// use gd_ascii::dither::dither;
///
/// let palette = GlyphPalette::new(" #", &[0.0, 255.0]).unwrap();
/// let grid = LuminanceGrid::from_vec(vec![0.0, 255.0, 255.0, 0.0], 2, 2).unwrap();
/// let out = dither(grid, &palette, false).unwrap();
/// assert_eq!(out.glyphs.cells, vec![' ', '#', '#', ' ']);
/// assert!(out.errors.is_none());
/// ```
pub fn dither(
    grid: LuminanceGrid,
    palette: &GlyphPalette,
    record_errors: bool,
) -> Result<DitherOutput, CoreError> {
    dither_with_kernel(grid, palette, &FLOYD_STEINBERG, record_errors)
}

/// Dither `grid` with an arbitrary forward-only kernel.
///
/// # Errors
/// See [`dither`].
pub fn dither_with_kernel(
    mut grid: LuminanceGrid,
    palette: &GlyphPalette,
    kernel: &Kernel,
    record_errors: bool,
) -> Result<DitherOutput, CoreError> {
    let (width, height) = (grid.width, grid.height);
    let expected = width * height;
    if grid.cells.len() != expected {
        return Err(CoreError::DimensionMismatch {
            expected,
            actual: grid.cells.len(),
        });
    }

    let mut glyphs = GlyphGrid::new(width, height);
    let mut errors = record_errors.then(|| ErrorGrid::new(width, height));

    for y in 0..height {
        if y > 0 && y % 1000 == 0 {
            log::trace!("{y}/{height} lignes tramées");
        }
        for x in 0..width {
            let i = y * width + x;
            let q = palette.nearest(grid.cells[i]);
            glyphs.cells[i] = q.glyph;
            if let Some(errors) = errors.as_mut() {
                errors.cells[i] = q.error;
            }
            diffuse_error(&mut grid, kernel, x, y, q.error);
        }
    }

    Ok(DitherOutput { glyphs, errors })
}

/// Spread `error` from (x, y) to the kernel's in-bounds neighbours.
///
/// Returns the amount actually distributed; it equals
/// `error * kernel.propagation()` for interior cells and less at the edges.
///
/// # Example
/// ```
/// use gd_core::frame::LuminanceGrid;
/// use gd_ascii::dither::{diffuse_error, FLOYD_STEINBERG};
///
/// let mut grid = LuminanceGrid::new(3, 2);
/// let spent = diffuse_error(&mut grid, &FLOYD_STEINBERG, 1, 0, 16.0);
/// assert_eq!(spent, 16.0);
/// assert_eq!(grid.cells, vec![0.0, 0.0, 7.0, 3.0, 5.0, 1.0]);
/// ```
#[inline(always)]
pub fn diffuse_error(grid: &mut LuminanceGrid, kernel: &Kernel, x: usize, y: usize, error: f64) -> f64 {
    let share = error / f64::from(kernel.divisor);
    let mut spent = 0.0;
    for &(dx, dy, weight) in kernel.entries {
        let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy)) else {
            continue;
        };
        if let Some(cell) = grid.get_mut(nx, ny) {
            let amount = share * f64::from(weight);
            *cell += amount;
            spent += amount;
        }
    }
    spent
}

#[cfg(test)]
mod tests {
    use gd_core::palette::DEFAULT_GLYPHS;

    use super::*;

    fn two_level() -> GlyphPalette {
        GlyphPalette::new(" #", &[0.0, 255.0]).unwrap()
    }

    #[test]
    fn floyd_steinberg_propagates_everything() {
        assert_eq!(FLOYD_STEINBERG.propagation(), 1.0);
        for &(dx, dy, _) in FLOYD_STEINBERG.entries {
            assert!(dy > 0 || (dy == 0 && dx > 0), "cible déjà visitée");
        }
    }

    #[test]
    fn interior_cell_conserves_error() {
        let mut grid = LuminanceGrid::new(3, 3);
        let spent = diffuse_error(&mut grid, &FLOYD_STEINBERG, 1, 1, 16.0);
        assert_eq!(spent, 16.0);
        assert_eq!(grid.get(2, 1), Some(&7.0));
        assert_eq!(grid.get(2, 2), Some(&1.0));
        assert_eq!(grid.get(1, 2), Some(&5.0));
        assert_eq!(grid.get(0, 2), Some(&3.0));
        assert_eq!(grid.cells.iter().sum::<f64>(), 16.0);
    }

    #[test]
    fn edge_cells_lose_out_of_bounds_shares() {
        // Left column: no south-west target.
        let mut grid = LuminanceGrid::new(3, 3);
        assert_eq!(diffuse_error(&mut grid, &FLOYD_STEINBERG, 0, 1, 16.0), 13.0);

        // Right column: only south and south-west.
        let mut grid = LuminanceGrid::new(3, 3);
        assert_eq!(diffuse_error(&mut grid, &FLOYD_STEINBERG, 2, 1, 16.0), 8.0);

        // Bottom row: only east.
        let mut grid = LuminanceGrid::new(3, 3);
        assert_eq!(diffuse_error(&mut grid, &FLOYD_STEINBERG, 1, 2, 16.0), 7.0);

        // Last pixel: nothing.
        let mut grid = LuminanceGrid::new(3, 3);
        assert_eq!(diffuse_error(&mut grid, &FLOYD_STEINBERG, 2, 2, 16.0), 0.0);
        assert!(grid.cells.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn single_pixel_depends_only_on_itself() {
        let mut grid = LuminanceGrid::new(1, 1);
        assert_eq!(diffuse_error(&mut grid, &FLOYD_STEINBERG, 0, 0, 99.0), 0.0);

        let palette = GlyphPalette::default();
        for v in [0.0, 64.0, 128.0, 200.0, 255.0] {
            let grid = LuminanceGrid::from_vec(vec![v], 1, 1).unwrap();
            let out = dither(grid, &palette, true).unwrap();
            let q = palette.nearest(v);
            assert_eq!(out.glyphs.cells, vec![q.glyph]);
            assert_eq!(out.errors.unwrap().cells, vec![q.error]);
        }
    }

    #[test]
    fn end_to_end_two_by_two() {
        let palette = GlyphPalette::default();
        let glyphs: Vec<char> = DEFAULT_GLYPHS.chars().collect();
        let grid = LuminanceGrid::from_rows(vec![vec![10.0, 200.0], vec![200.0, 10.0]]).unwrap();
        let out = dither(grid, &palette, true).unwrap();

        assert_eq!(out.glyphs.get(0, 0), Some(&glyphs[0]));
        assert_eq!(out.glyphs.get(1, 0), Some(&glyphs[30]));
        assert_eq!(out.glyphs.get(0, 1), Some(&glyphs[31]));
        assert_eq!(out.glyphs.get(1, 1), Some(&glyphs[0]));
        assert_eq!(out.glyphs.cells, vec![' ', 'X', 'q', ' ']);

        // Sans la correction diffusée, 200 tomberait sur 'q'.
        assert_eq!(palette.nearest(200.0).glyph, 'q');

        let errors = out.errors.unwrap();
        assert!((errors.cells[0] - (10.0 - palette.thresholds()[0])).abs() < 1e-12);
    }

    #[test]
    fn deterministic_on_identical_inputs() {
        let palette = GlyphPalette::default();
        let make = || {
            let cells: Vec<f64> = (0..64 * 48).map(|i| f64::from(i % 256)).collect();
            LuminanceGrid::from_vec(cells, 64, 48).unwrap()
        };
        let a = dither(make(), &palette, true).unwrap();
        let b = dither(make(), &palette, true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn repeated_runs_share_one_palette() {
        let palette = GlyphPalette::default();
        let before = palette.clone();
        for _ in 0..3 {
            let grid = LuminanceGrid::from_vec(vec![128.0; 16], 4, 4).unwrap();
            let _ = dither(grid, &palette, false).unwrap();
        }
        assert_eq!(palette, before);
    }

    #[test]
    fn mid_gray_produces_a_mix() {
        let (w, h) = (16, 16);
        let grid = LuminanceGrid::from_vec(vec![76.5; w * h], w, h).unwrap();
        let out = dither(grid, &two_level(), false).unwrap();
        let dense = out.glyphs.cells.iter().filter(|&&c| c == '#').count();
        let ratio = dense as f64 / (w * h) as f64;
        assert!((ratio - 0.3).abs() < 0.1, "ratio {ratio}");
    }

    #[test]
    fn flat_extremes_stay_flat() {
        let grid = LuminanceGrid::from_vec(vec![0.0; 12], 4, 3).unwrap();
        let out = dither(grid, &two_level(), false).unwrap();
        assert!(out.glyphs.cells.iter().all(|&c| c == ' '));

        let grid = LuminanceGrid::from_vec(vec![255.0; 12], 4, 3).unwrap();
        let out = dither(grid, &two_level(), false).unwrap();
        assert!(out.glyphs.cells.iter().all(|&c| c == '#'));
    }

    #[test]
    fn single_row_and_single_column() {
        let palette = two_level();
        let grid = LuminanceGrid::from_vec(vec![127.0; 5], 5, 1).unwrap();
        let out = dither(grid, &palette, false).unwrap();
        assert_eq!(out.glyphs.cells, vec![' ', '#', ' ', '#', ' ']);

        let grid = LuminanceGrid::from_vec(vec![127.0; 5], 1, 5).unwrap();
        let out = dither(grid, &palette, false).unwrap();
        assert_eq!(out.glyphs.cells.len(), 5);
    }

    #[test]
    fn rejects_inconsistent_grid() {
        let grid = LuminanceGrid {
            cells: vec![0.0; 3],
            width: 2,
            height: 2,
        };
        assert_eq!(
            dither(grid, &two_level(), false).unwrap_err(),
            CoreError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn empty_grid_is_fine() {
        let out = dither(LuminanceGrid::new(0, 0), &two_level(), true).unwrap();
        assert!(out.glyphs.cells.is_empty());
    }
}
