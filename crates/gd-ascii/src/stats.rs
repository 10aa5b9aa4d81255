use std::collections::HashMap;

use gd_core::frame::GlyphGrid;
use gd_core::palette::GlyphPalette;

/// Count each palette glyph in `grid`, in palette order.
///
/// Glyphs that never occur are reported with a count of 0; a glyph listed
/// twice in the palette is reported once.
///
/// # Example
/// ```
/// use gd_core::frame::GlyphGrid;
/// use gd_core::palette::GlyphPalette;
/// use gd_ascii::stats::glyph_frequencies;
///
/// let palette = GlyphPalette::uniform(" .#").unwrap();
/// let grid = GlyphGrid::from_vec(vec![' ', '#', '#', ' ', '#', '#'], 3, 2).unwrap();
/// assert_eq!(glyph_frequencies(&grid, &palette), vec![(' ', 2), ('.', 0), ('#', 4)]);
/// ```
#[must_use]
pub fn glyph_frequencies(grid: &GlyphGrid, palette: &GlyphPalette) -> Vec<(char, usize)> {
    let mut counts: HashMap<char, usize> = HashMap::with_capacity(palette.len());
    for &ch in &grid.cells {
        *counts.entry(ch).or_insert(0) += 1;
    }

    let mut seen = Vec::with_capacity(palette.len());
    for &glyph in palette.glyphs() {
        if !seen.iter().any(|&(g, _)| g == glyph) {
            seen.push((glyph, counts.get(&glyph).copied().unwrap_or(0)));
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_sum_to_cell_count() {
        let palette = GlyphPalette::default();
        let cells: Vec<char> = palette.glyphs().iter().cycle().take(100).copied().collect();
        let grid = GlyphGrid::from_vec(cells, 10, 10).unwrap();
        let freq = glyph_frequencies(&grid, &palette);
        assert_eq!(freq.len(), palette.len());
        assert_eq!(freq.iter().map(|&(_, n)| n).sum::<usize>(), 100);
    }

    #[test]
    fn duplicate_palette_glyph_reported_once() {
        let palette = GlyphPalette::new("aab", &[0.0, 10.0, 255.0]).unwrap();
        let grid = GlyphGrid::from_vec(vec!['a', 'b', 'a'], 3, 1).unwrap();
        assert_eq!(glyph_frequencies(&grid, &palette), vec![('a', 2), ('b', 1)]);
    }
}
