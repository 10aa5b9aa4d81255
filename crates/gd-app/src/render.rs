use std::io::{self, Write};

use gd_core::frame::{ErrorGrid, GlyphGrid};

/// Rendu texte d'une grille de glyphes.
///
/// Each glyph is written `repeat` times to compensate for the tall aspect
/// of terminal cells, and every row (the last one included) ends with
/// `terminator`.
///
/// # Errors
/// Propagates write errors from `out`.
pub fn write_grid<W: Write>(
    out: &mut W,
    grid: &GlyphGrid,
    repeat: usize,
    terminator: &str,
) -> io::Result<()> {
    let mut line = String::with_capacity(grid.width * repeat * 4 + terminator.len());
    for row in grid.rows() {
        line.clear();
        for &ch in row {
            for _ in 0..repeat {
                line.push(ch);
            }
        }
        line.push_str(terminator);
        out.write_all(line.as_bytes())?;
    }
    Ok(())
}

/// [`write_grid`] into a `String`.
#[must_use]
pub fn render_grid(grid: &GlyphGrid, repeat: usize, terminator: &str) -> String {
    let mut buf = Vec::new();
    // Vec<u8> n'échoue jamais
    let _ = write_grid(&mut buf, grid, repeat, terminator);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Une ligne par glyphe : le glyphe répété, puis son nombre d'occurrences.
///
/// # Errors
/// Propagates write errors from `out`.
pub fn write_frequencies<W: Write>(
    out: &mut W,
    frequencies: &[(char, usize)],
    repeat: usize,
) -> io::Result<()> {
    for &(glyph, count) in frequencies {
        let shown: String = std::iter::repeat_n(glyph, repeat.max(1)).collect();
        writeln!(out, "'{shown}' {count}")?;
    }
    Ok(())
}

/// Error grid as whitespace-separated rows, four decimals.
///
/// # Errors
/// Propagates write errors from `out`.
pub fn write_errors<W: Write>(out: &mut W, errors: &ErrorGrid) -> io::Result<()> {
    for row in errors.rows() {
        let line: Vec<String> = row.iter().map(|e| format!("{e:.4}")).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    Ok(())
}
