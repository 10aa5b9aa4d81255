use crate::error::CoreError;

/// Buffer de pixels décodé, row-major, `channels` bytes par pixel.
///
/// 1 canal = niveaux de gris, 3 = RGB, 4 = RGBA. Owned by the image
/// loader; the conversion core only reads it.
///
/// # Example
/// ```
/// use gd_core::frame::PixelBuffer;
/// let pb = PixelBuffer::new(10, 10, 3);
/// assert_eq!(pb.data.len(), 300);
/// assert_eq!(pb.pixel(0, 0), &[0, 0, 0]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Raw channel values, row-major.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channels per pixel.
    pub channels: u8,
}

impl PixelBuffer {
    /// Crée un buffer noir aux dimensions données.
    #[must_use]
    pub fn new(width: u32, height: u32, channels: u8) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * usize::from(channels)],
            width,
            height,
            channels,
        }
    }

    /// Wrap raw data, checking that its length matches the dimensions.
    ///
    /// # Errors
    /// [`CoreError::InvalidPixelShape`] for a channel count outside {1, 3, 4},
    /// [`CoreError::DimensionMismatch`] if `data` has the wrong length.
    ///
    /// # Example
    /// ```
    /// use gd_core::frame::PixelBuffer;
    /// let pb = PixelBuffer::from_raw(vec![10, 200, 200, 10], 2, 2, 1).unwrap();
    /// assert_eq!(pb.pixel(1, 0), &[200]);
    /// assert!(PixelBuffer::from_raw(vec![0; 5], 2, 2, 1).is_err());
    /// ```
    pub fn from_raw(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Result<Self, CoreError> {
        let buffer = Self {
            data,
            width,
            height,
            channels,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    /// Check channel count and buffer length.
    ///
    /// # Errors
    /// See [`PixelBuffer::from_raw`].
    pub fn validate(&self) -> Result<(), CoreError> {
        if !matches!(self.channels, 1 | 3 | 4) {
            return Err(CoreError::InvalidPixelShape {
                channels: usize::from(self.channels),
            });
        }
        let expected = self.pixel_count() * usize::from(self.channels);
        if self.data.len() != expected {
            return Err(CoreError::DimensionMismatch {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Number of pixels (`width * height`).
    #[inline]
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Channel slice of pixel (x, y).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let c = usize::from(self.channels);
        let idx = (y as usize * self.width as usize + x as usize) * c;
        &self.data[idx..idx + c]
    }
}

/// Grille 2D row-major, accès borné.
///
/// Backs the three per-cell artifacts of a conversion: [`LuminanceGrid`],
/// [`GlyphGrid`] and [`ErrorGrid`].
///
/// # Example
/// ```
/// use gd_core::frame::Grid;
/// let mut grid: Grid<char> = Grid::new(3, 2);
/// grid.set(2, 1, '@');
/// assert_eq!(grid.get(2, 1), Some(&'@'));
/// assert_eq!(grid.get(3, 1), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid<T> {
    /// Flat array of cells, row-major.
    pub cells: Vec<T>,
    /// Width in cells.
    pub width: usize,
    /// Height in cells.
    pub height: usize,
}

/// Luminance par pixel, mutée en place pendant la diffusion d'erreur.
pub type LuminanceGrid = Grid<f64>;

/// Glyph chosen for each cell.
pub type GlyphGrid = Grid<char>;

/// Signed quantization error recorded at each cell when it was visited.
pub type ErrorGrid = Grid<f64>;

impl<T: Clone + Default> Grid<T> {
    /// Crée une grille remplie de `T::default()`.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![T::default(); width * height],
            width,
            height,
        }
    }
}

impl<T> Grid<T> {
    /// Wrap a flat row-major vector.
    ///
    /// # Errors
    /// [`CoreError::DimensionMismatch`] if `cells.len() != width * height`.
    ///
    /// # Example
    /// ```
    /// use gd_core::frame::LuminanceGrid;
    /// let grid = LuminanceGrid::from_vec(vec![10.0, 200.0, 200.0, 10.0], 2, 2).unwrap();
    /// assert_eq!(grid.get(0, 1), Some(&200.0));
    /// assert!(LuminanceGrid::from_vec(vec![0.0; 3], 2, 2).is_err());
    /// ```
    pub fn from_vec(cells: Vec<T>, width: usize, height: usize) -> Result<Self, CoreError> {
        let expected = width * height;
        if cells.len() != expected {
            return Err(CoreError::DimensionMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            cells,
            width,
            height,
        })
    }

    /// Build from nested rows; every row must have the same length.
    ///
    /// # Errors
    /// [`CoreError::DimensionMismatch`] on a ragged row.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, CoreError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            if row.len() != width {
                return Err(CoreError::DimensionMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            cells.extend(row);
        }
        Ok(Self {
            cells,
            width,
            height,
        })
    }

    /// Flat index of (x, y), or `None` when out of bounds.
    #[inline(always)]
    #[must_use]
    pub fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Cell reference at (x, y).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Mutable cell reference at (x, y).
    #[inline(always)]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Set a cell at position (x, y). Out-of-bounds writes are ignored.
    #[inline(always)]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if let Some(cell) = self.get_mut(x, y) {
            *cell = value;
        }
    }

    /// Iterate over rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width.max(1)).take(self.height)
    }
}
