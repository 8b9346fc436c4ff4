//! The output of pixel data extraction:
//! a row-major grid of 8-bit samples.

/// The side of the default square canvas.
pub const DEFAULT_CANVAS_SIZE: u32 = 1024;

/// How the output buffer is shaped
/// with respect to the decoded frame.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum OutputShape {
    /// A zero-filled canvas of a fixed size,
    /// with the decoded frame in its top-left corner.
    /// Frames larger than the canvas are rejected.
    Fixed {
        /// canvas width
        columns: u32,
        /// canvas height
        rows: u32,
    },
    /// A buffer with the exact size of the decoded frame,
    /// as long as it does not exceed the given maximum.
    Decoded {
        /// maximum frame width
        max_columns: u32,
        /// maximum frame height
        max_rows: u32,
    },
}

impl Default for OutputShape {
    fn default() -> Self {
        OutputShape::Fixed {
            columns: DEFAULT_CANVAS_SIZE,
            rows: DEFAULT_CANVAS_SIZE,
        }
    }
}

impl OutputShape {
    /// The largest frame that fits this shape, as `(columns, rows)`.
    pub fn max_size(self) -> (u32, u32) {
        match self {
            OutputShape::Fixed { columns, rows } => (columns, rows),
            OutputShape::Decoded {
                max_columns,
                max_rows,
            } => (max_columns, max_rows),
        }
    }

    /// Check whether a frame of the given size fits this shape.
    pub fn fits(self, columns: u32, rows: u32) -> bool {
        let (max_columns, max_rows) = self.max_size();
        columns <= max_columns && rows <= max_rows
    }

    /// Create a zero-filled buffer to hold a frame of the given size.
    ///
    /// The frame is expected to fit, see [`fits`](OutputShape::fits).
    pub(crate) fn allocate(self, columns: u32, rows: u32) -> PixelBuffer {
        debug_assert!(self.fits(columns, rows));
        match self {
            OutputShape::Fixed { columns, rows } => PixelBuffer::zeroed(columns, rows),
            OutputShape::Decoded { .. } => PixelBuffer::zeroed(columns, rows),
        }
    }
}

/// A row-major two-dimensional grid of 8-bit samples,
/// owned by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    columns: u32,
    rows: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    /// Create a buffer of the given size with all samples at zero.
    pub fn zeroed(columns: u32, rows: u32) -> Self {
        PixelBuffer {
            columns,
            rows,
            data: vec![0; columns as usize * rows as usize],
        }
    }

    /// The number of samples in each row.
    #[inline]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// The number of rows.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// All samples, row after row.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// The samples of row `y`, if it exists.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.rows {
            return None;
        }
        let start = y as usize * self.columns as usize;
        Some(&self.data[start..start + self.columns as usize])
    }

    /// Mutable access to the first `len` samples of row `y`.
    pub(crate) fn row_prefix_mut(&mut self, y: u32, len: usize) -> Option<&mut [u8]> {
        if y >= self.rows || len > self.columns as usize {
            return None;
        }
        let start = y as usize * self.columns as usize;
        Some(&mut self.data[start..start + len])
    }

    /// The sample at column `x` of row `y`, if within bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.columns {
            return None;
        }
        self.row(y).map(|row| row[x as usize])
    }

    /// Retrieve the samples, row after row.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
