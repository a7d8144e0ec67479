//! Row-by-row copies between tight and pitched buffers.
//!
//! GPU-visible buffers use a row pitch that may exceed the logical row width.
//! Rows are always copied one at a time: the source advances by its own stride
//! and the destination by its own, so padding never shifts a row into the next.

use crate::error::{IngestError, Result};

/// Rounds `row_bytes` up to a multiple of `alignment`.
#[must_use]
pub fn aligned_row_pitch(row_bytes: u32, alignment: u32) -> u32 {
    row_bytes.div_ceil(alignment) * alignment
}

/// Describes how rows are laid out in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    /// Bytes of pixel data in one row.
    pub row_bytes: usize,
    /// Distance in bytes between the starts of consecutive rows.
    pub pitch: usize,
    pub rows: usize,
}

impl RowLayout {
    /// A layout with no padding.
    #[must_use]
    pub fn tight(row_bytes: usize, rows: usize) -> Self {
        Self {
            row_bytes,
            pitch: row_bytes,
            rows,
        }
    }

    /// A layout whose pitch is `row_bytes` rounded up to `alignment`.
    #[must_use]
    pub fn aligned(row_bytes: usize, rows: usize, alignment: usize) -> Self {
        Self {
            row_bytes,
            pitch: row_bytes.div_ceil(alignment) * alignment,
            rows,
        }
    }

    /// Minimum buffer length holding every row. The last row needs no padding.
    #[must_use]
    pub fn min_len(&self) -> usize {
        if self.rows == 0 {
            0
        } else {
            self.pitch * (self.rows - 1) + self.row_bytes
        }
    }

    /// Buffer length with every row padded to the pitch.
    #[must_use]
    pub fn padded_len(&self) -> usize {
        self.pitch * self.rows
    }
}

/// Copies `src.rows` rows of `src.row_bytes` bytes from `src_data` to `dst_data`.
///
/// Both layouts must describe the same row width and row count.
pub fn copy_rows(src_data: &[u8], src: RowLayout, dst_data: &mut [u8], dst: RowLayout) -> Result<()> {
    if src.row_bytes != dst.row_bytes || src.rows != dst.rows {
        return Err(IngestError::InvalidBuffer {
            expected: src.row_bytes * src.rows,
            actual: dst.row_bytes * dst.rows,
        });
    }
    if src_data.len() < src.min_len() {
        return Err(IngestError::InvalidBuffer {
            expected: src.min_len(),
            actual: src_data.len(),
        });
    }
    if dst_data.len() < dst.min_len() {
        return Err(IngestError::InvalidBuffer {
            expected: dst.min_len(),
            actual: dst_data.len(),
        });
    }

    for row in 0..src.rows {
        let from = row * src.pitch;
        let to = row * dst.pitch;
        dst_data[to..to + dst.row_bytes].copy_from_slice(&src_data[from..from + src.row_bytes]);
    }
    Ok(())
}
