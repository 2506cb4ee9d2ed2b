//! # Byte Reader
//!
//! Bounds-checked little-endian cursor over an in-memory file.
//!
//! Every read either returns the requested bytes or fails with
//! `VoxError::Truncated`; the cursor never moves past the end.

use crate::error::{VoxError, VoxResult};

/// Cursor over a byte slice with typed, bounds-checked reads.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    position: usize,
    /// Offset of `buffer[0]` in the original input, for error reporting.
    base: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at the start of `buffer`.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
            base: 0,
        }
    }

    /// Returns the absolute offset of the cursor in the original input.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.base + self.position
    }

    /// Returns the number of bytes remaining.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Returns true when every byte has been consumed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads `count` bytes.
    ///
    /// # Errors
    ///
    /// Returns `VoxError::Truncated` if fewer than `count` bytes remain.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> VoxResult<&'a [u8]> {
        let available = self.remaining();
        if count > available {
            return Err(VoxError::Truncated {
                offset: self.offset(),
                needed: count,
                available,
            });
        }
        let bytes = &self.buffer[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    /// Reads a fixed-size byte array.
    ///
    /// # Errors
    ///
    /// Returns `VoxError::Truncated` if fewer than `N` bytes remain.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> VoxResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Reads a single byte.
    ///
    /// # Errors
    ///
    /// Returns `VoxError::Truncated` at end of input.
    #[inline]
    pub fn read_u8(&mut self) -> VoxResult<u8> {
        let [value] = self.read_array::<1>()?;
        Ok(value)
    }

    /// Reads a u32 in little-endian format.
    ///
    /// # Errors
    ///
    /// Returns `VoxError::Truncated` if fewer than 4 bytes remain.
    #[inline]
    pub fn read_u32(&mut self) -> VoxResult<u32> {
        self.read_array::<4>().map(u32::from_le_bytes)
    }

    /// Reads a u32 length field as `usize`.
    ///
    /// # Errors
    ///
    /// Returns `VoxError::Truncated` if fewer than 4 bytes remain.
    #[inline]
    pub fn read_len(&mut self) -> VoxResult<usize> {
        let value = self.read_u32()?;
        usize::try_from(value)
            .map_err(|_| VoxError::InvalidFormat(format!("length {value} does not fit in memory")))
    }

    /// Skips `count` bytes.
    ///
    /// # Errors
    ///
    /// Returns `VoxError::Truncated` if fewer than `count` bytes remain.
    #[inline]
    pub fn skip(&mut self, count: usize) -> VoxResult<()> {
        self.read_bytes(count).map(|_| ())
    }

    /// Splits off the next `count` bytes as an independent reader and
    /// advances past them.
    ///
    /// # Errors
    ///
    /// Returns `VoxError::Truncated` if fewer than `count` bytes remain.
    pub fn sub_reader(&mut self, count: usize) -> VoxResult<ByteReader<'a>> {
        let base = self.offset();
        let buffer = self.read_bytes(count)?;
        Ok(ByteReader {
            buffer,
            position: 0,
            base,
        })
    }
}
