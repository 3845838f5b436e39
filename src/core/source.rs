//! Cursor-tracked Byte Source
//!
//! Pembacaan berurutan atas slice yang immutable. Tidak ada copy:
//! `read` dan `bytes_from_cursor` mengembalikan view ke buffer asli.
//!
//! Nested decoders receive [`ByteSource::bytes_from_cursor`] and report how
//! many bytes they consumed; the parent then calls [`ByteSource::skip`] with
//! that count to stay in sync.

use crate::error::{CodecError, Result};

/// Zero-copy sequential reader
#[derive(Debug, Clone, Copy)]
pub struct ByteSource<'a> {
    buffer: &'a [u8],
    read_pos: usize,
}

impl<'a> ByteSource<'a> {
    /// Membuat source dari buffer
    #[inline(always)]
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            read_pos: 0,
        }
    }

    /// Byte di posisi cursor, lalu cursor maju satu.
    #[inline(always)]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<u8> {
        match self.buffer.get(self.read_pos) {
            Some(&byte) => {
                self.read_pos += 1;
                Ok(byte)
            }
            None => Err(self.truncated(1)),
        }
    }

    /// View of the next `n` bytes (zero-copy).
    #[inline(always)]
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(self.truncated(n));
        }
        let start = self.read_pos;
        self.read_pos += n;
        Ok(&self.buffer[start..self.read_pos])
    }

    /// Copy the next `N` bytes into an array.
    #[inline(always)]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    /// Advance the cursor without reading.
    #[inline(always)]
    pub fn skip(&mut self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(self.truncated(n));
        }
        self.read_pos += n;
        Ok(())
    }

    #[inline(always)]
    pub fn get_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    #[inline(always)]
    pub fn get_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    #[inline(always)]
    pub fn get_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Sisa buffer yang belum dibaca, sebagai view baru mulai dari cursor.
    #[inline(always)]
    pub fn bytes_from_cursor(&self) -> &'a [u8] {
        &self.buffer[self.read_pos..]
    }

    /// Bytes consumed since the origin of this source.
    #[inline(always)]
    pub fn consumed(&self) -> usize {
        self.read_pos
    }

    /// Remaining bytes
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.read_pos)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[cold]
    fn truncated(&self, needed: usize) -> CodecError {
        CodecError::TruncatedInput {
            offset: self.read_pos,
            needed,
            available: self.remaining(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_until_exhausted() {
        let mut src = ByteSource::new(&[1, 2]);
        assert_eq!(src.next().unwrap(), 1);
        assert_eq!(src.next().unwrap(), 2);
        assert!(src.is_empty());

        let err = src.next().unwrap_err();
        assert_eq!(
            err,
            CodecError::TruncatedInput {
                offset: 2,
                needed: 1,
                available: 0
            }
        );
    }

    #[test]
    fn test_read_returns_view() {
        let data = b"hello world";
        let mut src = ByteSource::new(data);
        let hello = src.read(5).unwrap();
        assert_eq!(hello, b"hello");
        assert_eq!(hello.as_ptr(), data.as_ptr());
        assert_eq!(src.consumed(), 5);
        assert_eq!(src.remaining(), 6);
    }

    #[test]
    fn test_read_past_end_does_not_move_cursor() {
        let mut src = ByteSource::new(&[1, 2, 3]);
        src.skip(1).unwrap();
        assert!(src.read(3).unwrap_err().is_truncated());
        assert_eq!(src.consumed(), 1);
    }

    #[test]
    fn test_echo_protocol() {
        let data = [9u8, 1, 2, 3, 4, 5];
        let mut parent = ByteSource::new(&data);
        parent.next().unwrap();

        // Sub-decoder membaca dari suffix view, lalu parent skip sejumlah consumed.
        let mut child = ByteSource::new(parent.bytes_from_cursor());
        child.read(3).unwrap();
        parent.skip(child.consumed()).unwrap();

        assert_eq!(parent.consumed(), 4);
        assert_eq!(parent.bytes_from_cursor(), &[4, 5]);
    }

    #[test]
    fn test_little_endian_helpers() {
        let data = [0x02, 0x01, 0x06, 0x05, 0x04, 0x03, 0xFF, 0, 0, 0, 0, 0, 0, 0];
        let mut src = ByteSource::new(&data);
        assert_eq!(src.get_u16().unwrap(), 0x0102);
        assert_eq!(src.get_u32().unwrap(), 0x03040506);
        assert_eq!(src.get_u64().unwrap(), 0xFF);
        assert!(src.get_u16().unwrap_err().is_truncated());
    }
}
