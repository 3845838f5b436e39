//! Growable Byte Sink
//!
//! Append-only buffer dengan pertumbuhan kapasitas berlipat dua.
//! Alokasi ulang hanya terjadi saat ruang kosong tidak cukup, sehingga
//! biaya per byte tetap amortized O(1).

/// Default initial capacity for a fresh sink.
pub const DEFAULT_CAPACITY: usize = 64;

/// Growable output buffer
///
/// Semua operasi encode menulis ke buffer internal secara berurutan.
/// Only the written prefix is ever exposed.
pub struct ByteSink {
    buffer: Box<[u8]>,
    write_pos: usize,
}

impl Default for ByteSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSink {
    /// Membuat sink dengan kapasitas default
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Membuat sink dengan kapasitas awal tertentu
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0u8; capacity].into_boxed_slice(),
            write_pos: 0,
        }
    }

    /// Reset sink untuk reuse. Capacity is kept.
    #[inline(always)]
    pub fn reset(&mut self) {
        self.write_pos = 0;
    }

    /// Buang semua byte setelah `len` (dipakai untuk rollback encode yang gagal)
    #[inline(always)]
    pub fn rewind(&mut self, len: usize) {
        self.write_pos = self.write_pos.min(len);
    }

    /// Append one byte.
    #[inline(always)]
    pub fn put(&mut self, byte: u8) {
        if self.available() < 1 {
            self.grow(self.write_pos + 1);
        }
        self.buffer[self.write_pos] = byte;
        self.write_pos += 1;
    }

    /// Append a slice of any length.
    #[inline(always)]
    pub fn write(&mut self, bytes: &[u8]) {
        let end = self.write_pos + bytes.len();
        if end > self.buffer.len() {
            self.grow(end);
        }
        self.buffer[self.write_pos..end].copy_from_slice(bytes);
        self.write_pos = end;
    }

    #[inline(always)]
    pub fn put_u16(&mut self, value: u16) {
        self.write(&value.to_le_bytes());
    }

    #[inline(always)]
    pub fn put_u32(&mut self, value: u32) {
        self.write(&value.to_le_bytes());
    }

    #[inline(always)]
    pub fn put_u64(&mut self, value: u64) {
        self.write(&value.to_le_bytes());
    }

    /// Written prefix (bukan seluruh backing capacity)
    #[inline(always)]
    pub fn bytes(&self) -> &[u8] {
        &self.buffer[..self.write_pos]
    }

    /// Consume the sink and return exactly the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut bytes = self.buffer.into_vec();
        bytes.truncate(self.write_pos);
        bytes
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.write_pos
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.write_pos == 0
    }

    /// Total backing capacity
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Ruang kosong yang tersisa
    #[inline(always)]
    pub fn available(&self) -> usize {
        self.buffer.len() - self.write_pos
    }

    /// Double capacity until `needed` bytes fit, then copy the prefix over.
    #[cold]
    fn grow(&mut self, needed: usize) {
        let mut capacity = self.buffer.len().max(1);
        while capacity < needed {
            capacity *= 2;
        }

        let mut buffer = vec![0u8; capacity].into_boxed_slice();
        buffer[..self.write_pos].copy_from_slice(&self.buffer[..self.write_pos]);
        self.buffer = buffer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_doubles_capacity() {
        let mut sink = ByteSink::with_capacity(2);
        sink.put(1);
        sink.put(2);
        assert_eq!(sink.capacity(), 2);

        sink.put(3);
        assert_eq!(sink.capacity(), 4);
        assert_eq!(sink.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_write_doubles_until_fit() {
        let mut sink = ByteSink::with_capacity(4);
        sink.write(&[7u8; 3]);
        sink.write(&[9u8; 20]);

        // 4 -> 8 -> 16 -> 32
        assert_eq!(sink.capacity(), 32);
        assert_eq!(sink.len(), 23);
        assert_eq!(&sink.bytes()[..3], &[7, 7, 7]);
        assert!(sink.bytes()[3..].iter().all(|&b| b == 9));
    }

    #[test]
    fn test_zero_capacity_grows() {
        let mut sink = ByteSink::with_capacity(0);
        assert!(sink.is_empty());
        sink.put(0xAB);
        sink.put(0xCD);
        assert_eq!(sink.bytes(), &[0xAB, 0xCD]);
    }

    #[test]
    fn test_little_endian_helpers() {
        let mut sink = ByteSink::new();
        sink.put_u16(0x0102);
        sink.put_u32(0x03040506);
        sink.put_u64(1);
        assert_eq!(
            sink.bytes(),
            &[0x02, 0x01, 0x06, 0x05, 0x04, 0x03, 1, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_reset_and_into_bytes() {
        let mut sink = ByteSink::with_capacity(8);
        sink.write(b"first");
        sink.reset();
        sink.write(b"two");

        let capacity = sink.capacity();
        assert_eq!(capacity, 8);
        assert_eq!(sink.into_bytes(), b"two".to_vec());
    }
}
