//! Memory-Mapped File Bytes untuk Zero-Copy Decode
//!
//! Encoded stream yang disimpan ke file bisa di-mmap lalu di-decode
//! langsung tanpa copy ke user space:
//! - Zero-copy read: `&str`/`&[u8]` leaves alias the page cache
//! - Kernel-managed paging: OS menangani swap in/out
//!
//! Tidak ada header atau framing: file berisi bytes mentah hasil encode.

use memmap2::{Mmap, MmapMut, MmapOptions};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use tracing::debug;

/// Read-only mapping of a file holding an encoded stream
pub struct MappedBytes {
    // Mapping panjang nol tidak didukung semua platform
    mmap: Option<Mmap>,
}

impl MappedBytes {
    /// Membuka file dan mem-mmap seluruh isinya (read-only)
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let len = file.metadata()?.len();

        let mmap = if len == 0 {
            None
        } else {
            // SAFETY: mapping read-only; the caller must not truncate the
            // file while the mapping is alive.
            Some(unsafe { MmapOptions::new().map(&file)? })
        };

        debug!(path = %path.display(), len, "mapped encoded file");
        Ok(Self { mmap })
    }

    /// Menulis bytes ke file lewat mmap lalu flush ke disk.
    ///
    /// The file is created or truncated to exactly `bytes.len()`.
    pub fn persist<P: AsRef<Path>>(path: P, bytes: &[u8]) -> io::Result<()> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        file.set_len(bytes.len() as u64)?;

        if !bytes.is_empty() {
            // SAFETY: file dibuka read/write dan panjangnya sudah di-set
            let mut mmap: MmapMut = unsafe { MmapOptions::new().len(bytes.len()).map_mut(&file)? };
            mmap.copy_from_slice(bytes);
            mmap.flush()?;
        }

        debug!(path = %path.display(), len = bytes.len(), "persisted encoded file");
        Ok(())
    }

    /// Bytes file (zero-copy view ke mmap region)
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.mmap {
            Some(mmap) => &mmap[..],
            None => &[],
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.bin");

        MappedBytes::persist(&path, b"Hello, tagless!").unwrap();

        let mapped = MappedBytes::open(&path).unwrap();
        assert_eq!(mapped.as_bytes(), b"Hello, tagless!");
        assert_eq!(mapped.len(), 15);
    }

    #[test]
    fn test_persist_truncates_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.bin");

        MappedBytes::persist(&path, b"a much longer payload").unwrap();
        MappedBytes::persist(&path, b"short").unwrap();

        let mapped = MappedBytes::open(&path).unwrap();
        assert_eq!(mapped.as_bytes(), b"short");
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");

        MappedBytes::persist(&path, &[]).unwrap();

        let mapped = MappedBytes::open(&path).unwrap();
        assert!(mapped.is_empty());
        assert_eq!(mapped.as_bytes(), &[] as &[u8]);
    }
}
