//! Core module: byte plumbing untuk codec
//!
//! Prinsip desain:
//! - Byte Sink: append-only, pertumbuhan kapasitas berlipat dua
//! - Byte Source: cursor-tracked, zero-copy view ke input
//! - Mapped Bytes: file di-mmap untuk decode tanpa copy

mod mapped;
mod sink;
mod source;

pub use mapped::MappedBytes;
pub use sink::{ByteSink, DEFAULT_CAPACITY};
pub use source::ByteSource;
