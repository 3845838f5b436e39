//! Tagless - Schema-less Binary Codec
//!
//! Arsitektur:
//! - Tanpa schema: tidak ada type tag, nama field, atau versi di stream
//! - Shape-driven: layout bytes ditentukan oleh shape tipe tujuan
//! - Zero-copy decode: string bisa di-alias langsung dari input
//! - Growable sink: kapasitas berlipat dua, amortized O(1)
//!
//! Wire format (all integers little-endian):
//!
//! | Shape     | Layout                                          |
//! |-----------|-------------------------------------------------|
//! | primitive | fixed width, string = u32 byte count + bytes    |
//! | pointer   | flag `0x01` absent / `0x00` present + pointee   |
//! | struct    | fields in declaration order, no prefix          |
//! | sequence  | u32 count + elements                            |
//! | map       | u32 count + (key, value) pairs                  |
//!
//! ```ignore
//! use tagless::{Decode, Encode};
//!
//! #[derive(Encode, Decode, Default, Debug, PartialEq)]
//! struct Trade {
//!     symbol: String,
//!     price: i64,
//!     venue: Option<Box<Venue>>,
//! }
//!
//! let bytes = tagless::serialize(&trade)?;
//! let mut back = Trade::default();
//! tagless::deserialize(&bytes, &mut back)?;
//! ```
//!
//! The format is not self-describing: the destination must have the same
//! shape as the value that produced the bytes. Mismatches that cannot be
//! detected structurally decode into wrong values without an error.

pub mod codec;
pub mod core;
pub mod error;
pub mod facade;

pub use crate::codec::{
    decode_echo, Complex128, Complex64, Decode, DecodeOwned, Encode, Field, PrimitiveKind, Shape,
    Shaped, Value,
};
pub use crate::core::{ByteSink, ByteSource, MappedBytes};
pub use crate::error::{CodecError, Result};
pub use crate::facade::{
    data_rebind, deserialize, deserialize_borrowed, deserialize_value, serialize, serialize_into,
    serialize_value, Serializer, Tagless, TaglessConfig,
};

#[cfg(feature = "derive")]
pub use tagless_derive::{Decode, Encode};
