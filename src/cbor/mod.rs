//! Streaming, zero-copy CBOR (RFC 8949 subset) codec.
//!
//! Supports null, boolean, unsigned integer, byte string, text string,
//! array, and map. Indefinite lengths, tags, floats, and negative integers
//! are rejected with [`crate::Error::UnsupportedFeature`].

pub mod builder;
pub mod cursor;
pub mod dump;
pub mod iter;

pub use builder::{Builder, Tag};
pub use cursor::{Cursor, Type};
pub use dump::dump;
pub use iter::Iter;
