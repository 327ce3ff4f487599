//! Ethereum Recursive-Length-Prefix (RLP) codec.
//!
//! See <https://ethereum.org/en/developers/docs/data-structures-and-encoding/rlp/>.

pub mod builder;
pub mod cursor;
pub mod iter;

pub use builder::{Builder, Tag};
pub use cursor::{Cursor, Type};
pub use iter::Iter;
