//! Shared error taxonomy used by every codec and derivation routine in this
//! crate.
//!
//! Every fallible operation returns `Result<T, Error>`. Messages are kept
//! terse and generic by design: callers on the signing path should not be
//! able to distinguish failure causes beyond what they need to recover.

use core::fmt;

/// The single error kind shared across the CBOR codec, the RLP codec,
/// BIP-39/32 derivation, and the transaction serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A value or length exceeds the representable range (u64, 2^24 byte
    /// length, EC scalar order, a mutable-container item count over 65535).
    Overflow,

    /// A structural violation was found while decoding (a non-string map
    /// key, an access-list entry of the wrong shape, an RLP child whose
    /// length runs past its container).
    BadData,

    /// A read ran past a cursor's end, or a write ran past a builder's
    /// capacity.
    BufferOverrun,

    /// The operation does not apply to the cursor's or builder's current
    /// type (`get_value` on a string, `follow_key` on an array).
    InvalidOperation,

    /// The input uses a feature this codec does not implement (indefinite-
    /// length CBOR, a transaction type other than EIP-1559, a non-ASCII
    /// BIP-39 password).
    UnsupportedFeature,

    /// A requested key or index does not exist.
    NotFound,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Overflow => write!(f, "overflow"),
            Error::BadData => write!(f, "bad data"),
            Error::BufferOverrun => write!(f, "buffer overrun"),
            Error::InvalidOperation => write!(f, "invalid operation"),
            Error::UnsupportedFeature => write!(f, "unsupported feature"),
            Error::NotFound => write!(f, "not found"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_terse() {
        assert_eq!(Error::Overflow.to_string(), "overflow");
        assert_eq!(Error::NotFound.to_string(), "not found");
    }

    #[test]
    fn test_eq() {
        assert_eq!(Error::BadData, Error::BadData);
        assert_ne!(Error::BadData, Error::BufferOverrun);
    }
}
