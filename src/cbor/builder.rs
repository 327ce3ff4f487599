//! A forward-only, caller-buffer-backed CBOR builder.
//!
//! Every append is monotonic except for *mutable-length containers*:
//! [`Builder::append_array_mutable`]/[`Builder::append_map_mutable`] reserve
//! a fixed 2-byte count field immediately and hand back an opaque
//! [`Tag`] (the reserved offset) for a later [`Builder::adjust_count`]
//! back-patch.

use crate::error::{Error, Result};

/// An opaque handle identifying a reserved mutable-length count field.
pub type Tag = usize;

fn major(ty: u8) -> u8 {
    ty << 5
}

/// A monotonic-append builder writing into a caller-owned buffer.
///
/// Once a builder enters an error state, every further append is a no-op
/// that returns the same error; the buffer is left unmodified past the
/// point of failure.
pub struct Builder<'a> {
    data: &'a mut [u8],
    offset: usize,
    error: Option<Error>,
}

impl<'a> Builder<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Builder { data, offset: 0, error: None }
    }

    /// The number of bytes written so far.
    pub fn build_length(&self) -> usize {
        self.offset
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.offset]
    }

    fn fail(&mut self, e: Error) -> Result<()> {
        self.error = Some(e);
        Err(e)
    }

    fn require(&mut self, additional: usize) -> Result<()> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.data.len() < self.offset + additional {
            return self.fail(Error::BufferOverrun);
        }
        Ok(())
    }

    fn append_header(&mut self, ty: u8, value: u64) -> Result<()> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if value <= 23 {
            self.require(1)?;
            self.data[self.offset] = major(ty) | value as u8;
            self.offset += 1;
            return Ok(());
        }

        let be = value.to_be_bytes();
        let (info, nbytes): (u8, usize) = if value <= 0xff {
            (24, 1)
        } else if value <= 0xffff {
            (25, 2)
        } else if value <= 0xffff_ffff {
            (26, 4)
        } else {
            (27, 8)
        };

        self.require(1 + nbytes)?;
        self.data[self.offset] = major(ty) | info;
        self.offset += 1;
        self.data[self.offset..self.offset + nbytes].copy_from_slice(&be[8 - nbytes..]);
        self.offset += nbytes;
        Ok(())
    }

    /// Appends a boolean.
    pub fn append_boolean(&mut self, value: bool) -> Result<()> {
        self.require(1)?;
        self.data[self.offset] = major(7) | if value { 21 } else { 20 };
        self.offset += 1;
        Ok(())
    }

    /// Appends a null.
    pub fn append_null(&mut self) -> Result<()> {
        self.require(1)?;
        self.data[self.offset] = major(7) | 22;
        self.offset += 1;
        Ok(())
    }

    /// Appends an unsigned integer.
    pub fn append_number(&mut self, value: u64) -> Result<()> {
        self.append_header(0, value)
    }

    /// Appends a byte string.
    pub fn append_data(&mut self, bytes: &[u8]) -> Result<()> {
        self.append_header(2, bytes.len() as u64)?;
        self.require(bytes.len())?;
        self.data[self.offset..self.offset + bytes.len()].copy_from_slice(bytes);
        self.offset += bytes.len();
        Ok(())
    }

    /// Appends a UTF-8 text string.
    pub fn append_string(&mut self, s: &str) -> Result<()> {
        let bytes = s.as_bytes();
        self.append_header(3, bytes.len() as u64)?;
        self.require(bytes.len())?;
        self.data[self.offset..self.offset + bytes.len()].copy_from_slice(bytes);
        self.offset += bytes.len();
        Ok(())
    }

    /// Begins a fixed-length array of `count` items.
    pub fn append_array(&mut self, count: usize) -> Result<()> {
        self.append_header(4, count as u64)
    }

    /// Begins a fixed-length map of `count` key/value pairs.
    pub fn append_map(&mut self, count: usize) -> Result<()> {
        self.append_header(5, count as u64)
    }

    fn append_mutable(&mut self, ty: u8) -> Result<Tag> {
        if let Some(e) = self.error {
            return Err(e);
        }
        self.require(3)?;
        self.data[self.offset] = major(ty) | 25;
        self.offset += 1;
        let tag = self.offset;
        self.data[self.offset] = 0;
        self.data[self.offset + 1] = 0;
        self.offset += 2;
        Ok(tag)
    }

    /// Begins an array whose item count is not yet known; back-patch with
    /// [`Builder::adjust_count`] once it is.
    pub fn append_array_mutable(&mut self) -> Result<Tag> {
        self.append_mutable(4)
    }

    /// Begins a map whose pair count is not yet known; back-patch with
    /// [`Builder::adjust_count`] once it is.
    pub fn append_map_mutable(&mut self) -> Result<Tag> {
        self.append_mutable(5)
    }

    /// Rewrites the reserved count field at `tag` with `count`.
    ///
    /// `count` must fit in 16 bits (the reserved field is always 2 bytes);
    /// larger containers are rejected with [`Error::Overflow`] rather than
    /// silently truncated.
    pub fn adjust_count(&mut self, tag: Tag, count: usize) -> Result<()> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if count > 0xffff {
            return self.fail(Error::Overflow);
        }
        self.data[tag] = ((count >> 8) & 0xff) as u8;
        self.data[tag + 1] = (count & 0xff) as u8;
        Ok(())
    }

    /// Appends already-encoded CBOR bytes verbatim.
    pub fn append_cbor_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.require(bytes.len())?;
        self.data[self.offset..self.offset + bytes.len()].copy_from_slice(bytes);
        self.offset += bytes.len();
        Ok(())
    }

    /// Appends the entire contents of another builder.
    pub fn append_cbor_builder(&mut self, src: &Builder<'_>) -> Result<()> {
        self.append_cbor_raw(src.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cbor::cursor::Cursor;

    #[test]
    fn test_build_map_matches_spec_example() {
        let mut buf = [0u8; 32];
        let mut b = Builder::new(&mut buf);
        b.append_map(2).unwrap();
        b.append_string("a").unwrap();
        b.append_number(1).unwrap();
        b.append_string("b").unwrap();
        b.append_array(3).unwrap();
        b.append_boolean(true).unwrap();
        b.append_null().unwrap();
        b.append_string("hi").unwrap();

        assert_eq!(
            b.as_bytes(),
            hex_literal::hex!("a2 61 61 01 61 62 83 f5 f6 62 68 69")
        );
    }

    #[test]
    fn test_mutable_array_backpatch() {
        let mut buf = [0u8; 32];
        let mut b = Builder::new(&mut buf);
        let tag = b.append_array_mutable().unwrap();
        b.append_string("cat").unwrap();
        b.append_string("dog").unwrap();
        b.adjust_count(tag, 2).unwrap();

        let bytes = b.as_bytes();
        assert_eq!(bytes[0], (4 << 5) | 25);
        assert_eq!(bytes[1], 0x00);
        assert_eq!(bytes[2], 0x02);

        let cursor = Cursor::walk(bytes);
        assert_eq!(cursor.get_length().unwrap(), 2);
        let first = cursor.follow_index(0).unwrap();
        assert_eq!(first.get_data().unwrap(), b"cat");
    }

    #[test]
    fn test_overflow_rejected_above_65535() {
        let mut buf = [0u8; 16];
        let mut b = Builder::new(&mut buf);
        let tag = b.append_array_mutable().unwrap();
        assert_eq!(b.adjust_count(tag, 0x1_0000), Err(Error::Overflow));
    }

    #[test]
    fn test_sticky_error() {
        let mut buf = [0u8; 1];
        let mut b = Builder::new(&mut buf);
        assert_eq!(b.append_string("too long for this buffer"), Err(Error::BufferOverrun));
        assert_eq!(b.append_number(1), Err(Error::BufferOverrun));
    }
}
