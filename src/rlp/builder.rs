//! A forward-only, caller-buffer-backed RLP builder with a two-phase
//! reserve-then-compact finalize.
//!
//! Arrays whose byte length isn't known while appending (a nonzero fixed
//! count, or a [`Builder::append_array_mutable`] count) reserve a 5-byte
//! header `[0xc0+55+4][u32 item-count BE]`. [`Builder::finalize`]
//! recursively descends the tree, turns each reserved header's item count
//! into an actual byte length, rewrites it compactly, and shifts the
//! content left to close the gap.

use crate::error::{Error, Result};

const TAG_ARRAY: u8 = 0xc0;
const TAG_DATA: u8 = 0x80;
const TAG_MASK: u8 = 0xc0;

/// Sentinel passed to the header writer meaning "always reserve a 4-byte
/// length field, regardless of how small `length` is" — used for arrays
/// whose final byte length isn't known yet.
const TAG_RESERVE: u8 = 0x00;

/// An opaque handle identifying a reserved array header.
pub type Tag = usize;

fn byte_count(value: usize) -> usize {
    if value < 0x100 {
        1
    } else if value < 0x1_0000 {
        2
    } else if value < 0x100_0000 {
        3
    } else {
        4
    }
}

/// A monotonic-append, two-phase RLP builder writing into a caller-owned
/// buffer.
pub struct Builder<'a> {
    data: &'a mut [u8],
    offset: usize,
    error: Option<Error>,
}

impl<'a> Builder<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Builder { data, offset: 0, error: None }
    }

    fn fail(&mut self, e: Error) -> Result<()> {
        self.error = Some(e);
        Err(e)
    }

    fn append_byte(&mut self, byte: u8) -> Result<()> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.data.len() < self.offset + 1 {
            return self.fail(Error::BufferOverrun);
        }
        self.data[self.offset] = byte;
        self.offset += 1;
        Ok(())
    }

    fn append_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.data.len() < self.offset + bytes.len() {
            return self.fail(Error::BufferOverrun);
        }
        self.data[self.offset..self.offset + bytes.len()].copy_from_slice(bytes);
        self.offset += bytes.len();
        Ok(())
    }

    /// `tag` is the base tag byte (`TAG_DATA`/`TAG_ARRAY`), or
    /// `TAG_RESERVE` to force a 4-byte reserved length field.
    fn append_header(&mut self, tag: u8, length: usize) -> Result<()> {
        if let Some(e) = self.error {
            return Err(e);
        }

        if tag != TAG_RESERVE && length <= 55 {
            return self.append_byte(tag + length as u8);
        }

        let (nbytes, tag) = if tag == TAG_RESERVE { (4, TAG_ARRAY) } else { (byte_count(length), tag) };

        self.append_byte(tag + 55 + nbytes as u8)?;
        for i in (0..nbytes).rev() {
            self.append_byte(((length >> (8 * i)) & 0xff) as u8)?;
        }
        Ok(())
    }

    /// Appends a byte-string item.
    pub fn append_data(&mut self, data: &[u8]) -> Result<()> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if data.len() == 1 && data[0] <= 0x7f {
            return self.append_byte(data[0]);
        }
        self.append_header(TAG_DATA, data.len())?;
        self.append_bytes(data)
    }

    /// Appends a byte-string item from a UTF-8 string.
    pub fn append_string(&mut self, s: &str) -> Result<()> {
        self.append_data(s.as_bytes())
    }

    /// Begins a fixed-length array; the next `count` appended items
    /// (recursively) belong to it.
    ///
    /// A `count` of zero is emitted directly in its compact form; a
    /// nonzero count reserves a 5-byte header to be compacted by
    /// [`Builder::finalize`].
    pub fn append_array(&mut self, count: usize) -> Result<()> {
        self.append_header(if count == 0 { TAG_ARRAY } else { TAG_RESERVE }, count)
    }

    /// Begins an array whose item count is not yet known; back-patch with
    /// [`Builder::adjust_count`] once it is.
    pub fn append_array_mutable(&mut self) -> Result<Tag> {
        let tag = self.offset;
        self.append_header(TAG_RESERVE, 0)?;
        Ok(tag)
    }

    /// Rewrites the reserved header at `tag` with the new item count.
    pub fn adjust_count(&mut self, tag: Tag, count: usize) -> Result<()> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let saved = self.offset;
        self.offset = tag;
        let result = self.append_header(TAG_RESERVE, count);
        self.offset = saved;
        result
    }

    fn finalize_at(&mut self, offset: usize, end: usize) -> Result<usize> {
        let v = self.data[offset];

        if v <= 0x7f {
            return Ok(1);
        }

        // Data, or an array that isn't a reserved 5-byte header, is
        // already compact.
        if (v & TAG_MASK) == TAG_DATA || v != TAG_ARRAY + 55 + 4 {
            let n = v & 0x3f;
            if n <= 55 {
                return Ok(1 + n as usize);
            }
            let nbytes = (n - 55) as usize;
            if nbytes > 4 {
                return Err(Error::Overflow);
            }
            let mut value = 0usize;
            for i in 0..nbytes {
                value = (value << 8) | self.data[offset + 1 + i] as usize;
            }
            return Ok(1 + nbytes + value);
        }

        // Reserved array header: read the item count, recursively
        // finalize each child, then compact.
        let base = offset;
        let data_offset = base + 5;
        let count = {
            let mut v = 0usize;
            for i in 0..4 {
                v = (v << 8) | self.data[base + 1 + i] as usize;
            }
            v
        };

        let mut pos = data_offset;
        let mut length = 0usize;
        for _ in 0..count {
            let l = self.finalize_at(pos, end)?;
            length += l;
            pos = data_offset + length;
        }

        self.offset = base;
        self.append_header(TAG_ARRAY, length)?;
        let new_data_offset = self.offset;

        if new_data_offset != data_offset {
            self.data.copy_within(data_offset..end, new_data_offset);
        }

        Ok(new_data_offset - base + length)
    }

    /// Compacts all reserved array headers in-place and returns the total
    /// finalized byte length. The builder's bytes are `self.finalize()`
    /// bytes long afterward.
    pub fn finalize(&mut self) -> Result<usize> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let end = self.offset;
        let length = self.finalize_at(0, end)?;
        self.offset = length;
        Ok(length)
    }

    /// The bytes written so far (call after [`Builder::finalize`] for the
    /// compact encoding).
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rlp::cursor::Cursor;

    #[test]
    fn test_mutable_array_finalize_matches_spec_example() {
        let mut buf = [0u8; 32];
        let mut b = Builder::new(&mut buf);
        let tag = b.append_array_mutable().unwrap();
        b.append_string("cat").unwrap();
        b.append_string("dog").unwrap();
        b.adjust_count(tag, 2).unwrap();
        let len = b.finalize().unwrap();

        assert_eq!(len, 9);
        assert_eq!(b.as_bytes(), hex_literal::hex!("c8 83 63 61 74 83 64 6f 67"));
    }

    #[test]
    fn test_nested_mutable_arrays() {
        let mut buf = [0u8; 64];
        let mut b = Builder::new(&mut buf);
        let outer = b.append_array_mutable().unwrap();

        let entry = b.append_array(2).unwrap();
        let _ = entry;
        b.append_data(&[0xaa; 20]).unwrap();
        let slots = b.append_array_mutable().unwrap();
        b.append_data(&[0x11; 32]).unwrap();
        b.append_data(&[0x22; 32]).unwrap();
        b.adjust_count(slots, 2).unwrap();

        b.adjust_count(outer, 1).unwrap();
        b.finalize().unwrap();

        let cursor = Cursor::walk(b.as_bytes());
        assert_eq!(cursor.get_array_count().unwrap(), 1);
        let entry = cursor.follow_index(0).unwrap();
        assert_eq!(entry.get_array_count().unwrap(), 2);
        let address = entry.follow_index(0).unwrap();
        assert_eq!(address.get_data().unwrap(), &[0xaa; 20]);
        let slots = entry.follow_index(1).unwrap();
        assert_eq!(slots.get_array_count().unwrap(), 2);
        assert_eq!(slots.follow_index(0).unwrap().get_data().unwrap(), &[0x11; 32]);
        assert_eq!(slots.follow_index(1).unwrap().get_data().unwrap(), &[0x22; 32]);
    }

    #[test]
    fn test_single_byte_data_is_itself() {
        let mut buf = [0u8; 4];
        let mut b = Builder::new(&mut buf);
        b.append_data(&[0x05]).unwrap();
        b.finalize().unwrap();
        assert_eq!(b.as_bytes(), &[0x05]);
    }
}
