//! A zero-copy, immutable cursor over RFC 8949 CBOR bytes.
//!
//! A cursor is a position, never a stream: it borrows the caller's buffer
//! and is cheap to copy. Only the subset of CBOR this crate supports is
//! recognized; everything else (indefinite lengths, tags, floats, negative
//! integers) is reported as [`Error::UnsupportedFeature`].

use crate::error::{Error, Result};

const MAX_LENGTH: u64 = 0xff_ffff;

/// The CBOR major types this codec recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    /// The header at the cursor's offset could not be decoded.
    Error,
    Null,
    Boolean,
    Number,
    String,
    Data,
    Array,
    Map,
}

fn type_of_header(header: u8) -> Type {
    match header >> 5 {
        0 => Type::Number,
        2 => Type::Data,
        3 => Type::String,
        4 => Type::Array,
        5 => Type::Map,
        7 => match header & 0x1f {
            20 | 21 => Type::Boolean,
            22 => Type::Null,
            _ => Type::Error,
        },
        _ => Type::Error,
    }
}

/// Decoded header information at some offset: type, value (short count or
/// the big-endian trailing bytes), header size in bytes, and the number of
/// bytes remaining after the header that are safe to read.
pub(crate) struct Info {
    pub data_offset: usize,
    pub ty: Type,
    pub value: u64,
    pub header_size: usize,
    pub safe: usize,
}

fn get_info(data: &[u8], offset: usize) -> Result<Info> {
    let length = data.len();
    if offset >= length {
        return Err(Error::BufferOverrun);
    }

    let mut safe = length - offset - 1;
    let header = data[offset];
    let mut pos = offset + 1;
    let ty = type_of_header(header);

    match ty {
        Type::Error => return Err(Error::UnsupportedFeature),
        Type::Null => {
            return Ok(Info { data_offset: pos, ty, value: 0, header_size: 1, safe });
        }
        Type::Boolean => {
            let value = if header & 0x1f == 21 { 1 } else { 0 };
            return Ok(Info { data_offset: pos, ty, value, header_size: 1, safe });
        }
        _ => {}
    }

    let count = header & 0x1f;
    if count <= 23 {
        return Ok(Info { data_offset: pos, ty, value: count as u64, header_size: 1, safe });
    }

    // Indefinite lengths (and anything past additional-info 27) are not supported.
    if count > 27 {
        return Err(Error::UnsupportedFeature);
    }

    let nbytes: usize = 1 << (count - 24);
    if nbytes > safe {
        return Err(Error::BufferOverrun);
    }

    let mut value: u64 = 0;
    for i in 0..nbytes {
        value = (value << 8) | data[pos + i] as u64;
    }
    pos += nbytes;
    safe -= nbytes;

    Ok(Info { data_offset: pos, ty, value, header_size: 1 + nbytes, safe })
}

/// A borrowed, immutable position into a caller-owned CBOR buffer.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) offset: usize,
}

impl<'a> Cursor<'a> {
    /// Begins walking `data` from the start.
    pub fn walk(data: &'a [u8]) -> Self {
        Cursor { data, offset: 0 }
    }

    pub(crate) fn at(data: &'a [u8], offset: usize) -> Self {
        Cursor { data, offset }
    }

    pub(crate) fn info(&self) -> Result<Info> {
        get_info(self.data, self.offset)
    }

    /// Inspects the major type at this position without advancing.
    ///
    /// Never fails: an undecodable or out-of-range header reports
    /// [`Type::Error`] rather than a `Result`.
    pub fn get_type(&self) -> Type {
        if self.offset >= self.data.len() {
            return Type::Error;
        }
        type_of_header(self.data[self.offset])
    }

    /// True if [`Cursor::get_type`] is one of `types`.
    pub fn check_type(&self, types: &[Type]) -> bool {
        types.contains(&self.get_type())
    }

    /// The scalar value of a `Null`, `Boolean`, or `Number`.
    pub fn get_value(&self) -> Result<u64> {
        let info = self.info()?;
        match info.ty {
            Type::Null | Type::Boolean | Type::Number => Ok(info.value),
            _ => Err(Error::InvalidOperation),
        }
    }

    /// The raw bytes of a `Data` or `String` value, borrowed from the
    /// underlying buffer.
    pub fn get_data(&self) -> Result<&'a [u8]> {
        let info = self.info()?;
        if info.ty != Type::Data && info.ty != Type::String {
            return Err(Error::InvalidOperation);
        }
        if info.value as usize > info.safe {
            return Err(Error::BufferOverrun);
        }
        if info.value >= MAX_LENGTH {
            return Err(Error::Overflow);
        }
        let start = info.data_offset;
        let end = start + info.value as usize;
        Ok(&self.data[start..end])
    }

    /// The raw bytes of a `String` value, validated as UTF-8.
    pub fn get_str(&self) -> Result<&'a str> {
        let bytes = self.get_data()?;
        core::str::from_utf8(bytes).map_err(|_| Error::BadData)
    }

    /// For `Array`/`Map`, the number of items (pairs, for maps); for
    /// `Data`/`String`, the byte length.
    pub fn get_length(&self) -> Result<usize> {
        let info = self.info()?;
        if info.value > MAX_LENGTH {
            return Err(Error::Overflow);
        }
        match info.ty {
            Type::Data | Type::String | Type::Array | Type::Map => Ok(info.value as usize),
            _ => Err(Error::InvalidOperation),
        }
    }

    /// True if this cursor has one of `types` and `get_length() == length`.
    pub fn check_length(&self, types: &[Type], length: usize) -> bool {
        if !self.check_type(types) {
            return false;
        }
        matches!(self.get_length(), Ok(l) if l == length)
    }

    /// Advances past the value at the current position (low-level; used
    /// internally by iteration).
    pub(crate) fn step(&mut self) -> Result<()> {
        let info = self.info()?;
        match info.ty {
            Type::Array | Type::Map | Type::Null | Type::Boolean | Type::Number => {
                self.offset += info.header_size;
            }
            Type::Data | Type::String => {
                self.offset += info.header_size + info.value as usize;
            }
            Type::Error => return Err(Error::UnsupportedFeature),
        }
        Ok(())
    }

    /// The value cursor for a map entry whose key text-string equals `key`.
    pub fn follow_key(&self, key: &str) -> Result<Cursor<'a>> {
        if !self.check_type(&[Type::Map]) {
            return Err(Error::InvalidOperation);
        }

        let mut iter = crate::cbor::iter::Iter::new(*self);
        while let Some(child) = iter.next_child() {
            let child = child?;
            if let Ok(k) = iter.key() {
                if k.get_str() == Ok(key) {
                    return Ok(child);
                }
            }
        }
        Err(Error::NotFound)
    }

    /// The cursor for the `index`-th child of an array or map (maps skip
    /// keys).
    pub fn follow_index(&self, index: usize) -> Result<Cursor<'a>> {
        if !self.check_type(&[Type::Array, Type::Map]) {
            return Err(Error::InvalidOperation);
        }

        let mut iter = crate::cbor::iter::Iter::new(*self);
        let mut i = 0;
        while let Some(child) = iter.next_child() {
            let child = child?;
            if i == index {
                return Ok(child);
            }
            i += 1;
        }
        Err(Error::NotFound)
    }

    /// Starts a forward iterator over this array's or map's children.
    pub fn iterate(&self) -> crate::cbor::iter::Iter<'a> {
        crate::cbor::iter::Iter::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_map_and_array() {
        // { "a": 1, "b": [true, null, "hi"] }
        let bytes = hex_literal::hex!("a2 61 61 01 61 62 83 f5 f6 62 68 69");
        let cursor = Cursor::walk(&bytes);
        assert_eq!(cursor.get_type(), Type::Map);
        assert_eq!(cursor.get_length().unwrap(), 2);

        let b = cursor.follow_key("b").unwrap();
        assert_eq!(b.get_type(), Type::Array);
        let hi = b.follow_index(2).unwrap();
        assert_eq!(hi.get_data().unwrap(), b"hi");
    }

    #[test]
    fn test_number_short_and_long_forms() {
        let bytes = [0x00u8];
        assert_eq!(Cursor::walk(&bytes).get_value().unwrap(), 0);

        let bytes = [0x18, 0xff];
        assert_eq!(Cursor::walk(&bytes).get_value().unwrap(), 255);

        let bytes = [0x19, 0x01, 0x00];
        assert_eq!(Cursor::walk(&bytes).get_value().unwrap(), 256);
    }

    #[test]
    fn test_invalid_operation() {
        let bytes = [0x00u8];
        let cursor = Cursor::walk(&bytes);
        assert_eq!(cursor.get_data(), Err(Error::InvalidOperation));
    }

    #[test]
    fn test_buffer_overrun() {
        let bytes = [0x19, 0x01]; // claims a 2-byte trailing count but only has 1
        let cursor = Cursor::walk(&bytes);
        assert_eq!(cursor.get_value(), Err(Error::BufferOverrun));
    }
}
