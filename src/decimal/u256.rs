//! A narrow unsigned 256-bit integer: only the surface the decimal
//! formatter exercises (construct from bytes, divide/remainder by a
//! `u32`, add a `u32`, zero/bit-length queries, decimal rendering).
//!
//! The source's `FfxBigInt` is signed, 280-bit, and has unused shift/bitwise
//! operators declared but not implemented; this narrows to what's actually
//! used (see the "Big-integer semantics" design note).

use crate::error::{Error, Result};
use alloc::string::String;
use alloc::vec::Vec;

/// An unsigned 256-bit integer, stored as four `u64` limbs, least
/// significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct U256([u64; 4]);

impl U256 {
    pub const ZERO: U256 = U256([0; 4]);

    /// Builds a value from up to 32 big-endian bytes.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > 32 {
            return Err(Error::Overflow);
        }
        let mut buf = [0u8; 32];
        buf[32 - bytes.len()..].copy_from_slice(bytes);

        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let chunk = &buf[i * 8..i * 8 + 8];
            limbs[3 - i] = u64::from_be_bytes(chunk.try_into().unwrap());
        }
        Ok(U256(limbs))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&limb| limb == 0)
    }

    /// The number of significant bits (0 for a zero value).
    pub fn bit_count(&self) -> u32 {
        for i in (0..4).rev() {
            if self.0[i] != 0 {
                return (i as u32) * 64 + (64 - self.0[i].leading_zeros());
            }
        }
        0
    }

    /// Divides by `divisor`, returning `(quotient, remainder)`.
    pub fn divmod_u32(&self, divisor: u32) -> (Self, u32) {
        if divisor == 0 {
            return (U256::ZERO, 0);
        }
        let divisor = divisor as u64;
        let mut quotient = [0u64; 4];
        let mut rem: u64 = 0;
        for i in (0..4).rev() {
            // Each 64-bit limb is divided in two 32-bit halves so the
            // intermediate dividend (up to 96 bits of value) never needs
            // anything wider than u64.
            let hi = (rem << 32) | (self.0[i] >> 32);
            let q_hi = hi / divisor;
            let r_hi = hi % divisor;
            let lo = (r_hi << 32) | (self.0[i] & 0xffff_ffff);
            let q_lo = lo / divisor;
            let r_lo = lo % divisor;
            quotient[i] = (q_hi << 32) | q_lo;
            rem = r_lo;
        }
        (U256(quotient), rem as u32)
    }

    /// Adds `value`, saturating (wrapping, matching the source's carry-drop
    /// behavior) rather than erroring.
    pub fn add_u32(&self, value: u32) -> Self {
        let mut limbs = self.0;
        let mut carry = value as u128;
        for limb in limbs.iter_mut() {
            let sum = *limb as u128 + carry;
            *limb = sum as u64;
            carry = sum >> 64;
            if carry == 0 {
                break;
            }
        }
        U256(limbs)
    }

    /// Multiplies by `multiplier`, erroring on overflow past 256 bits.
    pub fn mul_u32(&self, multiplier: u32) -> Result<Self> {
        let m = multiplier as u128;
        let mut result = [0u64; 4];
        let mut carry: u128 = 0;
        for i in 0..4 {
            let prod = self.0[i] as u128 * m + carry;
            result[i] = prod as u64;
            carry = prod >> 64;
        }
        if carry != 0 {
            return Err(Error::Overflow);
        }
        Ok(U256(result))
    }

    /// Renders the value as a plain decimal string (no grouping, no sign).
    pub fn to_decimal_string(&self) -> String {
        if self.is_zero() {
            return String::from("0");
        }
        let mut digits = Vec::<u8>::new();
        let mut v = *self;
        while !v.is_zero() {
            let (q, r) = v.divmod_u32(1_000_000_000);
            let mut chunk = r;
            for _ in 0..9 {
                digits.push((chunk % 10) as u8);
                chunk /= 10;
            }
            v = q;
        }
        while digits.len() > 1 && *digits.last().unwrap() == 0 {
            digits.pop();
        }
        let mut s = String::with_capacity(digits.len());
        for d in digits.iter().rev() {
            s.push((b'0' + d) as char);
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_be_bytes_roundtrip_decimal() {
        let v = U256::from_be_bytes(&[0x03, 0xe8]).unwrap(); // 1000
        assert_eq!(v.to_decimal_string(), "1000");
    }

    #[test]
    fn test_divmod_u32() {
        let v = U256::from_be_bytes(&[0x03, 0xe8]).unwrap(); // 1000
        let (q, r) = v.divmod_u32(7);
        assert_eq!(q.to_decimal_string(), "142");
        assert_eq!(r, 6);
    }

    #[test]
    fn test_bit_count() {
        assert_eq!(U256::ZERO.bit_count(), 0);
        let one = U256::from_be_bytes(&[1]).unwrap();
        assert_eq!(one.bit_count(), 1);
        let big = U256::from_be_bytes(&[0xff; 32]).unwrap();
        assert_eq!(big.bit_count(), 256);
    }

    #[test]
    fn test_overflow_above_32_bytes() {
        assert_eq!(U256::from_be_bytes(&[0u8; 33]), Err(Error::Overflow));
    }

    #[test]
    fn test_add_u32() {
        let v = U256::from_be_bytes(&[0xff]).unwrap(); // 255
        let sum = v.add_u32(1);
        assert_eq!(sum.to_decimal_string(), "256");
    }

    #[test]
    fn test_mul_u32() {
        let v = U256::from_be_bytes(&[0x64]).unwrap(); // 100
        let prod = v.mul_u32(3).unwrap();
        assert_eq!(prod.to_decimal_string(), "300");
    }
}
