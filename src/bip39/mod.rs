//! BIP-39 mnemonic phrases: entropy ↔ phrase ↔ seed.

pub mod wordlist;

use crate::error::{Error, Result};
use alloc::string::String;
use alloc::vec::Vec;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// PBKDF2 seed length in bytes. The source disagrees with itself (one header
/// says 32, another 64); BIP-39 itself says 64.
pub const SEED_LENGTH: usize = 64;

/// A mnemonic: the checksummed entropy backing a phrase of 12-24 words.
///
/// `entropy` holds the raw entropy followed immediately by the checksum
/// byte; `entropy_length` is the raw entropy length alone (the checksum
/// never exceeds a byte at the lengths BIP-39 allows).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Mnemonic {
    word_count: usize,
    entropy_length: usize,
    entropy: [u8; 33],
}

fn checksum_mask(entropy_length: usize) -> u8 {
    let bits = (entropy_length * 8 / 32) as u32;
    if bits >= 8 {
        0xff
    } else {
        !(0xffu8 >> bits)
    }
}

impl Mnemonic {
    /// Builds a mnemonic from raw entropy (16/20/24/28/32 bytes), computing
    /// and appending its checksum.
    pub fn from_entropy(entropy: &[u8]) -> Result<Self> {
        let len = entropy.len();
        if len < 16 || len > 32 || len % 4 != 0 {
            return Err(Error::BadData);
        }
        let mut buf = [0u8; 33];
        buf[..len].copy_from_slice(entropy);
        let hash = Sha256::digest(entropy);
        buf[len] = hash[0];
        let word_count = (len * 8 + len * 8 / 32) / 11;
        Ok(Mnemonic { word_count, entropy_length: len, entropy: buf })
    }

    /// Parses a space-separated phrase, validating word count, word
    /// membership, and the trailing checksum.
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        let word_count = words.len();
        if !matches!(word_count, 12 | 15 | 18 | 21 | 24) {
            return Err(Error::BadData);
        }
        let entropy_length = 4 * (word_count - 12) / 3 + 16;

        let mut buf = [0u8; 33];
        let mut bit = 0usize;
        for word in &words {
            let index = wordlist::index_of(word).ok_or(Error::NotFound)?;
            for i in (0..11).rev() {
                if (index >> i) & 1 == 1 {
                    buf[bit / 8] |= 1 << (7 - (bit % 8));
                }
                bit += 1;
            }
        }

        let expected = Sha256::digest(&buf[..entropy_length]);
        let mask = checksum_mask(entropy_length);
        if (buf[entropy_length] & mask) != (expected[0] & mask) {
            log::debug!("mnemonic checksum mismatch");
            return Err(Error::BadData);
        }

        Ok(Mnemonic { word_count, entropy_length, entropy: buf })
    }

    /// The number of words in this mnemonic's phrase.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// The raw entropy bytes (excluding the checksum byte).
    pub fn entropy(&self) -> &[u8] {
        &self.entropy[..self.entropy_length]
    }

    /// The `index`-th word of the phrase.
    pub fn word(&self, index: usize) -> Result<&'static str> {
        if index >= self.word_count {
            return Err(Error::NotFound);
        }
        let start_bit = index * 11;
        let mut value = 0usize;
        for i in 0..11 {
            let b = start_bit + i;
            let byte = self.entropy[b / 8];
            let bit = (byte >> (7 - (b % 8))) & 1;
            value = (value << 1) | bit as usize;
        }
        wordlist::word_at(value).ok_or(Error::NotFound)
    }

    /// Reassembles the full space-separated phrase.
    pub fn phrase(&self) -> Result<String> {
        let mut s = String::new();
        for i in 0..self.word_count {
            if i > 0 {
                s.push(' ');
            }
            s.push_str(self.word(i)?);
        }
        Ok(s)
    }

    /// Derives the 64-byte BIP-39 seed via PBKDF2-HMAC-SHA512.
    ///
    /// `password` must be printable ASCII (32-126); NFKD normalization of
    /// non-ASCII passphrases is out of scope.
    pub fn seed(&self, password: &str) -> Result<[u8; SEED_LENGTH]> {
        if !password.bytes().all(|b| (32..=126).contains(&b)) {
            return Err(Error::UnsupportedFeature);
        }
        let phrase = self.phrase()?;
        let mut salt = String::from("mnemonic");
        salt.push_str(password);

        let mut seed = [0u8; SEED_LENGTH];
        pbkdf2::pbkdf2_hmac::<sha2::Sha512>(phrase.as_bytes(), salt.as_bytes(), 2048, &mut seed);
        Ok(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon \
                                abandon abandon abandon about";

    #[test]
    fn test_entropy_to_phrase() {
        let m = Mnemonic::from_entropy(&[0u8; 16]).unwrap();
        assert_eq!(m.word_count(), 12);
        assert_eq!(m.phrase().unwrap(), TEST_PHRASE);
    }

    #[test]
    fn test_phrase_to_entropy_roundtrip() {
        let m = Mnemonic::from_phrase(TEST_PHRASE).unwrap();
        assert_eq!(m.entropy(), &[0u8; 16]);
        assert_eq!(m.phrase().unwrap(), TEST_PHRASE);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let bad = "abandon abandon abandon abandon abandon abandon abandon abandon \
                   abandon abandon abandon abandon";
        assert_eq!(Mnemonic::from_phrase(bad), Err(Error::BadData));
    }

    #[test]
    fn test_unknown_word_rejected() {
        let bad = "abandon abandon abandon abandon abandon abandon abandon abandon \
                   abandon abandon abandon notaword";
        assert_eq!(Mnemonic::from_phrase(bad), Err(Error::NotFound));
    }

    #[test]
    fn test_seed_matches_known_vector() {
        let m = Mnemonic::from_phrase(TEST_PHRASE).unwrap();
        let seed = m.seed("").unwrap();
        assert_eq!(seed[..8], hex_literal::hex!("5eb00bbddcf06908"));
    }

    #[test]
    fn test_non_ascii_password_rejected() {
        let m = Mnemonic::from_phrase(TEST_PHRASE).unwrap();
        assert_eq!(m.seed("caf\u{e9}"), Err(Error::UnsupportedFeature));
    }
}
