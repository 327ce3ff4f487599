//! EIP-55 mixed-case checksum addresses.

use crate::error::{Error, Result};
use alloc::string::String;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;
use tiny_keccak::{Hasher, Keccak};

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Derives the 20-byte Ethereum address from a compressed secp256k1
/// public key: `keccak256(uncompressed_pubkey[1..])[12..]`.
pub fn address_from_pubkey(compressed: &[u8; 33]) -> Result<[u8; 20]> {
    let pubkey = PublicKey::from_sec1_bytes(compressed).map_err(|_| Error::BadData)?;
    let encoded = pubkey.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Ok(address)
}

/// Renders a 20-byte address as `0x` + 40 EIP-55 checksummed hex nibbles.
///
/// The hash is taken over the lowercase hex digits themselves (as ASCII),
/// not the raw address bytes; nibble `i` of the address is uppercased iff
/// nibble `i` of the hash is `>= 8`.
pub fn to_checksum_address(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        if c.is_ascii_digit() {
            out.push(c);
            continue;
        }
        let hash_byte = hash[i / 2];
        let hash_nibble = if i % 2 == 0 { hash_byte >> 4 } else { hash_byte & 0x0f };
        if hash_nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}
