//! BIP-32 hierarchical-deterministic key derivation over secp256k1.
//!
//! CKDpriv/CKDpub are implemented directly against `k256`'s scalar and
//! point arithmetic rather than through the `bip32` crate, which only
//! exposes its own `ExtendedPrivateKey`/`ExtendedPublicKey` shape — not the
//! prime/neutered node with Ledger- and MetaMask-style account derivation
//! this crate needs.

use crate::error::{Error, Result};
use alloc::vec::Vec;
use hmac::{Hmac, Mac};
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::{Field, PrimeField};
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, PublicKey, Scalar, SecretKey};
use sha2::Sha512;
use zeroize::Zeroize;

/// Top bit marking a hardened child index.
pub const HARDENED: u32 = 0x8000_0000;

/// The conventional Ethereum derivation path: `m/44'/60'/0'/0/0`.
pub const DEFAULT_PATH: &str = "m/44'/60'/0'/0/0";

type HmacSha512 = Hmac<Sha512>;

fn hmac_sha512(key: &[u8], data: &[u8]) -> Result<[u8; 64]> {
    let mut mac = HmacSha512::new_from_slice(key).map_err(|_| Error::InvalidOperation)?;
    mac.update(data);
    let out = mac.finalize().into_bytes();
    let mut buf = [0u8; 64];
    buf.copy_from_slice(&out);
    Ok(buf)
}

fn scalar_from_bytes(bytes: &[u8]) -> Result<Scalar> {
    let repr = FieldBytes::clone_from_slice(bytes);
    Option::from(Scalar::from_repr(repr)).ok_or(Error::Overflow)
}

fn compressed_pubkey(privkey: &[u8; 32]) -> Result<[u8; 33]> {
    let secret = SecretKey::from_bytes(FieldBytes::from_slice(privkey)).map_err(|_| Error::BadData)?;
    let encoded = secret.public_key().to_encoded_point(true);
    let mut out = [0u8; 33];
    out.copy_from_slice(encoded.as_bytes());
    Ok(out)
}

fn affine_from_compressed(pubkey: &[u8]) -> Result<AffinePoint> {
    let encoded = EncodedPoint::from_bytes(pubkey).map_err(|_| Error::BadData)?;
    Option::from(AffinePoint::from_encoded_point(&encoded)).ok_or(Error::BadData)
}

/// The key half of an HD node: either the 32-byte secret, or — once
/// neutered — the 33-byte compressed public key only.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
enum Key {
    Private([u8; 32]),
    Public([u8; 33]),
}

/// A node in a BIP-32 derivation tree.
///
/// `neutered` isn't tracked as a separate flag: it's simply whether `key`
/// holds a [`Key::Public`] — a private key is always available until the
/// node is explicitly [`HDNode::neuter`]ed.
#[derive(Clone)]
pub struct HDNode {
    key: Key,
    chain_code: [u8; 32],
    depth: u32,
    index: u32,
}

impl HDNode {
    /// Derives the master node from a BIP-39 seed via
    /// `HMAC-SHA512("Bitcoin seed", seed)`.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        let i = hmac_sha512(b"Bitcoin seed", seed)?;
        let (il, ir) = i.split_at(32);

        // Validate that IL is actually usable as a secp256k1 scalar.
        scalar_from_bytes(il)?;

        let mut key = [0u8; 32];
        key.copy_from_slice(il);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);

        Ok(HDNode { key: Key::Private(key), chain_code, depth: 0, index: 0 })
    }

    /// True once this node has had its secret stripped by [`HDNode::neuter`].
    pub fn is_neutered(&self) -> bool {
        matches!(self.key, Key::Public(_))
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// The 32-byte secret key, if this node still carries one.
    pub fn privkey(&self) -> Result<[u8; 32]> {
        match self.key {
            Key::Private(k) => Ok(k),
            Key::Public(_) => Err(Error::InvalidOperation),
        }
    }

    /// The 33-byte compressed public key.
    pub fn pubkey(&self) -> Result<[u8; 33]> {
        match &self.key {
            Key::Public(p) => Ok(*p),
            Key::Private(k) => compressed_pubkey(k),
        }
    }

    /// Strips the secret key, leaving only the compressed public key.
    pub fn neuter(&mut self) -> Result<()> {
        let pubkey = self.pubkey()?;
        self.key = Key::Public(pubkey);
        Ok(())
    }

    /// CKDpriv/CKDpub: derives the `index`-th child in place.
    ///
    /// Hardened indices (top bit set) require a private key; a neutered
    /// node rejects them with [`Error::InvalidOperation`].
    pub fn derive_child(&mut self, index: u32) -> Result<()> {
        let hardened = index & HARDENED != 0;
        if hardened && self.is_neutered() {
            return Err(Error::InvalidOperation);
        }

        let mut data = Vec::with_capacity(37);
        match &self.key {
            Key::Private(k) => {
                if hardened {
                    data.push(0);
                    data.extend_from_slice(k);
                } else {
                    data.extend_from_slice(&compressed_pubkey(k)?);
                }
            }
            Key::Public(p) => data.extend_from_slice(p),
        }
        data.extend_from_slice(&index.to_be_bytes());

        let i = hmac_sha512(&self.chain_code, &data)?;
        let (il, ir) = i.split_at(32);
        let il_scalar = scalar_from_bytes(il)?;

        let new_key = match &self.key {
            Key::Private(k) => {
                let k_scalar = scalar_from_bytes(k)?;
                let child_scalar = il_scalar + k_scalar;
                if bool::from(child_scalar.is_zero()) {
                    return Err(Error::InvalidOperation);
                }
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(child_scalar.to_repr().as_slice());
                Key::Private(bytes)
            }
            Key::Public(p) => {
                let parent = affine_from_compressed(p)?;
                let child_point = ProjectivePoint::GENERATOR * il_scalar + ProjectivePoint::from(parent);
                let child_affine = child_point.to_affine();
                let pubkey = PublicKey::from_affine(child_affine).map_err(|_| Error::InvalidOperation)?;
                let encoded = pubkey.to_encoded_point(true);
                let mut bytes = [0u8; 33];
                bytes.copy_from_slice(encoded.as_bytes());
                Key::Public(bytes)
            }
        };

        self.key = new_key;
        self.chain_code.copy_from_slice(ir);
        self.depth = self.depth.wrapping_add(1);
        self.index = index;
        Ok(())
    }

    fn derive_component(&mut self, index: u32, hardened: bool) -> Result<()> {
        if index >= HARDENED {
            return Err(Error::Overflow);
        }
        self.derive_child(if hardened { index | HARDENED } else { index })
    }

    /// Walks a path like `m/44'/60'/0'/0/0`.
    ///
    /// `m` is only valid as the first component of a path starting from the
    /// master node (`depth == 0`). A `'` must follow a digit and may not be
    /// doubled; digit accumulation rejects components at or past the
    /// hardened-index boundary.
    pub fn derive_path(&mut self, path: &str) -> Result<()> {
        let bytes = path.as_bytes();
        if bytes.is_empty() {
            return Err(Error::BadData);
        }

        let mut i = 0;
        if bytes[0] == b'm' {
            if self.depth != 0 {
                return Err(Error::BadData);
            }
            i = 1;
            if i < bytes.len() {
                if bytes[i] != b'/' {
                    return Err(Error::BadData);
                }
                i += 1;
            }
        }

        let mut index: u32 = 0;
        let mut has_digit = false;
        let mut hardened = false;

        while i < bytes.len() {
            match bytes[i] {
                c @ b'0'..=b'9' => {
                    if hardened {
                        return Err(Error::BadData);
                    }
                    if index > 214_748_364 {
                        return Err(Error::Overflow);
                    }
                    index = index * 10 + (c - b'0') as u32;
                    has_digit = true;
                }
                b'\'' => {
                    if !has_digit || hardened {
                        return Err(Error::BadData);
                    }
                    hardened = true;
                }
                b'/' => {
                    if !has_digit {
                        return Err(Error::BadData);
                    }
                    self.derive_component(index, hardened)?;
                    index = 0;
                    has_digit = false;
                    hardened = false;
                }
                _ => return Err(Error::BadData),
            }
            i += 1;
        }

        if !has_digit {
            return Err(Error::BadData);
        }
        self.derive_component(index, hardened)
    }

    /// Ledger-style account derivation: `m/44'/60'/{account}'/0/0` — the
    /// account index itself is hardened.
    pub fn derive_account(&mut self, account: u32) -> Result<()> {
        self.derive_path("m/44'/60'")?;
        self.derive_component(account, true)?;
        self.derive_path("0/0")
    }

    /// MetaMask-style account derivation: `m/44'/60'/0'/0/{account}` — a
    /// single fixed account at index 0, with a non-hardened account number
    /// as the final index.
    pub fn derive_indexed_account(&mut self, account: u32) -> Result<()> {
        self.derive_path("m/44'/60'/0'/0")?;
        self.derive_component(account, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bip39::Mnemonic;

    const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon \
                                abandon abandon abandon about";

    fn test_seed() -> [u8; 64] {
        Mnemonic::from_phrase(TEST_PHRASE).unwrap().seed("").unwrap()
    }

    #[test]
    fn test_default_path_matches_known_address() {
        let seed = test_seed();
        let mut node = HDNode::from_seed(&seed).unwrap();
        node.derive_path(DEFAULT_PATH).unwrap();
        assert_eq!(node.depth(), 5);
        // address derivation itself is exercised in crate::address's tests
        // via this node's pubkey.
        assert!(node.pubkey().is_ok());
    }

    #[test]
    fn test_neutered_rejects_hardened_child() {
        let seed = test_seed();
        let mut node = HDNode::from_seed(&seed).unwrap();
        node.neuter().unwrap();
        assert_eq!(node.derive_child(HARDENED), Err(Error::InvalidOperation));
    }

    #[test]
    fn test_neutered_matches_private_for_non_hardened_child() {
        let seed = test_seed();
        let mut priv_node = HDNode::from_seed(&seed).unwrap();
        let mut pub_node = priv_node.clone();
        pub_node.neuter().unwrap();

        priv_node.derive_child(0).unwrap();
        pub_node.derive_child(0).unwrap();

        assert_eq!(priv_node.pubkey().unwrap(), pub_node.pubkey().unwrap());
    }

    #[test]
    fn test_ledger_and_metamask_accounts_diverge() {
        let seed = test_seed();
        let mut ledger = HDNode::from_seed(&seed).unwrap();
        ledger.derive_account(0).unwrap();

        let mut metamask = HDNode::from_seed(&seed).unwrap();
        metamask.derive_indexed_account(0).unwrap();

        // Both are account 0 along their respective conventions but reach
        // it via different hardened components, so depth matches while
        // derivation diverges for account 1.
        assert_eq!(ledger.depth(), metamask.depth());

        let mut ledger1 = HDNode::from_seed(&seed).unwrap();
        ledger1.derive_account(1).unwrap();
        let mut metamask1 = HDNode::from_seed(&seed).unwrap();
        metamask1.derive_indexed_account(1).unwrap();
        assert_ne!(ledger1.pubkey().unwrap(), metamask1.pubkey().unwrap());
    }

    #[test]
    fn test_path_rejects_double_tick() {
        let seed = test_seed();
        let mut node = HDNode::from_seed(&seed).unwrap();
        assert_eq!(node.derive_path("m/44''"), Err(Error::BadData));
    }

    #[test]
    fn test_path_rejects_non_root_m() {
        let seed = test_seed();
        let mut node = HDNode::from_seed(&seed).unwrap();
        node.derive_path("m/0").unwrap();
        assert_eq!(node.derive_path("m/1"), Err(Error::BadData));
    }
}
