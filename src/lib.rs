//! Embedded-friendly Ethereum-compatible cryptography and serialization
//! toolkit: a streaming zero-copy CBOR codec, an RLP codec, BIP-39/BIP-32
//! mnemonic and HD key derivation, EIP-55 checksum addresses, fixed-point
//! decimal formatting, and an EIP-1559 transaction serializer.
//!
//! `no_std` by default (the `std` feature only widens `hex` and `k256`);
//! every allocation goes through `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod address;
pub mod bip32;
pub mod bip39;
pub mod cbor;
pub mod db;
pub mod decimal;
pub mod error;
pub mod rlp;
pub mod tx;

pub use error::{Error, Result};
