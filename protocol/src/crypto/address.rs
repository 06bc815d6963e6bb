//! # Wallet Addresses
//!
//! An address is the public, network-visible name of a key holder:
//!
//! ```text
//! modulus (raw big-endian bytes, 256 bytes for RSA-2048)
//!     -> SHA-256 -> 32 bytes
//!     -> base64url -> 43 characters
//! ```
//!
//! The address is a pure function of the modulus. The public exponent is
//! not hashed, which is fine because the network only accepts 65537.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hash::sha256_array;
use crate::codec::{decode_b64url, encode_b64url, DecodeError};
use crate::config::ADDRESS_LENGTH;

/// Errors that can occur while parsing an address string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is not valid base64url: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid address length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

/// A 32-byte wallet address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Derive the address of an RSA modulus: `SHA-256(modulus_bytes)`.
    ///
    /// # Example
    ///
    /// ```
    /// use weave_protocol::crypto::Address;
    ///
    /// let a = Address::derive(&[0xAB; 256]);
    /// let b = Address::derive(&[0xAB; 256]);
    /// assert_eq!(a, b);
    /// assert_eq!(a.to_string().len(), 43);
    /// ```
    pub fn derive(modulus: &[u8]) -> Self {
        Self(sha256_array(modulus))
    }

    pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

/// Free-function form of [`Address::derive`].
pub fn derive_address(modulus: &[u8]) -> Address {
    Address::derive(modulus)
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_b64url(s)?;
        let arr: [u8; ADDRESS_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| AddressError::InvalidLength {
                    expected: ADDRESS_LENGTH,
                    got: bytes.len(),
                })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_b64url(&self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
