//! # Hashing Utilities
//!
//! SHA-256 is the only hash in this protocol. It shows up three times:
//!
//! - as the message digest and MGF1 hash of the RSA-PSS signature scheme,
//! - as the address function (`SHA-256(modulus)`),
//! - as the transaction id function (`SHA-256(signature)`).
//!
//! The network's verifiers hash with SHA-256 and nothing else; there is
//! no pluggable hasher.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data as a `Vec<u8>`.
///
/// # Example
///
/// ```
/// use weave_protocol::crypto::sha256;
///
/// let hash = sha256(b"permanent data");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
///
/// Addresses and transaction ids are both exactly 32 bytes, so most callers
/// want this variant.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash several byte slices as if they were concatenated, without
/// allocating the concatenation.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
