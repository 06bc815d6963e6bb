//! # Cryptographic Primitives
//!
//! Everything the signing protocol needs and nothing more:
//!
//! - **SHA-256** for digests, addresses and transaction ids.
//! - **RSA-PSS** (SHA-256, MGF1-SHA-256, salt length 0) for signatures.
//! - **JWK** import/export for wallet files.
//!
//! Everything here is a thin, type-safe wrapper around RustCrypto crates.
//! The parameters are fixed by the network, not chosen by us.

pub mod address;
pub mod hash;
pub mod jwk;
pub mod keys;

pub use address::{derive_address, Address, AddressError};
pub use hash::{sha256, sha256_array};
pub use jwk::Jwk;
pub use keys::{KeyError, KeyMaterial};
