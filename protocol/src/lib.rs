// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Weave Protocol: Core Library
//!
//! Signed, content-addressed transactions for a permanent-storage ledger.
//! A wallet is an RSA key; its address is the SHA-256 of its modulus. A
//! transaction is signed with RSA-PSS over a canonical byte string, and its
//! id is the SHA-256 of the signature.
//!
//! ## Architecture
//!
//! - **codec**: base64url, the text form of every binary field.
//! - **crypto**: SHA-256, addresses, RSA-PSS keys, JWK wallet files.
//! - **transaction**: building, canonicalizing, signing, verifying.
//! - **network**: the gateway contract, an HTTP client and an in-memory ledger.
//! - **config**: protocol constants and gateway settings.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use weave_protocol::crypto::KeyMaterial;
//! use weave_protocol::transaction::{sign_transaction, verify_transaction, TransactionBuilder};
//!
//! let key = KeyMaterial::from_jwk_json(&std::fs::read_to_string("wallet.json").unwrap()).unwrap();
//! let unsigned = TransactionBuilder::new()
//!     .data(b"hello".to_vec())
//!     .reward("1000")
//!     .build(&key)
//!     .unwrap();
//! let tx = sign_transaction(unsigned, &key).unwrap();
//! assert!(verify_transaction(&tx).unwrap());
//! ```
//!
//! ## Design Philosophy
//!
//! 1. The signed bytes are sacred. One function builds them.
//! 2. Signing is deterministic. Same key, same fields, same id.
//! 3. Keys never appear in logs or `Debug` output.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod network;
pub mod transaction;

pub use codec::{decode_b64url, encode_b64url, B64Url, DecodeError};
pub use crypto::{Address, KeyError, KeyMaterial};
pub use network::{GatewayError, HttpGateway, MemoryGateway, NetworkGateway};
pub use transaction::{
    sign_transaction, verify_transaction, Tag, Transaction, TransactionBuilder, TransactionError,
    Winston,
};
