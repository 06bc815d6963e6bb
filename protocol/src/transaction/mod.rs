//! # Transaction Module
//!
//! Construction, signing and verification of ledger transactions. A
//! transaction carries an optional value transfer (`target` + `quantity`),
//! an optional payload (`data`), ordered tags, and a fee (`reward`).
//!
//! ## Architecture
//!
//! ```text
//! types.rs        Value types (Winston, Tag, TransactionStatus)
//! canonical.rs    The exact byte string a signature covers
//! builder.rs      TransactionBuilder, UnsignedTransaction, signed Transaction
//! signing.rs      RSA-PSS signing with self-verification
//! verification.rs Third-party verification and TransactionError
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder`] validates fields into an
//!    [`UnsignedTransaction`] owned by a key.
//! 2. **Sign**: [`sign_transaction`] consumes it and returns a
//!    [`Transaction`] whose id is `SHA-256(signature)`.
//! 3. **Submit**: hand it to a [`NetworkGateway`](crate::network::NetworkGateway).
//! 4. **Verify**: anyone runs [`verify_transaction`] on the wire record.
//!
//! ## Design Decisions
//!
//! - Amounts are decimal text, never integers or floats. The text is what
//!   gets signed.
//! - Signing is deterministic (PSS salt length 0), so the same fields and
//!   key always produce the same id.

pub mod builder;
pub mod canonical;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{Transaction, TransactionBuilder, UnsignedTransaction};
pub use canonical::{canonical_message, tag_message, MessageFields};
pub use signing::sign_transaction;
pub use types::{AmountError, Tag, TransactionStatus, Winston};
pub use verification::{verify_transaction, TransactionError};
