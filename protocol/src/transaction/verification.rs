//! Transaction verification and the transaction error type.
//!
//! Anyone holding a signed record can check it: the owner modulus is in the
//! record, so no key lookup is needed. The checks run cheapest first (the
//! id hash) before the RSA verification.

use thiserror::Error;
use tracing::debug;

use super::builder::Transaction;
use super::types::AmountError;
use crate::codec::DecodeError;
use crate::crypto::{sha256_array, KeyError, KeyMaterial};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from building, signing or verifying a transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// A base64url field in the record does not decode.
    #[error("malformed transaction field: {0}")]
    Decode(#[from] DecodeError),

    /// A builder input that must be base64url is not.
    #[error("invalid {field}: {source}")]
    InvalidField {
        field: &'static str,
        source: DecodeError,
    },

    #[error("invalid quantity: {0}")]
    InvalidQuantity(AmountError),

    #[error("invalid reward: {0}")]
    InvalidReward(AmountError),

    /// No reward was set. Ask a gateway for a price first.
    #[error("reward is required")]
    MissingReward,

    /// The signing key's modulus is not the transaction's owner.
    #[error("signing key does not own this transaction")]
    OwnerMismatch,

    /// A signature that was just produced did not verify. Nothing was
    /// returned to the caller.
    #[error("fresh signature failed self-verification")]
    SignatureIntegrity,

    /// The record has an empty signature field.
    #[error("transaction is unsigned")]
    MissingSignature,

    /// Key-level failure: no private half, malformed signature length,
    /// unusable owner modulus.
    #[error(transparent)]
    Key(#[from] KeyError),
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Check a signed transaction.
///
/// Returns `Ok(true)` only if the id is `SHA-256(signature)` and the
/// signature verifies under `owner` against the recomputed canonical
/// message. A well-formed record that fails either check is `Ok(false)`.
///
/// # Errors
///
/// - [`TransactionError::MissingSignature`] for an unsigned record.
/// - [`TransactionError::Decode`] if any field is not valid base64url.
/// - [`TransactionError::Key`] if the owner is not a usable modulus or the
///   signature length does not match it.
pub fn verify_transaction(tx: &Transaction) -> Result<bool, TransactionError> {
    if !tx.is_signed() {
        return Err(TransactionError::MissingSignature);
    }

    let signature = tx.signature().decode()?;
    if tx.id().decode()? != sha256_array(&signature) {
        debug!(id = %tx.id(), "transaction id does not match its signature");
        return Ok(false);
    }

    let owner = KeyMaterial::from_public_modulus(&tx.owner().decode()?)?;
    let message = tx.signing_message()?;
    let valid = owner.verify(&message, &signature)?;
    if !valid {
        debug!(id = %tx.id(), owner = %owner.address(), "signature does not verify");
    }
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::signing::sign_transaction;
    use crate::transaction::types::Tag;

    const WALLET_A: &str = include_str!("../../tests/fixtures/wallet_a.json");

    fn signed() -> Transaction {
        let key = KeyMaterial::from_jwk_json(WALLET_A).unwrap();
        let unsigned = TransactionBuilder::new()
            .data(b"hello".to_vec())
            .tag(Tag::new("Content-Type", "text/plain"))
            .reward("1000")
            .build(&key)
            .unwrap();
        sign_transaction(unsigned, &key).unwrap()
    }

    /// Edit one field of the wire record, the way a tampering relay would.
    fn tamper(tx: &Transaction, field: &str, value: serde_json::Value) -> Transaction {
        let mut json = serde_json::to_value(tx).unwrap();
        json[field] = value;
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn valid_transaction_verifies() {
        assert!(verify_transaction(&signed()).unwrap());
    }

    #[test]
    fn tampered_fields_fail() {
        let tx = signed();
        let cases = [
            ("data", serde_json::json!("aGVsbG8h")),
            ("reward", serde_json::json!("1001")),
            ("quantity", serde_json::json!("1")),
            ("last_tx", serde_json::json!("AAAA")),
            ("target", serde_json::json!("AAAA")),
            (
                "tags",
                serde_json::json!([{ "name": "Q29udGVudC1UeXBl", "value": "dGV4dC9odG1s" }]),
            ),
        ];
        for (field, value) in cases {
            let tampered = tamper(&tx, field, value);
            assert!(
                !verify_transaction(&tampered).unwrap(),
                "tampering with {field} must be detected"
            );
        }
    }

    #[test]
    fn id_not_matching_signature_fails() {
        let tx = signed();
        let tampered = tamper(&tx, "id", serde_json::json!("A".repeat(43)));
        assert!(!verify_transaction(&tampered).unwrap());
    }

    #[test]
    fn unsigned_draft_is_an_error() {
        let key = KeyMaterial::from_jwk_json(WALLET_A).unwrap();
        let draft = TransactionBuilder::new()
            .reward("1")
            .build(&key)
            .unwrap()
            .draft();
        match verify_transaction(&draft) {
            Err(TransactionError::MissingSignature) => {}
            other => panic!("expected MissingSignature, got {:?}", other),
        }
    }

    #[test]
    fn malformed_signature_is_an_error() {
        let tx = signed();
        let tampered = tamper(&tx, "signature", serde_json::json!("not+valid"));
        match verify_transaction(&tampered) {
            Err(TransactionError::Decode(_)) => {}
            other => panic!("expected Decode, got {:?}", other),
        }
    }

    #[test]
    fn truncated_signature_is_an_error() {
        let tx = signed();
        let mut signature = tx.signature().decode().unwrap();
        signature.truncate(200);
        let id = crate::codec::encode_b64url(&sha256_array(&signature));
        let mut json = serde_json::to_value(&tx).unwrap();
        json["signature"] = crate::codec::encode_b64url(&signature).into();
        json["id"] = id.into();
        let tampered: Transaction = serde_json::from_value(json).unwrap();
        match verify_transaction(&tampered) {
            Err(TransactionError::Key(KeyError::MalformedSignature { got: 200, .. })) => {}
            other => panic!("expected MalformedSignature, got {:?}", other),
        }
    }
}
