//! Transaction signing with RSA-PSS.
//!
//! Signing is a separate step from building because the key may not be
//! around at construction time (a remote signer, a wallet prompt). The
//! signed bytes are [`UnsignedTransaction::canonical_message`].

use tracing::{error, info};

use super::builder::{Transaction, UnsignedTransaction};
use super::verification::TransactionError;
use crate::codec::B64Url;
use crate::crypto::{sha256_array, KeyMaterial};

/// Sign an assembled transaction, consuming it.
///
/// The procedure:
/// 1. Check that `key` owns the transaction.
/// 2. Compute the canonical message.
/// 3. Sign it: RSA-PSS, SHA-256, MGF1-SHA-256, salt length 0.
/// 4. `id = SHA-256(signature)`.
/// 5. Verify the fresh signature against a freshly recomputed message
///    before returning anything.
///
/// The result is either fully signed or an error; there is no half-signed
/// state to observe.
///
/// # Errors
///
/// - [`TransactionError::OwnerMismatch`] if `key` is not the owner.
/// - [`TransactionError::Key`] with `MissingPrivateKey` for a public-only key.
/// - [`TransactionError::SignatureIntegrity`] if step 5 fails.
pub fn sign_transaction(
    tx: UnsignedTransaction,
    key: &KeyMaterial,
) -> Result<Transaction, TransactionError> {
    if tx.owner().decode()? != key.modulus() {
        return Err(TransactionError::OwnerMismatch);
    }

    let message = tx.canonical_message()?;
    let signature = key.sign(&message)?;
    let id = sha256_array(&signature);

    // Must be a fresh canonicalization, not `message`.
    let recomputed = tx.canonical_message()?;
    if !key.verify(&recomputed, &signature)? {
        error!(owner = %key.address(), "fresh signature failed self-verification");
        return Err(TransactionError::SignatureIntegrity);
    }

    let tx = tx.into_signed(B64Url::from_bytes(&id), B64Url::from_bytes(&signature));
    info!(
        id = %tx.id(),
        owner = %key.address(),
        data_size = tx.data().as_str().len(),
        "transaction signed"
    );
    Ok(tx)
}
