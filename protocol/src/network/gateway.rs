//! The gateway contract: how signed transactions reach the network and how
//! ledger state comes back.
//!
//! Signing never depends on this module. A gateway is only needed to submit,
//! to look things up, and to fill in `last_tx` and `reward` before signing
//! (see [`create_transaction`]).

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::crypto::{Address, KeyMaterial};
use crate::transaction::{
    sign_transaction, Transaction, TransactionBuilder, TransactionError, TransactionStatus, Winston,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors reported by a [`NetworkGateway`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway has no such resource (HTTP 404 or 410).
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// Any other status the endpoint does not accept.
    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The gateway refused a submitted transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// Connection, TLS or timeout failure. Not retried.
    #[error("transport error: {0}")]
    Transport(String),

    /// The gateway answered with something that does not parse.
    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),
}

/// Errors from [`create_transaction`].
#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

// ---------------------------------------------------------------------------
// NetworkGateway
// ---------------------------------------------------------------------------

/// A node (or stand-in) that accepts transactions and answers ledger
/// queries. Ids and addresses are base64url text on the wire.
#[async_trait]
pub trait NetworkGateway: Send + Sync {
    /// Submit a signed transaction.
    async fn submit(&self, tx: &Transaction) -> Result<(), GatewayError>;

    /// Fetch a transaction record by id.
    async fn fetch_transaction(&self, id: &str) -> Result<Transaction, GatewayError>;

    async fn fetch_status(&self, id: &str) -> Result<TransactionStatus, GatewayError>;

    /// Fetch a transaction's payload, decoded.
    async fn fetch_data(&self, id: &str) -> Result<Vec<u8>, GatewayError>;

    /// Id of the wallet's most recent transaction; empty for a new wallet.
    async fn fetch_last_tx(&self, address: &Address) -> Result<String, GatewayError>;

    async fn fetch_balance(&self, address: &Address) -> Result<Winston, GatewayError>;

    /// Fee for storing `byte_size` bytes, optionally transferring to `target`.
    async fn fetch_price(
        &self,
        byte_size: usize,
        target: Option<&Address>,
    ) -> Result<Winston, GatewayError>;

    /// Pass-through ledger query. Returns matching transaction ids.
    async fn query(&self, query: serde_json::Value) -> Result<Vec<String>, GatewayError>;
}

// ---------------------------------------------------------------------------
// create_transaction
// ---------------------------------------------------------------------------

/// Build and sign a transaction, asking the gateway for whatever the
/// builder left unset.
///
/// - `last_tx` comes from `fetch_last_tx(owner)`.
/// - `reward` comes from `fetch_price(data length, target)`.
///
/// Values set explicitly on the builder are never overwritten. The result
/// is signed but not submitted.
pub async fn create_transaction<G>(
    gateway: &G,
    key: &KeyMaterial,
    mut builder: TransactionBuilder,
) -> Result<Transaction, CreateError>
where
    G: NetworkGateway + ?Sized,
{
    if !builder.has_last_tx() {
        let last_tx = gateway.fetch_last_tx(&key.address()).await?;
        debug!(owner = %key.address(), last_tx = %last_tx, "anchored to last transaction");
        builder = builder.last_tx(last_tx);
    }

    if !builder.has_reward() {
        // A malformed target is reported by `build` below.
        let target = builder.target_text().parse::<Address>().ok();
        let price = gateway.fetch_price(builder.data_len(), target.as_ref()).await?;
        debug!(bytes = builder.data_len(), price = %price, "priced transaction");
        builder = builder.reward(price);
    }

    let unsigned = builder.build(key)?;
    Ok(sign_transaction(unsigned, key)?)
}
