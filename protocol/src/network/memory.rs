//! In-process gateway.
//!
//! A small ledger behind a `parking_lot::RwLock`. It verifies every
//! submitted transaction the way a real node would, refuses overdrafts,
//! keeps balances and the per-wallet `last_tx` anchor, and prices storage
//! at a fixed rate per byte. Transactions stay pending until [`MemoryGateway::mine`] is called.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::gateway::{GatewayError, NetworkGateway};
use crate::codec::encode_b64url;
use crate::crypto::hash::sha256_multi;
use crate::crypto::Address;
use crate::transaction::{verify_transaction, Transaction, TransactionStatus, Winston};

/// Winston charged per stored byte unless configured otherwise.
pub const DEFAULT_PRICE_PER_BYTE: u128 = 10;

#[derive(Debug, Clone)]
struct Entry {
    tx: Transaction,
    /// Height of the block that includes it, once mined.
    block_height: Option<u64>,
}

#[derive(Debug, Default)]
struct Ledger {
    transactions: HashMap<String, Entry>,
    /// Submission order, for `query`.
    order: Vec<String>,
    last_tx: HashMap<Address, String>,
    balances: HashMap<Address, u128>,
    height: u64,
}

fn amount(w: &Winston) -> Result<u128, GatewayError> {
    w.to_u128()
        .ok_or_else(|| GatewayError::Rejected(format!("amount {} out of range", w)))
}

/// A [`NetworkGateway`] that keeps everything in memory.
#[derive(Debug)]
pub struct MemoryGateway {
    ledger: RwLock<Ledger>,
    price_per_byte: u128,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::with_price_per_byte(DEFAULT_PRICE_PER_BYTE)
    }

    pub fn with_price_per_byte(price_per_byte: u128) -> Self {
        Self {
            ledger: RwLock::new(Ledger::default()),
            price_per_byte,
        }
    }

    /// Credit a wallet out of thin air.
    pub fn fund(&self, address: &Address, winston: u128) -> Result<(), GatewayError> {
        let mut ledger = self.ledger.write();
        let balance = ledger.balances.entry(*address).or_default();
        *balance = balance
            .checked_add(winston)
            .ok_or_else(|| GatewayError::Rejected("balance overflow".into()))?;
        Ok(())
    }

    /// Include every pending transaction in a new block. Returns how many
    /// were included.
    pub fn mine(&self) -> usize {
        let mut ledger = self.ledger.write();
        ledger.height += 1;
        let height = ledger.height;
        let mut mined = 0;
        for entry in ledger.transactions.values_mut() {
            if entry.block_height.is_none() {
                entry.block_height = Some(height);
                mined += 1;
            }
        }
        info!(height, mined, "mined block");
        mined
    }

    pub fn height(&self) -> u64 {
        self.ledger.read().height
    }

    pub fn len(&self) -> usize {
        self.ledger.read().transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, id: &str) -> Result<Entry, GatewayError> {
        self.ledger
            .read()
            .transactions
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound {
                resource: format!("tx/{}", id),
            })
    }
}

#[async_trait]
impl NetworkGateway for MemoryGateway {
    async fn submit(&self, tx: &Transaction) -> Result<(), GatewayError> {
        match verify_transaction(tx) {
            Ok(true) => {}
            Ok(false) => {
                warn!(id = %tx.id(), "rejected transaction with invalid signature");
                return Err(GatewayError::Rejected("invalid signature".into()));
            }
            Err(e) => {
                warn!(id = %tx.id(), error = %e, "rejected malformed transaction");
                return Err(GatewayError::Rejected(e.to_string()));
            }
        }

        let owner = tx
            .owner_address()
            .map_err(|e| GatewayError::Rejected(e.to_string()))?;
        let reward = amount(tx.reward())?;
        let quantity = amount(tx.quantity())?;
        let target = if tx.target().is_empty() {
            None
        } else {
            Some(
                tx.target()
                    .as_str()
                    .parse::<Address>()
                    .map_err(|e| GatewayError::Rejected(format!("invalid target: {}", e)))?,
            )
        };

        let debit = reward
            .checked_add(quantity)
            .ok_or_else(|| GatewayError::Rejected("amount overflow".into()))?;

        let id = tx.id().as_str().to_string();
        let mut ledger = self.ledger.write();
        if ledger.transactions.contains_key(&id) {
            return Err(GatewayError::Rejected("transaction already processed".into()));
        }

        // Nothing is written until every check has passed.
        let balance = ledger.balances.get(&owner).copied().unwrap_or(0);
        let remaining = balance.checked_sub(debit).ok_or_else(|| {
            warn!(%id, %owner, balance, debit, "rejected overdraft");
            GatewayError::Rejected("insufficient balance".into())
        })?;
        let credit = match target {
            Some(target) => {
                let current = if target == owner {
                    remaining
                } else {
                    ledger.balances.get(&target).copied().unwrap_or(0)
                };
                let credited = current
                    .checked_add(quantity)
                    .ok_or_else(|| GatewayError::Rejected("target balance overflow".into()))?;
                Some((target, credited))
            }
            None => None,
        };

        ledger.balances.insert(owner, remaining);
        if let Some((target, credited)) = credit {
            ledger.balances.insert(target, credited);
        }
        ledger.last_tx.insert(owner, id.clone());
        ledger.order.push(id.clone());
        ledger.transactions.insert(
            id.clone(),
            Entry {
                tx: tx.clone(),
                block_height: None,
            },
        );
        debug!(%id, %owner, "accepted transaction");
        Ok(())
    }

    async fn fetch_transaction(&self, id: &str) -> Result<Transaction, GatewayError> {
        Ok(self.entry(id)?.tx)
    }

    async fn fetch_status(&self, id: &str) -> Result<TransactionStatus, GatewayError> {
        let entry = self.entry(id)?;
        let current = self.height();
        Ok(match entry.block_height {
            None => TransactionStatus::Pending,
            Some(height) => TransactionStatus::Confirmed {
                block_indep_hash: encode_b64url(&sha256_multi(&[
                    &height.to_be_bytes()[..],
                    id.as_bytes(),
                ])),
                block_height: height,
                number_of_confirmations: current - height + 1,
            },
        })
    }

    async fn fetch_data(&self, id: &str) -> Result<Vec<u8>, GatewayError> {
        self.entry(id)?
            .tx
            .data_bytes()
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    async fn fetch_last_tx(&self, address: &Address) -> Result<String, GatewayError> {
        Ok(self
            .ledger
            .read()
            .last_tx
            .get(address)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_balance(&self, address: &Address) -> Result<Winston, GatewayError> {
        let balance = self.ledger.read().balances.get(address).copied().unwrap_or(0);
        Ok(Winston::from(balance))
    }

    async fn fetch_price(
        &self,
        byte_size: usize,
        _target: Option<&Address>,
    ) -> Result<Winston, GatewayError> {
        self.price_per_byte
            .checked_mul(byte_size as u128)
            .map(Winston::from)
            .ok_or_else(|| GatewayError::Rejected(format!("cannot price {} bytes", byte_size)))
    }

    async fn query(&self, _query: serde_json::Value) -> Result<Vec<String>, GatewayError> {
        Ok(self.ledger.read().order.clone())
    }
}
