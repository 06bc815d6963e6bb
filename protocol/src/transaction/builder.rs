//! Transaction records and the fluent builder that assembles them.
//!
//! Two types model the two states a transaction can be in:
//!
//! - [`UnsignedTransaction`]: fields fixed, no id, no signature. Only
//!   [`TransactionBuilder::build`] makes one.
//! - [`Transaction`]: signed. Only [`sign_transaction`] makes one (or
//!   deserialization of a record received from elsewhere, which is why
//!   [`verify_transaction`] exists).
//!
//! Signing consumes the unsigned value, so a transaction cannot be edited
//! after its id exists.
//!
//! [`sign_transaction`]: super::signing::sign_transaction
//! [`verify_transaction`]: super::verification::verify_transaction

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::canonical::{canonical_message, MessageFields};
use super::types::{Tag, Winston};
use super::verification::TransactionError;
use crate::codec::{B64Url, DecodeError};
use crate::config::ID_LENGTH;
use crate::crypto::{Address, KeyMaterial};

// ---------------------------------------------------------------------------
// Transaction (signed)
// ---------------------------------------------------------------------------

/// A signed transaction in its wire shape.
///
/// Fields are private: a signed record is read-only. All byte fields are
/// base64url text; `quantity` and `reward` are decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: B64Url,
    #[serde(default)]
    last_tx: B64Url,
    owner: B64Url,
    #[serde(default)]
    target: B64Url,
    #[serde(default)]
    quantity: Winston,
    #[serde(default)]
    data: B64Url,
    reward: Winston,
    #[serde(default)]
    signature: B64Url,
    #[serde(default)]
    tags: Vec<Tag>,
}

impl Transaction {
    /// `base64url(SHA-256(signature))`.
    pub fn id(&self) -> &B64Url {
        &self.id
    }

    pub fn last_tx(&self) -> &B64Url {
        &self.last_tx
    }

    /// The signer's RSA modulus.
    pub fn owner(&self) -> &B64Url {
        &self.owner
    }

    pub fn target(&self) -> &B64Url {
        &self.target
    }

    pub fn quantity(&self) -> &Winston {
        &self.quantity
    }

    pub fn data(&self) -> &B64Url {
        &self.data
    }

    pub fn reward(&self) -> &Winston {
        &self.reward
    }

    pub fn signature(&self) -> &B64Url {
        &self.signature
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Decoded payload.
    pub fn data_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        self.data.decode()
    }

    /// Address of the signer, derived from `owner`.
    pub fn owner_address(&self) -> Result<Address, DecodeError> {
        Ok(Address::derive(&self.owner.decode()?))
    }

    /// `true` if the record carries a signature. Says nothing about
    /// whether the signature is valid.
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// The canonical message the signature covers.
    pub fn signing_message(&self) -> Result<Vec<u8>, DecodeError> {
        canonical_message(&self.message_fields(), &self.tags)
    }

    fn message_fields(&self) -> MessageFields<'_> {
        MessageFields {
            owner: &self.owner,
            target: &self.target,
            data: &self.data,
            quantity: &self.quantity,
            reward: &self.reward,
            last_tx: &self.last_tx,
        }
    }
}

// ---------------------------------------------------------------------------
// UnsignedTransaction
// ---------------------------------------------------------------------------

/// A fully assembled transaction waiting for its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    last_tx: B64Url,
    owner: B64Url,
    target: B64Url,
    quantity: Winston,
    data: B64Url,
    reward: Winston,
    tags: Vec<Tag>,
}

impl UnsignedTransaction {
    pub fn last_tx(&self) -> &B64Url {
        &self.last_tx
    }

    pub fn owner(&self) -> &B64Url {
        &self.owner
    }

    pub fn target(&self) -> &B64Url {
        &self.target
    }

    pub fn quantity(&self) -> &Winston {
        &self.quantity
    }

    pub fn data(&self) -> &B64Url {
        &self.data
    }

    pub fn reward(&self) -> &Winston {
        &self.reward
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn canonical_message(&self) -> Result<Vec<u8>, DecodeError> {
        canonical_message(
            &MessageFields {
                owner: &self.owner,
                target: &self.target,
                data: &self.data,
                quantity: &self.quantity,
                reward: &self.reward,
                last_tx: &self.last_tx,
            },
            &self.tags,
        )
    }

    /// Wire record for a transaction that has not been signed yet.
    ///
    /// The id is 32 random bytes so drafts never collide; the signature is
    /// empty. Signing replaces both.
    pub fn draft(&self) -> Transaction {
        let mut id = [0u8; ID_LENGTH];
        OsRng.fill_bytes(&mut id);
        self.clone().into_signed(B64Url::from_bytes(&id), B64Url::empty())
    }

    pub(crate) fn into_signed(self, id: B64Url, signature: B64Url) -> Transaction {
        Transaction {
            id,
            last_tx: self.last_tx,
            owner: self.owner,
            target: self.target,
            quantity: self.quantity,
            data: self.data,
            reward: self.reward,
            signature,
            tags: self.tags,
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`UnsignedTransaction`].
///
/// `reward` is the only field without a default; a gateway's price
/// endpoint is the usual source. Everything else defaults to empty (or
/// `"0"` for `quantity`).
///
/// ```rust,no_run
/// use weave_protocol::crypto::KeyMaterial;
/// use weave_protocol::transaction::{sign_transaction, Tag, TransactionBuilder};
///
/// let key = KeyMaterial::from_jwk_json(&std::fs::read_to_string("wallet.json").unwrap()).unwrap();
/// let unsigned = TransactionBuilder::new()
///     .data(b"hello".to_vec())
///     .tag(Tag::new("Content-Type", "text/plain"))
///     .reward("1000")
///     .build(&key)
///     .unwrap();
/// let tx = sign_transaction(unsigned, &key).unwrap();
/// println!("{}", tx.id());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    last_tx: Option<String>,
    target: String,
    quantity: Option<String>,
    data: Vec<u8>,
    tags: Vec<Tag>,
    reward: Option<String>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the owner's previous transaction (anchor), as base64url text.
    pub fn last_tx(mut self, last_tx: impl Into<String>) -> Self {
        self.last_tx = Some(last_tx.into());
        self
    }

    /// Recipient wallet.
    pub fn target(mut self, target: &Address) -> Self {
        self.target = target.to_string();
        self
    }

    /// Recipient as raw base64url text. Validated in [`build`](Self::build).
    pub fn target_raw(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Amount transferred to `target`, in winston.
    pub fn quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    /// Append one tag. Order is preserved and signed.
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Fee in winston.
    pub fn reward(mut self, reward: impl Into<String>) -> Self {
        self.reward = Some(reward.into());
        self
    }

    pub fn has_reward(&self) -> bool {
        self.reward.is_some()
    }

    pub fn has_last_tx(&self) -> bool {
        self.last_tx.is_some()
    }

    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    pub fn target_text(&self) -> &str {
        &self.target
    }

    /// Validate every field and fix the owner to `key`'s modulus.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::MissingReward`] if no reward was set.
    /// - [`TransactionError::InvalidQuantity`] / [`TransactionError::InvalidReward`]
    ///   for non-decimal amounts.
    /// - [`TransactionError::InvalidField`] for undecodable `target` or
    ///   `last_tx` text.
    pub fn build(self, key: &KeyMaterial) -> Result<UnsignedTransaction, TransactionError> {
        let reward = self.reward.ok_or(TransactionError::MissingReward)?;
        let reward = Winston::new(reward).map_err(TransactionError::InvalidReward)?;
        let quantity = match self.quantity {
            Some(q) => Winston::new(q).map_err(TransactionError::InvalidQuantity)?,
            None => Winston::zero(),
        };
        let target = B64Url::parse(&self.target).map_err(|source| TransactionError::InvalidField {
            field: "target",
            source,
        })?;
        let last_tx = B64Url::parse(self.last_tx.as_deref().unwrap_or(""))
            .map_err(|source| TransactionError::InvalidField {
                field: "last_tx",
                source,
            })?;

        debug!(
            owner = %key.address(),
            data_len = self.data.len(),
            tags = self.tags.len(),
            reward = %reward,
            "built unsigned transaction"
        );

        Ok(UnsignedTransaction {
            last_tx,
            owner: key.owner(),
            target,
            quantity,
            data: B64Url::from_bytes(&self.data),
            reward,
            tags: self.tags,
        })
    }
}
