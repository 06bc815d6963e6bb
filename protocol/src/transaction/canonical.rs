//! The canonical signing message.
//!
//! Signers and verifiers must agree on these bytes exactly, so there is one
//! function that produces them and both sides call it:
//!
//! ```text
//! decode(owner) ‖ decode(target) ‖ decode(data)
//!   ‖ quantity (ASCII digits) ‖ reward (ASCII digits)
//!   ‖ decode(last_tx)
//!   ‖ name₁ ‖ value₁ ‖ name₂ ‖ value₂ ‖ …
//! ```
//!
//! There are no length prefixes or separators. That is how the network
//! defines it; it is not ours to fix.

use super::types::{Tag, Winston};
use crate::codec::{B64Url, DecodeError};

/// Borrowed view of the signed fields of a transaction.
#[derive(Debug, Clone, Copy)]
pub struct MessageFields<'a> {
    pub owner: &'a B64Url,
    pub target: &'a B64Url,
    pub data: &'a B64Url,
    pub quantity: &'a Winston,
    pub reward: &'a Winston,
    pub last_tx: &'a B64Url,
}

/// Concatenated tag bytes in declaration order. No tags gives no bytes.
pub fn tag_message(tags: &[Tag]) -> Vec<u8> {
    tags.iter().fold(Vec::new(), |mut acc, tag| {
        acc.extend_from_slice(&tag.name);
        acc.extend_from_slice(&tag.value);
        acc
    })
}

/// Build the exact byte string that gets signed.
///
/// Fails only when one of the base64url fields does not decode.
pub fn canonical_message(fields: &MessageFields<'_>, tags: &[Tag]) -> Result<Vec<u8>, DecodeError> {
    let owner = fields.owner.decode()?;
    let target = fields.target.decode()?;
    let data = fields.data.decode()?;
    let last_tx = fields.last_tx.decode()?;
    let tags = tag_message(tags);

    let mut message = Vec::with_capacity(
        owner.len()
            + target.len()
            + data.len()
            + fields.quantity.as_str().len()
            + fields.reward.as_str().len()
            + last_tx.len()
            + tags.len(),
    );
    message.extend_from_slice(&owner);
    message.extend_from_slice(&target);
    message.extend_from_slice(&data);
    message.extend_from_slice(fields.quantity.as_str().as_bytes());
    message.extend_from_slice(fields.reward.as_str().as_bytes());
    message.extend_from_slice(&last_tx);
    message.extend_from_slice(&tags);
    Ok(message)
}
