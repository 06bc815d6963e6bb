//! Core value types for transactions.
//!
//! Amounts stay decimal text end to end: the canonical message contains the
//! literal digits, and total supply in winston does not fit in a `u64`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::serde_b64url;

// ---------------------------------------------------------------------------
// Winston
// ---------------------------------------------------------------------------

/// Why a string was rejected as an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount {0:?} is not a base-10 integer")]
    NotDecimal(String),
}

/// An amount in winston (the ledger's smallest unit), kept as decimal text.
///
/// Valid iff non-empty and made only of ASCII digits. No sign, no
/// separators, no exponent. The text is never normalized: `"007"` stays
/// `"007"`, because those are the bytes that get signed.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Winston(String);

impl Winston {
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    /// Validate decimal text.
    pub fn new(text: impl Into<String>) -> Result<Self, AmountError> {
        let text = text.into();
        if text.is_empty() {
            return Err(AmountError::Empty);
        }
        if !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::NotDecimal(text));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, if it fits.
    pub fn to_u128(&self) -> Option<u128> {
        self.0.parse().ok()
    }

    pub fn is_zero(&self) -> bool {
        self.0.bytes().all(|b| b == b'0')
    }
}

impl Default for Winston {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<u64> for Winston {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<u128> for Winston {
    fn from(value: u128) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<String> for Winston {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Winston> for String {
    fn from(value: Winston) -> Self {
        value.0
    }
}

impl FromStr for Winston {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Winston {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Winston {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Winston({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// A `(name, value)` pair attached to a transaction.
///
/// Both halves are opaque bytes. On the wire each is base64url-encoded
/// exactly once. Tag order is part of the signed message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    #[serde(with = "serde_b64url")]
    pub name: Vec<u8>,
    #[serde(with = "serde_b64url")]
    pub value: Vec<u8>,
}

impl Tag {
    /// ```
    /// use weave_protocol::transaction::Tag;
    ///
    /// let tag = Tag::new("Content-Type", "text/plain");
    /// assert_eq!(tag.name, b"Content-Type");
    /// ```
    pub fn new(name: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Self {
        Self {
            name: name.as_ref().to_vec(),
            value: value.as_ref().to_vec(),
        }
    }

    /// Name as UTF-8, if it is.
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.name).ok()
    }

    /// Value as UTF-8, if it is.
    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }
}

// ---------------------------------------------------------------------------
// TransactionStatus
// ---------------------------------------------------------------------------

/// Where a submitted transaction stands, as reported by a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Accepted into the mempool, not yet mined.
    Pending,
    /// Mined into a block.
    Confirmed {
        block_indep_hash: String,
        block_height: u64,
        number_of_confirmations: u64,
    },
}

impl TransactionStatus {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winston_accepts_decimal_text() {
        assert_eq!(Winston::new("0").unwrap().as_str(), "0");
        assert_eq!(Winston::new("1000").unwrap().to_u128(), Some(1000));
        // Above u64::MAX is still a valid amount.
        let big = Winston::new("66000000000000000000000").unwrap();
        assert_eq!(big.to_u128(), Some(66_000_000_000_000_000_000_000));
    }

    #[test]
    fn winston_rejects_non_decimal() {
        assert_eq!(Winston::new(""), Err(AmountError::Empty));
        for bad in ["-1", "1.5", "1e3", " 1", "0x10", "١٢"] {
            assert!(
                matches!(Winston::new(bad), Err(AmountError::NotDecimal(_))),
                "{bad:?} must be rejected"
            );
        }
    }

    #[test]
    fn winston_keeps_literal_text() {
        let w = Winston::new("007").unwrap();
        assert_eq!(w.to_string(), "007");
        assert!(!w.is_zero());
        assert!(Winston::new("000").unwrap().is_zero());
        assert_eq!(Winston::from(42u64).as_str(), "42");
    }

    #[test]
    fn winston_serde_validates() {
        let w: Winston = serde_json::from_str("\"1000\"").unwrap();
        assert_eq!(w.as_str(), "1000");
        assert_eq!(serde_json::to_string(&w).unwrap(), "\"1000\"");
        assert!(serde_json::from_str::<Winston>("\"ten\"").is_err());
        assert!(serde_json::from_str::<Winston>("1000").is_err());
    }

    #[test]
    fn tag_wire_shape_is_single_encoded() {
        let tag = Tag::new("Content-Type", "text/plain");
        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["name"], "Q29udGVudC1UeXBl");
        assert_eq!(json["value"], "dGV4dC9wbGFpbg");

        let back: Tag = serde_json::from_value(json).unwrap();
        assert_eq!(back, tag);
        assert_eq!(back.name_str(), Some("Content-Type"));
    }

    #[test]
    fn tag_rejects_bad_base64url() {
        let json = r#"{"name":"a+b","value":""}"#;
        assert!(serde_json::from_str::<Tag>(json).is_err());
    }

    #[test]
    fn status_serde_shape() {
        let confirmed = TransactionStatus::Confirmed {
            block_indep_hash: "abc".into(),
            block_height: 190_582,
            number_of_confirmations: 8,
        };
        let json = serde_json::to_value(&confirmed).unwrap();
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["block_height"], 190_582);
        assert!(confirmed.is_confirmed());

        let pending = serde_json::to_value(&TransactionStatus::Pending).unwrap();
        assert_eq!(pending["status"], "pending");
    }
}
