//! # Base64url Codec
//!
//! Every binary field of a transaction crosses the wire as base64url text:
//! the standard base64 alphabet with `+` replaced by `-`, `/` replaced by
//! `_`, and all `=` padding stripped. The decoder restores exactly the
//! padding the encoder removed before handing the text to a strict base64
//! decoder.
//!
//! The signed message is built from the *decoded* bytes, never from this
//! text, so a bug here silently signs the wrong thing. Keep it boring.

use std::fmt;

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while decoding base64url text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A character outside `[A-Za-z0-9_-]` was found.
    #[error("invalid base64url character {ch:?} at index {index}")]
    InvalidCharacter { ch: char, index: usize },

    /// `4k + 1` characters can never come out of the encoder.
    #[error("invalid base64url length: {0}")]
    InvalidLength(usize),

    /// The text used only valid characters but is not canonical base64
    /// (e.g. non-zero trailing bits).
    #[error("malformed base64url: {0}")]
    Malformed(String),
}

/// Encode raw bytes as unpadded base64url. Total over all inputs.
pub fn encode_b64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url text back to raw bytes.
///
/// The input is re-padded with `=` to a multiple of four characters and
/// then decoded with the padded url-safe engine.
pub fn decode_b64url(text: &str) -> Result<Vec<u8>, DecodeError> {
    if let Some((index, ch)) = text
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(DecodeError::InvalidCharacter { ch, index });
    }

    let padding = match text.len() % 4 {
        0 => 0,
        2 => 2,
        3 => 1,
        _ => return Err(DecodeError::InvalidLength(text.len())),
    };

    let mut padded = String::with_capacity(text.len() + padding);
    padded.push_str(text);
    padded.extend(std::iter::repeat('=').take(padding));

    URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|e| DecodeError::Malformed(e.to_string()))
}

// ---------------------------------------------------------------------------
// B64Url
// ---------------------------------------------------------------------------

/// Base64url text exactly as it appears on the wire.
///
/// Deserializing does not validate the text; decoding happens where the
/// bytes are needed (canonicalization, verification), and that is where a
/// malformed field surfaces as a [`DecodeError`]. Use [`B64Url::parse`] to
/// validate eagerly.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct B64Url(String);

impl B64Url {
    /// The empty field. Decodes to zero bytes.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Encode raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(encode_b64url(bytes))
    }

    /// Validate and wrap existing base64url text.
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        decode_b64url(text)?;
        Ok(Self(text.to_string()))
    }

    /// Decode to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, DecodeError> {
        decode_b64url(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for B64Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for B64Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Owners and payloads can be kilobytes long; keep debug output readable.
        if self.0.len() > 24 {
            let head: String = self.0.chars().take(16).collect();
            write!(f, "B64Url({}..{} chars)", head, self.0.len())
        } else {
            write!(f, "B64Url({})", self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// serde helper
// ---------------------------------------------------------------------------

/// `#[serde(with = "crate::codec::serde_b64url")]` for raw byte fields that
/// travel as base64url strings.
pub mod serde_b64url {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_b64url(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode_b64url(&text).map_err(serde::de::Error::custom)
    }
}
