//! JSON Web Key import/export shape for RSA wallets.
//!
//! Wallet files are plain RSA JWKs. Every numeric member is an unsigned
//! big-endian integer in base64url. Only `n` is required; a signing key
//! additionally needs `d`, `p` and `q`. Unknown members (`ext`, `alg`,
//! `key_ops`, ...) are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::keys::KeyError;

/// An RSA JSON Web Key.
///
/// Deliberately no derived `Debug`: a wallet JWK carries the private
/// exponent.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kty: Option<String>,
    pub n: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
}

impl Jwk {
    /// Parse a JWK from JSON text.
    pub fn from_json(json: &str) -> Result<Self, KeyError> {
        serde_json::from_str(json).map_err(|e| KeyError::InvalidJwk(e.to_string()))
    }

    /// Serialize to pretty JSON, the layout wallet files use.
    pub fn to_json_pretty(&self) -> Result<String, KeyError> {
        serde_json::to_string_pretty(self).map_err(|e| KeyError::InvalidJwk(e.to_string()))
    }

    /// `true` when the key carries a private exponent.
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// Strip every private member.
    pub fn public_part(&self) -> Self {
        Self {
            kty: self.kty.clone(),
            n: self.n.clone(),
            e: self.e.clone(),
            ..Self::default()
        }
    }
}

impl fmt::Debug for Jwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.n.chars().take(12).collect();
        write!(
            f,
            "Jwk(kty={:?}, n={}.., private={})",
            self.kty.as_deref().unwrap_or("RSA"),
            head,
            self.is_private()
        )
    }
}
