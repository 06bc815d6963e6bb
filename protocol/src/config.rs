//! # Protocol Configuration & Constants
//!
//! Every magic number of the signing protocol lives here, next to the
//! gateway connection settings. The cryptographic parameters are
//! consensus-critical: the network's verifiers use exactly these values,
//! and a signature produced with anything else is simply rejected.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Digest used for the message, for MGF1, for addresses and for ids.
pub const SIGNATURE_HASH: &str = "SHA-256";

/// PSS salt length in bytes. Zero makes signing deterministic, and the
/// transaction id is derived from the signature, so this must stay zero.
/// Library defaults (salt = digest length) produce signatures the network
/// rejects.
pub const PSS_SALT_LENGTH: usize = 0;

/// The only public exponent the network accepts.
pub const DEFAULT_PUBLIC_EXPONENT: u64 = 65_537;

/// Modulus size for freshly generated wallets.
pub const DEFAULT_MODULUS_BITS: usize = 4096;

/// Address length in bytes (a SHA-256 digest).
pub const ADDRESS_LENGTH: usize = 32;

/// Transaction id length in bytes (a SHA-256 digest of the signature).
pub const ID_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Gateway Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_GATEWAY_PROTOCOL: Protocol = Protocol::Https;

pub const DEFAULT_GATEWAY_HOST: &str = "arweave.net";

pub const DEFAULT_GATEWAY_PORT: u16 = 443;

/// Connect and request timeout for gateway calls. There is no retry on
/// expiry; the error goes straight back to the caller.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// GatewayConfig
// ---------------------------------------------------------------------------

/// Errors raised while assembling a [`GatewayConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no protocol specified")]
    MissingProtocol,

    #[error("unsupported protocol {0:?}: expected \"http\" or \"https\"")]
    UnsupportedProtocol(String),

    #[error("no host specified")]
    MissingHost,

    #[error("no port specified")]
    MissingPort,
}

/// Transport scheme used to reach a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

impl FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => Err(ConfigError::MissingProtocol),
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(ConfigError::UnsupportedProtocol(other.to_string())),
        }
    }
}

/// Where and how to reach a gateway node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    HTTP_TIMEOUT
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

impl GatewayConfig {
    /// Build a config from loosely-typed parts (CLI flags, env vars).
    ///
    /// All three parts are mandatory; an empty host or a zero port is
    /// treated as missing.
    pub fn new(protocol: &str, host: &str, port: u16) -> Result<Self, ConfigError> {
        let protocol = protocol.parse()?;
        let host = host.trim();
        if host.is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if port == 0 {
            return Err(ConfigError::MissingPort);
        }
        Ok(Self {
            protocol,
            host: host.to_string(),
            port,
            timeout: HTTP_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{protocol}://{host}:{port}`, no trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    /// Absolute URL of an API path such as `tx/{id}/status`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            protocol: DEFAULT_GATEWAY_PROTOCOL,
            host: DEFAULT_GATEWAY_HOST.to_string(),
            port: DEFAULT_GATEWAY_PORT,
            timeout: HTTP_TIMEOUT,
        }
    }
}
