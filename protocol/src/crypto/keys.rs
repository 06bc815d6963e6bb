//! # Key Material
//!
//! RSA key handling for wallet identities: import from JWK, address
//! derivation, and the RSA-PSS signature scheme the network verifies.
//!
//! ## The signature scheme
//!
//! - RSASSA-PSS (RFC 8017 §8.1).
//! - SHA-256 as the message digest.
//! - MGF1 with SHA-256.
//! - **Salt length 0.**
//!
//! A zero-length salt is unusual for PSS, but it makes signing
//! deterministic: the same key and message always give byte-identical
//! signatures. Transaction ids are `SHA-256(signature)`, so a random salt
//! would give every re-signing a different id. The salt length is passed
//! explicitly on every call; never fall back to a library default, which is
//! a digest-length random salt and yields signatures the network rejects.
//!
//! ## Security considerations
//!
//! - A `KeyMaterial` built from public parameters only can verify but never
//!   sign.
//! - Verification uses the public half exclusively.
//! - Key bytes are never logged, and `Debug` only prints the address.

use std::fmt;

use rand::rngs::OsRng;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::address::Address;
use super::jwk::Jwk;
use crate::codec::{decode_b64url, encode_b64url, B64Url, DecodeError};
use crate::config::{DEFAULT_PUBLIC_EXPONENT, PSS_SALT_LENGTH};

/// Errors that can occur during key operations.
///
/// These stay vague about key contents; only sizes and member names are
/// reported.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Signing was attempted with a public-only key.
    #[error("cannot sign: key has no private exponent")]
    MissingPrivateKey,

    /// The signature does not have the modulus byte length.
    #[error("malformed signature: expected {expected} bytes, got {got}")]
    MalformedSignature { expected: usize, got: usize },

    /// A private JWK without its prime factors.
    #[error("private key is missing its prime factors (p, q)")]
    MissingPrimes,

    /// Only 65537 is accepted; owners are always verified with it.
    #[error("unsupported public exponent {0}: expected 65537")]
    UnsupportedExponent(String),

    #[error("unsupported key type {0:?}: expected \"RSA\"")]
    UnsupportedKeyType(String),

    #[error("invalid JWK: {0}")]
    InvalidJwk(String),

    /// The RSA parameters were rejected (bad exponent, inconsistent primes...).
    #[error("invalid RSA key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("key member is not valid base64url: {0}")]
    Decode(#[from] DecodeError),
}

/// The PSS parameters used for every signature: SHA-256 digest, SHA-256
/// MGF1, zero-length salt.
fn pss() -> Pss {
    Pss::new_with_salt::<Sha256>(PSS_SALT_LENGTH)
}

/// An RSA identity: public modulus and exponent, plus an optional private
/// half.
///
/// Immutable after construction. It is `Send + Sync`, so one instance can
/// serve concurrent signing calls for different transactions.
///
/// # Examples
///
/// ```no_run
/// use weave_protocol::crypto::KeyMaterial;
///
/// let json = std::fs::read_to_string("wallet.json").unwrap();
/// let key = KeyMaterial::from_jwk_json(&json).unwrap();
/// let sig = key.sign(b"store this forever").unwrap();
/// assert!(key.verify(b"store this forever", &sig).unwrap());
/// ```
pub struct KeyMaterial {
    /// Raw big-endian modulus exactly as imported. This is the `owner` of
    /// every transaction the key signs.
    modulus: Vec<u8>,
    public: RsaPublicKey,
    private: Option<RsaPrivateKey>,
}

impl KeyMaterial {
    /// Import a key from a parsed JWK.
    ///
    /// `e` defaults to 65537 when absent and must be 65537 when present. If
    /// `d` is present, `p` and `q`
    /// must be too; CRT values are recomputed from them.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, KeyError> {
        if let Some(kty) = jwk.kty.as_deref() {
            if kty != "RSA" {
                return Err(KeyError::UnsupportedKeyType(kty.to_string()));
            }
        }

        let modulus = decode_b64url(&jwk.n)?;
        if modulus.iter().all(|b| *b == 0) {
            return Err(KeyError::InvalidKey("empty modulus".into()));
        }
        let n = BigUint::from_bytes_be(&modulus);
        let e = match jwk.e.as_deref() {
            Some(e) => BigUint::from_bytes_be(&decode_b64url(e)?),
            None => BigUint::from(DEFAULT_PUBLIC_EXPONENT),
        };
        if e != BigUint::from(DEFAULT_PUBLIC_EXPONENT) {
            return Err(KeyError::UnsupportedExponent(e.to_string()));
        }

        let public =
            RsaPublicKey::new(n.clone(), e.clone()).map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        let private = match jwk.d.as_deref() {
            None => None,
            Some(d) => {
                let (p, q) = match (jwk.p.as_deref(), jwk.q.as_deref()) {
                    (Some(p), Some(q)) => (p, q),
                    _ => return Err(KeyError::MissingPrimes),
                };
                let d = BigUint::from_bytes_be(&decode_b64url(d)?);
                let primes = vec![
                    BigUint::from_bytes_be(&decode_b64url(p)?),
                    BigUint::from_bytes_be(&decode_b64url(q)?),
                ];
                let key = RsaPrivateKey::from_components(n, e, d, primes)
                    .map_err(|e| KeyError::InvalidKey(e.to_string()))?;
                key.validate()
                    .map_err(|e| KeyError::InvalidKey(e.to_string()))?;
                Some(key)
            }
        };

        Ok(Self {
            modulus,
            public,
            private,
        })
    }

    /// Import a key from JWK JSON text (the wallet file format).
    pub fn from_jwk_json(json: &str) -> Result<Self, KeyError> {
        Self::from_jwk(&Jwk::from_json(json)?)
    }

    /// Build a verify-only key from a raw modulus and the network exponent.
    ///
    /// This is how a transaction's `owner` field becomes a verifier.
    pub fn from_public_modulus(modulus: &[u8]) -> Result<Self, KeyError> {
        Self::from_jwk(&Jwk {
            n: encode_b64url(modulus),
            ..Jwk::default()
        })
    }

    /// Generate a fresh key pair from the OS RNG.
    ///
    /// Slow for realistic sizes (seconds for 4096 bits in debug builds).
    pub fn generate(bits: usize) -> Result<Self, KeyError> {
        let private =
            RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| KeyError::InvalidKey(e.to_string()))?;
        let public = private.to_public_key();
        Ok(Self {
            modulus: public.n().to_bytes_be(),
            public,
            private: Some(private),
        })
    }

    /// Export as a JWK. Private members are included only when present.
    pub fn to_jwk(&self) -> Jwk {
        let b64 = |v: &BigUint| encode_b64url(&v.to_bytes_be());
        let mut jwk = Jwk {
            kty: Some("RSA".to_string()),
            n: encode_b64url(&self.modulus),
            e: Some(b64(self.public.e())),
            ..Jwk::default()
        };
        if let Some(private) = &self.private {
            jwk.d = Some(b64(private.d()));
            if let [p, q, ..] = private.primes() {
                jwk.p = Some(b64(p));
                jwk.q = Some(b64(q));
            }
            jwk.dp = private.dp().map(b64);
            jwk.dq = private.dq().map(b64);
            jwk.qi = private
                .qinv()
                .map(|qinv| encode_b64url(&qinv.to_bytes_be().1));
        }
        jwk
    }

    /// A verify-only copy of this key.
    pub fn public_only(&self) -> Self {
        Self {
            modulus: self.modulus.clone(),
            public: self.public.clone(),
            private: None,
        }
    }

    /// Raw big-endian modulus bytes.
    pub fn modulus(&self) -> &[u8] {
        &self.modulus
    }

    /// Modulus as a base64url `owner` field.
    pub fn owner(&self) -> B64Url {
        B64Url::from_bytes(&self.modulus)
    }

    pub fn public_exponent(&self) -> Vec<u8> {
        self.public.e().to_bytes_be()
    }

    pub fn modulus_bits(&self) -> usize {
        self.public.n().bits()
    }

    /// Signature length in bytes (the modulus byte length).
    pub fn signature_len(&self) -> usize {
        self.public.size()
    }

    pub fn has_private(&self) -> bool {
        self.private.is_some()
    }

    /// The wallet address: `SHA-256(modulus)`.
    pub fn address(&self) -> Address {
        Address::derive(&self.modulus)
    }

    /// Sign a message with RSA-PSS (SHA-256, MGF1-SHA-256, salt length 0).
    ///
    /// Deterministic: identical inputs give identical signatures. The RNG
    /// only feeds RSA blinding, which does not change the output.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        let private = self.private.as_ref().ok_or(KeyError::MissingPrivateKey)?;
        let digest = Sha256::digest(message);
        private
            .sign_with_rng(&mut OsRng, pss(), &digest)
            .map_err(|e| KeyError::Signing(e.to_string()))
    }

    /// Verify an RSA-PSS signature with the public half.
    ///
    /// `Ok(false)` for a well-formed signature that doesn't match; `Err`
    /// only when the signature length isn't the modulus length.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, KeyError> {
        let expected = self.signature_len();
        if signature.len() != expected {
            return Err(KeyError::MalformedSignature {
                expected,
                got: signature.len(),
            });
        }
        let digest = Sha256::digest(message);
        Ok(self.public.verify(pss(), &digest, signature).is_ok())
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KeyMaterial(address={}, bits={}, private={})",
            self.address(),
            self.modulus_bits(),
            self.has_private()
        )
    }
}

impl PartialEq for KeyMaterial {
    /// Keys are equal when their public halves are.
    fn eq(&self, other: &Self) -> bool {
        self.modulus == other.modulus && self.public.e() == other.public.e()
    }
}

impl Eq for KeyMaterial {}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET_A: &str = include_str!("../../tests/fixtures/wallet_a.json");
    const WALLET_B: &str = include_str!("../../tests/fixtures/wallet_b.json");
    const WALLET_A_ADDRESS: &str = "vWnMPEn4szgTaKW1Z-WtuF8GXJTAjJUdaz0vxkekJSU";

    fn wallet_a() -> KeyMaterial {
        KeyMaterial::from_jwk_json(WALLET_A).unwrap()
    }

    #[test]
    fn imports_fixture_wallet() {
        let key = wallet_a();
        assert!(key.has_private());
        assert_eq!(key.modulus_bits(), 2048);
        assert_eq!(key.signature_len(), 256);
        assert_eq!(key.public_exponent(), vec![0x01, 0x00, 0x01]);
        assert_eq!(key.address().to_string(), WALLET_A_ADDRESS);
    }

    #[test]
    fn keypair_sign_verify_roundtrip() {
        let key = wallet_a();
        let msg = b"store this forever";
        let sig = key.sign(msg).unwrap();
        assert_eq!(sig.len(), 256);
        assert!(key.verify(msg, &sig).unwrap());
    }

    #[test]
    fn test_deterministic_signatures() {
        let key = wallet_a();
        let sig1 = key.sign(b"determinism").unwrap();
        let sig2 = key.sign(b"determinism").unwrap();
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn wrong_message_fails_verification() {
        let key = wallet_a();
        let sig = key.sign(b"correct message").unwrap();
        assert!(!key.verify(b"wrong message", &sig).unwrap());
    }

    #[test]
    fn wrong_key_fails_verification() {
        let a = wallet_a();
        let b = KeyMaterial::from_jwk_json(WALLET_B).unwrap();
        let sig = a.sign(b"message").unwrap();
        assert!(!b.verify(b"message", &sig).unwrap());
    }

    #[test]
    fn malformed_signature_length_is_an_error() {
        let key = wallet_a();
        match key.verify(b"message", &[0u8; 255]) {
            Err(KeyError::MalformedSignature {
                expected: 256,
                got: 255,
            }) => {}
            other => panic!("expected MalformedSignature, got {:?}", other),
        }
    }

    #[test]
    fn garbage_of_the_right_length_is_just_false() {
        let key = wallet_a();
        assert!(!key.verify(b"message", &[0x11u8; 256]).unwrap());
    }

    #[test]
    fn public_only_key_verifies_but_cannot_sign() {
        let key = wallet_a();
        let sig = key.sign(b"message").unwrap();

        let public = KeyMaterial::from_public_modulus(key.modulus()).unwrap();
        assert!(!public.has_private());
        assert_eq!(public, key);
        assert!(public.verify(b"message", &sig).unwrap());
        assert!(matches!(
            public.sign(b"message"),
            Err(KeyError::MissingPrivateKey)
        ));
        assert!(matches!(
            key.public_only().sign(b"message"),
            Err(KeyError::MissingPrivateKey)
        ));
    }

    #[test]
    fn private_jwk_without_primes_is_rejected() {
        let mut jwk = Jwk::from_json(WALLET_A).unwrap();
        jwk.q = None;
        assert!(matches!(
            KeyMaterial::from_jwk(&jwk),
            Err(KeyError::MissingPrimes)
        ));
    }

    #[test]
    fn non_rsa_key_type_is_rejected() {
        let mut jwk = Jwk::from_json(WALLET_A).unwrap();
        jwk.kty = Some("EC".into());
        assert!(matches!(
            KeyMaterial::from_jwk(&jwk),
            Err(KeyError::UnsupportedKeyType(_))
        ));
    }

    #[test]
    fn other_public_exponents_are_rejected() {
        let b64 = |v: &BigUint| encode_b64url(&v.to_bytes_be());
        let small = RsaPrivateKey::new_with_exp(&mut OsRng, 1024, &BigUint::from(3u64)).unwrap();
        let jwk = Jwk {
            kty: Some("RSA".into()),
            n: b64(small.n()),
            e: Some(b64(small.e())),
            d: Some(b64(small.d())),
            p: Some(b64(&small.primes()[0])),
            q: Some(b64(&small.primes()[1])),
            ..Jwk::default()
        };
        match KeyMaterial::from_jwk(&jwk) {
            Err(KeyError::UnsupportedExponent(e)) => assert_eq!(e, "3"),
            other => panic!("expected UnsupportedExponent, got {:?}", other),
        }
        assert!(matches!(
            KeyMaterial::from_jwk(&jwk.public_part()),
            Err(KeyError::UnsupportedExponent(_))
        ));

        let mut fixture = Jwk::from_json(WALLET_A).unwrap();
        fixture.e = Some("Aw".into());
        assert!(matches!(
            KeyMaterial::from_jwk(&fixture),
            Err(KeyError::UnsupportedExponent(_))
        ));
    }

    #[test]
    fn bad_base64_member_is_a_decode_error() {
        let mut jwk = Jwk::from_json(WALLET_A).unwrap();
        jwk.n = "not+base64url".into();
        assert!(matches!(KeyMaterial::from_jwk(&jwk), Err(KeyError::Decode(_))));
    }

    #[test]
    fn mismatched_primes_are_rejected() {
        let mut jwk = Jwk::from_json(WALLET_A).unwrap();
        let other = Jwk::from_json(WALLET_B).unwrap();
        jwk.p = other.p;
        assert!(matches!(
            KeyMaterial::from_jwk(&jwk),
            Err(KeyError::InvalidKey(_))
        ));
    }

    #[test]
    fn jwk_export_roundtrip() {
        let key = wallet_a();
        let restored = KeyMaterial::from_jwk(&key.to_jwk()).unwrap();
        assert_eq!(restored.address(), key.address());
        assert_eq!(
            restored.sign(b"roundtrip").unwrap(),
            key.sign(b"roundtrip").unwrap()
        );

        let public = key.public_only().to_jwk();
        assert!(!public.is_private());
    }

    #[test]
    fn generated_keys_work() {
        let key = KeyMaterial::generate(1024).unwrap();
        assert_eq!(key.modulus_bits(), 1024);
        let sig = key.sign(b"fresh").unwrap();
        assert!(key.verify(b"fresh", &sig).unwrap());
        assert_ne!(key.address(), wallet_a().address());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let key = wallet_a();
        let debug = format!("{:?}", key);
        assert_eq!(
            debug,
            format!("KeyMaterial(address={}, bits=2048, private=true)", WALLET_A_ADDRESS)
        );
    }

    #[test]
    fn test_empty_message_signing() {
        let key = wallet_a();
        let sig = key.sign(b"").unwrap();
        assert!(key.verify(b"", &sig).unwrap());
    }
}
