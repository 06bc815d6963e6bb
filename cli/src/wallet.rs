//! Wallet files: JWK JSON on disk.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use weave_protocol::crypto::KeyMaterial;

/// Load a signing key from a JWK file.
pub fn load_wallet(path: &Path) -> Result<KeyMaterial> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read wallet file {}", path.display()))?;
    let key = KeyMaterial::from_jwk_json(&json)
        .with_context(|| format!("invalid wallet file {}", path.display()))?;
    tracing::debug!(path = %path.display(), address = %key.address(), "wallet loaded");
    Ok(key)
}

/// The wallet path, or an error naming both ways to provide one.
pub fn require_wallet(path: Option<&Path>) -> Result<&Path> {
    match path {
        Some(path) => Ok(path),
        None => bail!("no wallet given: pass --wallet or set WEAVE_WALLET"),
    }
}

/// Write a key as a JWK file, owner-readable only on Unix.
pub fn save_wallet(path: &Path, key: &KeyMaterial, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let json = key.to_jwk().to_json_pretty()?;
    fs::write(path, json)
        .with_context(|| format!("failed to write wallet file {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions on {}", path.display()))?;
    }

    Ok(())
}
