//! Signed model manifests.
//!
//! A model directory may carry a `manifest.json` listing the SHA-256 of every
//! model file, and a `manifest.sig` holding an Ed25519 signature over the
//! exact manifest bytes. A file is trusted only if the signature verifies and
//! its hash matches the manifest entry for its file name.
//!
//! Manifests are produced by the `sign_model` binary.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const SIGNATURE_FILE: &str = "manifest.sig";
pub const MANIFEST_VERSION: u32 = 1;

/// Manifest contents as written by `sign_model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: u32,
    /// Unix timestamp (seconds) of signing
    pub created_at: i64,
    /// File name -> lowercase hex SHA-256
    pub files: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("No {MANIFEST_FILE}/{SIGNATURE_FILE} found in {0:?}")]
    Missing(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest: {0}")]
    Invalid(String),

    #[error("Invalid verifying key: {0}")]
    BadKey(String),

    #[error("Manifest signature does not verify")]
    BadSignature,

    #[error("Manifest does not list {0}")]
    Unlisted(String),

    #[error("File hash mismatch for {0}")]
    HashMismatch(String),
}

/// A manifest whose signature has been checked.
#[derive(Debug, Clone)]
pub struct VerifiedManifest {
    manifest: ModelManifest,
}

fn read(path: &Path) -> Result<Vec<u8>, ManifestError> {
    fs::read(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })
}

impl VerifiedManifest {
    /// Read and verify the manifest in `dir`.
    ///
    /// # Errors
    /// Returns `ManifestError` if either file is missing or unreadable, the
    /// signature does not verify, or the manifest is malformed.
    pub fn verify(dir: &Path, key: &VerifyingKey) -> Result<Self, ManifestError> {
        if !is_present(dir) {
            return Err(ManifestError::Missing(dir.to_path_buf()));
        }

        let sig_bytes = read(&dir.join(SIGNATURE_FILE))?;
        let sig_array: [u8; 64] = sig_bytes.as_slice().try_into().map_err(|_| {
            ManifestError::Invalid(format!(
                "signature must be 64 bytes, got {}",
                sig_bytes.len()
            ))
        })?;
        let signature = Signature::from_bytes(&sig_array);

        let manifest_bytes = read(&dir.join(MANIFEST_FILE))?;
        key.verify(&manifest_bytes, &signature)
            .map_err(|_| ManifestError::BadSignature)?;

        let manifest: ModelManifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| ManifestError::Invalid(e.to_string()))?;
        if manifest.version != MANIFEST_VERSION {
            return Err(ManifestError::Invalid(format!(
                "unsupported manifest version {}",
                manifest.version
            )));
        }
        if manifest.files.is_empty() {
            return Err(ManifestError::Invalid("manifest lists no files".into()));
        }

        tracing::info!(
            "Verified model manifest in {:?} ({} files)",
            dir,
            manifest.files.len()
        );
        Ok(Self { manifest })
    }

    /// Check that `bytes` are the signed contents of `file_name`.
    ///
    /// # Errors
    /// Returns `Unlisted` if the manifest has no entry for the file, or
    /// `HashMismatch` if the contents differ.
    pub fn check_file(&self, file_name: &str, bytes: &[u8]) -> Result<(), ManifestError> {
        let expected = self
            .manifest
            .files
            .get(file_name)
            .ok_or_else(|| ManifestError::Unlisted(file_name.to_string()))?;
        if !constant_time_eq_str(&sha256_hex(bytes), expected) {
            return Err(ManifestError::HashMismatch(file_name.to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn manifest(&self) -> &ModelManifest {
        &self.manifest
    }
}

/// Whether `dir` contains both manifest files.
#[must_use]
pub fn is_present(dir: &Path) -> bool {
    dir.join(MANIFEST_FILE).exists() && dir.join(SIGNATURE_FILE).exists()
}

/// Parse a base64-encoded 32-byte Ed25519 verifying key.
///
/// # Errors
/// Returns `ManifestError::BadKey` if decoding fails.
pub fn verifying_key_from_b64(b64: &str) -> Result<VerifyingKey, ManifestError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| ManifestError::BadKey(format!("invalid base64: {e}")))?;
    let array: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ManifestError::BadKey(format!("expected 32 bytes, got {}", bytes.len())))?;
    VerifyingKey::from_bytes(&array).map_err(|e| ManifestError::BadKey(e.to_string()))
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

// Constant-time compare for hex digests.
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
