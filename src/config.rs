//! Environment-driven runtime configuration.

use std::fs;
use std::path::{Path, PathBuf};

use crate::adapters::model::manifest::{self, ManifestError};
use crate::application::{LoadError, ModelTrust};

pub const MODEL_PATH_ENV: &str = "PROGNOS_MODEL_PATH";
pub const ALLOW_UNSIGNED_MODELS_ENV: &str = "PROGNOS_ALLOW_UNSIGNED_MODELS";
pub const PUBKEY_FILE_ENV: &str = "PROGNOS_MODEL_SIGNING_PUBKEY_B64_FILE";
pub const LOG_MODE_ENV: &str = "PROGNOS_LOG_MODE";
pub const LOG_FILE_ENV: &str = "PROGNOS_LOG_FILE";

const DOCKER_SECRET_PUBKEY: &str = "/run/secrets/prognos_model_signing_pubkey_b64";
const DEFAULT_MODEL_PATH: &str = "models";
const DEFAULT_LOG_FILE: &str = "prognos.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is an interactive terminal, stdout otherwise.
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Whether to log to a file. Logging to the terminal would corrupt the TUI.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model_dir: PathBuf,
    pub allow_unsigned: bool,
    pub pubkey_file: Option<PathBuf>,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_PATH),
            allow_unsigned: false,
            pubkey_file: None,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            model_dir: non_empty(MODEL_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            allow_unsigned: non_empty(ALLOW_UNSIGNED_MODELS_ENV)
                .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1")),
            pubkey_file: non_empty(PUBKEY_FILE_ENV).map(|v| PathBuf::from(v.trim())),
            log_mode: non_empty(LOG_MODE_ENV)
                .map(|v| LogMode::parse(&v))
                .unwrap_or(defaults.log_mode),
            log_file: non_empty(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
        }
    }

    /// Decide how model files are authenticated.
    ///
    /// A configured verifying key (env file, then Docker secret) is always
    /// used when the model directory carries a manifest. Without a key, or
    /// without a manifest, loading proceeds only if unsigned models are
    /// allowed.
    ///
    /// # Errors
    /// Returns `LoadError` if the key file cannot be read or decoded, or if
    /// no key is available and unsigned models are not allowed.
    pub fn model_trust(&self) -> Result<ModelTrust, LoadError> {
        let key_file = self
            .pubkey_file
            .clone()
            .or_else(|| Some(PathBuf::from(DOCKER_SECRET_PUBKEY)).filter(|p| p.exists()));

        match key_file {
            Some(_) if self.allow_unsigned && !manifest::is_present(&self.model_dir) => {
                Ok(ModelTrust::AllowUnsigned)
            }
            Some(path) => Ok(ModelTrust::RequireSignature(read_verifying_key(&path)?)),
            None if self.allow_unsigned => Ok(ModelTrust::AllowUnsigned),
            None => Err(LoadError::NoVerifyingKey {
                key_env: PUBKEY_FILE_ENV,
                unsigned_env: ALLOW_UNSIGNED_MODELS_ENV,
            }),
        }
    }
}

fn read_verifying_key(path: &Path) -> Result<ed25519_dalek::VerifyingKey, ManifestError> {
    let b64 = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    manifest::verifying_key_from_b64(&b64)
}
