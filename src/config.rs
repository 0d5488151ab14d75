//! Credential loading
//!
//! The only required configuration is `config.json` next to the executable:
//!
//! ```json
//! { "GOOGLE_API_KEY": "..." }
//! ```
//!
//! Anything else in the file is ignored. Runtime knobs (models, port, timeout)
//! come from the command line instead, see `main.rs`.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const API_KEY_FIELD: &str = "GOOGLE_API_KEY";

/// The API credential. Loaded once, never mutated, never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(rename = "GOOGLE_API_KEY")]
    google_api_key: Option<String>,
}

/// Default location: `config.json` in the directory holding the executable.
pub fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

/// Read and validate the credential file
pub fn load_credential(path: &Path) -> Result<ApiKey, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_credential(&raw, path)
}

/// Extract the credential from the file contents. `path` is only used for diagnostics.
pub fn parse_credential(raw: &str, path: &Path) -> Result<ApiKey, ConfigError> {
    let file: ConfigFile = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let key = file.google_api_key.ok_or_else(|| ConfigError::MissingField {
        path: path.to_path_buf(),
        field: API_KEY_FIELD,
    })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::EmptyField {
            path: path.to_path_buf(),
            field: API_KEY_FIELD,
        });
    }

    Ok(ApiKey::new(key))
}
