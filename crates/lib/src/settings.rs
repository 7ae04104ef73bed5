//! Service settings for the user system
//!
//! Settings bundle the defaults applied at registration (quota, salt and
//! API key lengths), the administrator list, and the current KDF parameter
//! snapshot. A copy of the snapshot is stored on every record at
//! registration, so editing these settings only affects users registered
//! afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, crypto::KdfConfig};

/// Default storage quota for newly registered users (bytes).
pub const DEFAULT_QUOTA_BYTES: u64 = 1024 * 1024 * 1024;

/// Default API key length (characters). Keys shorter than this do not
/// carry enough entropy for stateless authentication.
pub const DEFAULT_API_KEY_LENGTH: usize = 40;

fn default_quota() -> u64 {
    DEFAULT_QUOTA_BYTES
}

fn default_api_key_length() -> usize {
    DEFAULT_API_KEY_LENGTH
}

fn default_salt_length() -> usize {
    crate::crypto::SALT_LENGTH
}

/// Service-wide settings for the user subsystem.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// Storage quota assigned at registration, in bytes
    #[serde(default = "default_quota")]
    pub default_quota: u64,

    /// Length of generated API keys, in characters
    #[serde(default = "default_api_key_length")]
    pub api_key_length: usize,

    /// Length of generated password salts, in bytes
    #[serde(default = "default_salt_length")]
    pub salt_length: usize,

    /// Usernames with administrative access
    #[serde(default)]
    pub admin_users: Vec<String>,

    /// KDF parameters applied to newly set passwords
    #[serde(default)]
    pub kdf: KdfConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_quota: default_quota(),
            api_key_length: default_api_key_length(),
            salt_length: default_salt_length(),
            admin_users: Vec::new(),
            kdf: KdfConfig::default(),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file.
    ///
    /// If the file does not exist, the defaults are returned.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Saves settings to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(std::fs::write(path, json)?)
    }
}
