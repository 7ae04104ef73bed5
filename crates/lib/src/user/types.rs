//! Core data types for the user system

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::KdfConfig;

/// A registered identity.
///
/// Records are stored keyed by `identifier` with unique secondary indexes
/// on `username` and `api_key`. The plaintext password is never part of
/// this record; only the derived verification key is kept.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisteredUser {
    /// Primary key (UUIDv4), immutable once assigned
    pub identifier: String,

    /// Unique username (login identifier, case-sensitive)
    pub username: String,

    /// Stateless authentication token, at least 40 alphanumeric characters
    pub api_key: String,

    /// Per-user random salt mixed into password hashing, never reused
    #[serde(with = "serde_bytes")]
    pub password_salt: Vec<u8>,

    /// Hash parameters in force when the password was set
    pub password_kdf: KdfConfig,

    /// Derived password verification key
    #[serde(with = "serde_bytes")]
    pub password_key: Vec<u8>,

    /// Administrative flag; disabled users must be rejected at
    /// authentication by the caller regardless of credential validity
    pub enabled: bool,

    /// Storage quota in bytes, admin-mutable
    pub quota: u64,

    /// Account creation timestamp (Unix timestamp)
    pub created_at: i64,
}

/// A registration request, carrying the only plaintext password this
/// system ever holds.
///
/// Not serializable, redacted in `Debug` output, and the password buffer
/// is zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RegistrationRequest {
    /// Requested username
    #[zeroize(skip)]
    pub username: String,

    /// Plaintext password (transient)
    pub password: String,
}

impl RegistrationRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
