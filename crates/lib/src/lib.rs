//!
//! Cormorant: credential and identity management for a file-upload service.
//! This library provides the core user subsystem that the HTTP and admin
//! surfaces of the service are built on.
//!
//! ## Core Concepts
//!
//! * **User Manager (`user::UserManager`)**: Orchestrates registration, credential verification, and administrative updates. The only entry point the service layers call.
//! * **User Store (`store::UserStore`)**: A pluggable keyed-record collection with unique secondary indexes and transactional commit. `store::InMemory` is the bundled implementation.
//! * **Credential Crypto (`crypto`)**: Argon2id password key derivation, CSPRNG material for salts and API keys, and constant-time comparison of derived keys.
//! * **Settings (`settings::Settings`)**: Service defaults (quota, token lengths, administrator list) and the current KDF parameter snapshot.
//!
//! Plaintext passwords exist only inside a [`user::RegistrationRequest`] or a
//! `check_password` call; they are never persisted or logged, and only the
//! derived verification key is stored.

pub mod crypto;
pub mod settings;
pub mod store;
pub mod user;

/// Re-export the main types for easier access.
pub use settings::Settings;
pub use store::{InMemory, UserStore};
pub use user::{RegisteredUser, RegistrationRequest, UserManager};

/// Result type used throughout the Cormorant library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Cormorant library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured cryptography errors from the crypto module
    #[error(transparent)]
    Crypto(crypto::CryptoError),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured user management errors from the user module
    #[error(transparent)]
    User(user::UserError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Crypto(_) => "crypto",
            Error::Store(_) => "store",
            Error::User(_) => "user",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_conflict(),
            Error::Store(store_err) => store_err.is_duplicate_key(),
            _ => false,
        }
    }

    /// Check if this error indicates the store could not complete a
    /// transaction. Callers may retry idempotent operations.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_unavailable(),
            _ => false,
        }
    }

    /// Check if this error indicates a data integrity issue.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_integrity_error(),
            _ => false,
        }
    }

    /// Check if this error is cryptography-related.
    pub fn is_crypto_error(&self) -> bool {
        matches!(self, Error::Crypto(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}
