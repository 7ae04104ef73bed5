//! Error types for the credential crypto engine
use thiserror::Error;

/// Errors that can occur during credential cryptography.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The OS entropy source could not produce random bytes.
    ///
    /// Fatal in practice; retrying is not expected to help.
    #[error("Entropy source unavailable: {reason}")]
    EntropyUnavailable { reason: String },

    /// KDF parameters are outside the range the algorithm accepts.
    #[error("Invalid KDF parameters: {reason}")]
    InvalidParams { reason: String },

    /// Key derivation failed for an otherwise valid configuration.
    #[error("Key derivation failed: {reason}")]
    DerivationFailed { reason: String },
}

impl CryptoError {
    /// Check if this error indicates entropy exhaustion.
    pub fn is_entropy_error(&self) -> bool {
        matches!(self, CryptoError::EntropyUnavailable { .. })
    }

    /// Check if this error indicates a bad parameter snapshot.
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, CryptoError::InvalidParams { .. })
    }
}

impl From<CryptoError> for crate::Error {
    fn from(err: CryptoError) -> Self {
        crate::Error::Crypto(err)
    }
}
