//! Credential cryptography for the user system
//!
//! Provides the primitives the user manager builds credentials from:
//! - Argon2id password key derivation with per-record parameter snapshots
//! - CSPRNG material for salts and API keys
//! - Constant-time comparison of derived keys

mod errors;

pub use errors::CryptoError;

use argon2::{Algorithm, Argon2, Params, Version};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Password salt length (bytes)
pub const SALT_LENGTH: usize = 64;

/// Derived password verification key length (bytes)
pub const KEY_LENGTH: usize = 32;

/// Characters API key tokens are drawn from.
const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Largest byte value that maps uniformly onto [`TOKEN_CHARSET`].
/// 248 is the largest multiple of 62 that fits in a byte; values at or
/// above it are rejected to avoid modulo bias.
const TOKEN_REJECT_THRESHOLD: u8 = 248;

/// Supported password hashing algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KdfAlgorithm {
    Argon2id,
}

/// Snapshot of the password hashing parameters in force when a credential
/// was set.
///
/// A copy is stored on every user record so that raising the recommended
/// defaults never invalidates existing credentials; old records keep
/// verifying under the parameters they were hashed with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfConfig {
    /// Hash algorithm this snapshot applies to
    pub algorithm: KdfAlgorithm,

    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes over memory
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u32,

    /// Derived key length in bytes
    pub output_length: usize,
}

impl Default for KdfConfig {
    /// The currently recommended parameters (the `argon2` crate defaults).
    fn default() -> Self {
        Self {
            algorithm: KdfAlgorithm::Argon2id,
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
            output_length: KEY_LENGTH,
        }
    }
}

/// Fill a buffer with cryptographically secure random bytes.
///
/// # Arguments
/// * `len` - Number of bytes to generate
///
/// # Returns
/// `len` bytes from the OS entropy source, or
/// [`CryptoError::EntropyUnavailable`] if the source fails.
pub fn random_bytes(len: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::EntropyUnavailable {
            reason: e.to_string(),
        })?;
    Ok(bytes)
}

/// Generate a random alphanumeric token.
///
/// Used for API keys. Sampling is rejection-based so every charset
/// character is equally likely.
///
/// # Arguments
/// * `len` - Token length in characters
pub fn secure_token(len: usize) -> Result<String> {
    let mut token = String::with_capacity(len);
    while token.len() < len {
        for byte in random_bytes(len - token.len())? {
            if byte < TOKEN_REJECT_THRESHOLD {
                token.push(TOKEN_CHARSET[(byte % TOKEN_CHARSET.len() as u8) as usize] as char);
                if token.len() == len {
                    break;
                }
            }
        }
    }
    Ok(token)
}

/// Derive a password verification key using Argon2id.
///
/// Deterministic: identical `(password, salt, config)` inputs always
/// produce an identical key, with the output length fixed by `config`.
///
/// # Arguments
/// * `password` - The plaintext password
/// * `salt` - The per-user random salt
/// * `config` - The parameter snapshot to derive under
///
/// # Returns
/// A key of `config.output_length` bytes suitable only for verification,
/// never for decryption.
pub fn derive_key(
    password: impl AsRef<[u8]>,
    salt: impl AsRef<[u8]>,
    config: &KdfConfig,
) -> Result<Vec<u8>> {
    let params = Params::new(
        config.memory_kib,
        config.iterations,
        config.parallelism,
        Some(config.output_length),
    )
    .map_err(|e| CryptoError::InvalidParams {
        reason: e.to_string(),
    })?;

    let argon2 = match config.algorithm {
        KdfAlgorithm::Argon2id => Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
    };

    let mut key = vec![0u8; config.output_length];
    argon2
        .hash_password_into(password.as_ref(), salt.as_ref(), &mut key)
        .map_err(|e| CryptoError::DerivationFailed {
            reason: e.to_string(),
        })?;

    Ok(key)
}

/// Compare two byte sequences without leaking where they first differ.
///
/// Differences are accumulated across the full width of both inputs
/// rather than short-circuiting at the first mismatch. Lengths are not
/// secret; unequal lengths return false immediately.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
