//! User manager service
//!
//! Provides access to common operations with users, and abstracts the
//! record store behind the [`UserStore`] seam.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroize;

use super::{RegisteredUser, RegistrationRequest, errors::UserError};
use crate::{
    Error, Result, Settings, crypto,
    store::{INDEX_USERNAME, StoreError, UserStore},
};

/// Orchestrates registration, lookup, credential verification, and
/// administrative updates over an injected [`UserStore`].
///
/// Operations are synchronous and independent; callers dispatch them from
/// their own worker threads. The manager holds no long-lived record
/// references and re-acquires the record it needs on each operation.
pub struct UserManager {
    store: Arc<dyn UserStore>,
    settings: Settings,
}

impl UserManager {
    /// Create a manager over an explicit store handle.
    pub fn new(store: Arc<dyn UserStore>, settings: Settings) -> Self {
        Self { store, settings }
    }

    /// The settings this manager was constructed with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Look up a user by username.
    ///
    /// Absence is a normal result, not an error.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<RegisteredUser>> {
        self.store.find_by_username(username)
    }

    /// Look up a user by API key, for stateless per-request authentication.
    ///
    /// Absence is a normal result, not an error.
    pub fn find_user_by_api_key(&self, api_key: &str) -> Result<Option<RegisteredUser>> {
        self.store.find_by_api_key(api_key)
    }

    /// Attempts to register a new user. Only the username is validated, it
    /// is expected that other fields have already been validated.
    ///
    /// The existence pre-check narrows the conflict window; the store's
    /// unique username index is the authority, so of two concurrent
    /// registrations with the same username exactly one succeeds and the
    /// other fails with [`UserError::UsernameConflict`].
    pub fn register_user(&self, request: RegistrationRequest) -> Result<RegisteredUser> {
        if self.store.find_by_username(&request.username)?.is_some() {
            return Err(UserError::UsernameConflict {
                username: request.username.clone(),
            }
            .into());
        }

        let password_kdf = self.settings.kdf.clone();
        let password_salt = crypto::random_bytes(self.settings.salt_length)?;
        let password_key =
            crypto::derive_key(request.password.as_bytes(), &password_salt, &password_kdf)?;

        let record = RegisteredUser {
            identifier: Uuid::new_v4().to_string(),
            username: request.username.clone(),
            api_key: crypto::secure_token(self.settings.api_key_length)?,
            password_salt,
            password_kdf,
            password_key,
            enabled: true,
            quota: self.settings.default_quota,
            created_at: chrono::Utc::now().timestamp(),
        };

        match self.store.insert(&record) {
            Ok(()) => {
                info!(
                    username = %record.username,
                    identifier = %record.identifier,
                    "registered user"
                );
                Ok(record)
            }
            Err(Error::Store(StoreError::DuplicateKey { index, .. }))
                if index == INDEX_USERNAME =>
            {
                Err(UserError::UsernameConflict {
                    username: request.username.clone(),
                }
                .into())
            }
            Err(e) => Err(e),
        }
    }

    /// Verify a plaintext password against a user record.
    ///
    /// Recomputes the verification key under the record's stored salt and
    /// parameter snapshot and compares in constant time, so a wrong
    /// password is indistinguishable in timing and return shape from any
    /// other wrong password. Does not consult `enabled`; enablement gating
    /// is layered above this primitive by the caller.
    pub fn check_password(&self, password: &str, user: &RegisteredUser) -> Result<bool> {
        let mut derived =
            crypto::derive_key(password.as_bytes(), &user.password_salt, &user.password_kdf)?;
        let matches = crypto::constant_time_eq(&derived, &user.password_key);
        derived.zeroize();
        Ok(matches)
    }

    /// Replace a stored record, keyed by identifier.
    ///
    /// Returns `Ok(false)` when no matching record exists; the caller must
    /// treat that as "record no longer exists", not as a failure.
    pub fn update_user(&self, user: &RegisteredUser) -> Result<bool> {
        let updated = self.store.update(user)?;
        if updated {
            debug!(identifier = %user.identifier, "updated user record");
        }
        Ok(updated)
    }

    /// Remove a user by username.
    ///
    /// Idempotent; removing a nonexistent username is not an error.
    pub fn remove_user(&self, username: &str) -> Result<()> {
        let removed = self.store.delete_by_username(username)?;
        if removed > 0 {
            info!(username, "removed user");
        }
        Ok(())
    }

    /// All registered users, for admin enumeration.
    pub fn list_users(&self) -> Result<Vec<RegisteredUser>> {
        self.store.list()
    }

    /// Enable or disable an account by username.
    ///
    /// Returns `Ok(false)` when the user no longer exists.
    pub fn set_enabled(&self, username: &str, enabled: bool) -> Result<bool> {
        let Some(mut user) = self.store.find_by_username(username)? else {
            return Ok(false);
        };
        user.enabled = enabled;
        let updated = self.store.update(&user)?;
        if updated {
            info!(username, enabled, "changed account status");
        }
        Ok(updated)
    }

    /// Set the storage quota for an account, in bytes.
    ///
    /// Returns `Ok(false)` when the user no longer exists.
    pub fn set_quota(&self, username: &str, quota: u64) -> Result<bool> {
        let Some(mut user) = self.store.find_by_username(username)? else {
            return Ok(false);
        };
        user.quota = quota;
        let updated = self.store.update(&user)?;
        if updated {
            info!(username, quota, "changed storage quota");
        }
        Ok(updated)
    }

    /// Whether the username belongs to a configured administrator.
    pub fn is_administrator(&self, username: &str) -> bool {
        self.settings
            .admin_users
            .iter()
            .any(|admin| admin == username)
    }
}
