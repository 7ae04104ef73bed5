//! Error types for the user system
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum UserError {
    /// Registration attempted with a username that is already taken.
    ///
    /// Surfaced to the caller, never retried internally.
    #[error("Username already exists: {username}")]
    UsernameConflict { username: String },
}

impl UserError {
    /// Check if this error indicates a conflicting identity already exists.
    pub fn is_conflict(&self) -> bool {
        matches!(self, UserError::UsernameConflict { .. })
    }
}

impl From<UserError> for crate::Error {
    fn from(err: UserError) -> Self {
        crate::Error::User(err)
    }
}
