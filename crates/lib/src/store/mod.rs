//! User record storage
//!
//! The [`UserStore`] trait is the seam between the user manager and the
//! persistent record collection. The manager is constructed over an explicit
//! store handle, so tests and alternative backends slot in without touching
//! the manager itself. [`InMemory`] is the bundled implementation.

mod errors;
mod memory;

pub use errors::StoreError;
pub use memory::{InMemory, Transaction};

use crate::{Result, user::RegisteredUser};

/// Unique index over the record primary key.
pub const INDEX_IDENTIFIER: &str = "identifier";

/// Unique index over usernames.
pub const INDEX_USERNAME: &str = "username";

/// Unique index over API keys.
pub const INDEX_API_KEY: &str = "api_key";

/// A keyed collection of user records with unique secondary indexes on
/// `identifier`, `username`, and `api_key`.
///
/// Implementations must apply each mutating operation atomically: committed
/// effects are all-or-nothing, and readers never observe a partially written
/// record. Lookups reflect some committed state but are not required to be
/// linearizable with concurrent writes.
pub trait UserStore: Send + Sync {
    /// Look up a record by username. Absence is `Ok(None)`, not an error.
    fn find_by_username(&self, username: &str) -> Result<Option<RegisteredUser>>;

    /// Look up a record by API key. Absence is `Ok(None)`, not an error.
    fn find_by_api_key(&self, api_key: &str) -> Result<Option<RegisteredUser>>;

    /// All records, in unspecified order.
    fn list(&self) -> Result<Vec<RegisteredUser>>;

    /// Insert a new record.
    ///
    /// The uniqueness check and the insert are a single atomic step: of two
    /// concurrent inserts with the same username, exactly one commits and
    /// the other fails with [`StoreError::DuplicateKey`].
    fn insert(&self, user: &RegisteredUser) -> Result<()>;

    /// Full-record replace keyed by `identifier`.
    ///
    /// Returns `Ok(false)` if no record with that identifier exists.
    fn update(&self, user: &RegisteredUser) -> Result<bool>;

    /// Delete every record with the given username.
    ///
    /// Idempotent; returns the number of records removed.
    fn delete_by_username(&self, username: &str) -> Result<usize>;
}
