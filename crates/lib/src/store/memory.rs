//! Transactional in-memory user record store
//!
//! Rows are held as serialized JSON keyed by record identifier, with
//! secondary index maps for usernames and API keys maintained alongside.
//! Suitable for testing and single-node deployments; basic persistence is
//! provided via `save_to_file`/`load_from_file`, serializing the row map
//! to JSON and rebuilding the indexes on load.

use std::{
    collections::HashMap,
    path::Path,
    sync::{RwLock, RwLockReadGuard},
};

use serde::{Deserialize, Deserializer, Serialize};

use super::{INDEX_API_KEY, INDEX_IDENTIFIER, INDEX_USERNAME, UserStore, errors::StoreError};
use crate::{Result, user::RegisteredUser};

/// The current snapshot file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the snapshot version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported snapshot version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// Serializable snapshot of the store for persistence.
///
/// Only the row map is written; the secondary indexes are derived state
/// and are rebuilt (and re-validated) on load.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    rows: HashMap<String, String>,
}

/// Committed store state: the row map plus its secondary indexes.
///
/// Index invariant: every entry in `by_username` and `by_api_key` points at
/// an identifier present in `rows`, and every row is indexed under exactly
/// its own username and API key.
#[derive(Clone, Default, Debug)]
struct State {
    /// identifier -> serialized record
    rows: HashMap<String, String>,
    /// username -> identifier
    by_username: HashMap<String, String>,
    /// api_key -> identifier
    by_api_key: HashMap<String, String>,
}

impl State {
    fn decode_row(&self, identifier: &str) -> Result<RegisteredUser> {
        let row = self
            .rows
            .get(identifier)
            .ok_or_else(|| StoreError::Corruption {
                reason: format!("index points at missing row '{identifier}'"),
            })?;
        decode(row)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<RegisteredUser>> {
        match self.by_username.get(username) {
            Some(identifier) => Ok(Some(self.decode_row(identifier)?)),
            None => Ok(None),
        }
    }

    fn find_by_api_key(&self, api_key: &str) -> Result<Option<RegisteredUser>> {
        match self.by_api_key.get(api_key) {
            Some(identifier) => Ok(Some(self.decode_row(identifier)?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<RegisteredUser>> {
        self.rows.values().map(|row| decode(row)).collect()
    }

    fn insert(&mut self, user: &RegisteredUser) -> Result<()> {
        if self.rows.contains_key(&user.identifier) {
            return Err(duplicate(INDEX_IDENTIFIER, &user.identifier));
        }
        if self.by_username.contains_key(&user.username) {
            return Err(duplicate(INDEX_USERNAME, &user.username));
        }
        if self.by_api_key.contains_key(&user.api_key) {
            return Err(duplicate(INDEX_API_KEY, &user.api_key));
        }

        let row = encode(user)?;
        self.rows.insert(user.identifier.clone(), row);
        self.by_username
            .insert(user.username.clone(), user.identifier.clone());
        self.by_api_key
            .insert(user.api_key.clone(), user.identifier.clone());
        Ok(())
    }

    fn update(&mut self, user: &RegisteredUser) -> Result<bool> {
        if !self.rows.contains_key(&user.identifier) {
            return Ok(false);
        }
        let previous = self.decode_row(&user.identifier)?;

        // The replacement may change indexed fields; reject values already
        // claimed by a different record.
        if let Some(other) = self.by_username.get(&user.username)
            && other != &user.identifier
        {
            return Err(duplicate(INDEX_USERNAME, &user.username));
        }
        if let Some(other) = self.by_api_key.get(&user.api_key)
            && other != &user.identifier
        {
            return Err(duplicate(INDEX_API_KEY, &user.api_key));
        }

        let row = encode(user)?;
        self.by_username.remove(&previous.username);
        self.by_api_key.remove(&previous.api_key);
        self.rows.insert(user.identifier.clone(), row);
        self.by_username
            .insert(user.username.clone(), user.identifier.clone());
        self.by_api_key
            .insert(user.api_key.clone(), user.identifier.clone());
        Ok(true)
    }

    fn delete_where<P>(&mut self, predicate: P) -> Result<usize>
    where
        P: Fn(&RegisteredUser) -> bool,
    {
        let mut doomed = Vec::new();
        for row in self.rows.values() {
            let user = decode(row)?;
            if predicate(&user) {
                doomed.push(user);
            }
        }
        for user in &doomed {
            self.rows.remove(&user.identifier);
            self.by_username.remove(&user.username);
            self.by_api_key.remove(&user.api_key);
        }
        Ok(doomed.len())
    }
}

fn encode(user: &RegisteredUser) -> Result<String> {
    serde_json::to_string(user).map_err(|e| {
        StoreError::SerializationFailed {
            reason: e.to_string(),
        }
        .into()
    })
}

fn decode(row: &str) -> Result<RegisteredUser> {
    serde_json::from_str(row).map_err(|e| {
        StoreError::DeserializationFailed {
            reason: e.to_string(),
        }
        .into()
    })
}

fn duplicate(index: &'static str, value: &str) -> crate::Error {
    StoreError::DuplicateKey {
        index,
        value: value.to_string(),
    }
    .into()
}

fn unavailable(reason: impl std::fmt::Display) -> crate::Error {
    StoreError::Unavailable {
        reason: reason.to_string(),
    }
    .into()
}

/// A scoped write transaction over the in-memory store.
///
/// Mutations apply to a staged copy of the store state; the staged state
/// becomes visible to other readers only if the transaction body returns
/// `Ok`. Reads inside the transaction observe its own staged writes.
pub struct Transaction {
    staged: State,
}

impl Transaction {
    /// Look up a record by username within the transaction.
    pub fn find_by_username(&self, username: &str) -> Result<Option<RegisteredUser>> {
        self.staged.find_by_username(username)
    }

    /// Insert a new record, enforcing all three unique indexes.
    pub fn insert(&mut self, user: &RegisteredUser) -> Result<()> {
        self.staged.insert(user)
    }

    /// Full-record replace keyed by identifier. `Ok(false)` when absent.
    pub fn update(&mut self, user: &RegisteredUser) -> Result<bool> {
        self.staged.update(user)
    }

    /// Delete every record matching the predicate, returning the count.
    pub fn delete_where<P>(&mut self, predicate: P) -> Result<usize>
    where
        P: Fn(&RegisteredUser) -> bool,
    {
        self.staged.delete_where(predicate)
    }
}

/// A simple in-memory user record store using `HashMap`s behind an `RwLock`.
///
/// Write transactions stage a copy of the state and commit it atomically
/// under the write lock, so a failed transaction body leaves no partial
/// state visible and the lock is released on every exit path. A poisoned
/// lock surfaces as [`StoreError::Unavailable`].
#[derive(Debug)]
pub struct InMemory {
    state: RwLock<State>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` store with all indexes in place.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| unavailable("lock poisoned"))
    }

    /// Run `body` inside a scoped write transaction.
    ///
    /// The staged state replaces the live state only when `body` returns
    /// `Ok`; on error the store is left exactly as it was.
    pub fn with_transaction<T, F>(&self, body: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction) -> Result<T>,
    {
        let mut state = self.state.write().map_err(|_| unavailable("lock poisoned"))?;
        let mut txn = Transaction {
            staged: state.clone(),
        };
        let value = body(&mut txn)?;
        *state = txn.staged;
        Ok(value)
    }

    /// Saves the entire store state to a specified file as JSON.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the snapshot should be saved.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let snapshot = {
            let state = self.read_state()?;
            Snapshot {
                version: PERSISTENCE_VERSION,
                rows: state.rows.clone(),
            }
        };
        let json = serde_json::to_string_pretty(&snapshot).map_err(|e| {
            crate::Error::from(StoreError::SerializationFailed {
                reason: e.to_string(),
            })
        })?;
        std::fs::write(path, json).map_err(unavailable)
    }

    /// Loads the store state from a specified JSON file.
    ///
    /// If the file does not exist, a new, empty store is returned. Both
    /// secondary indexes are rebuilt from the rows; a snapshot whose rows
    /// duplicate a unique value is rejected with [`StoreError::Corruption`].
    ///
    /// # Arguments
    /// * `path` - The path to the file from which to load the snapshot.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(unavailable(e)),
        };
        let snapshot: Snapshot = serde_json::from_str(&json).map_err(|e| {
            crate::Error::from(StoreError::DeserializationFailed {
                reason: e.to_string(),
            })
        })?;
        Self::from_rows(snapshot.rows)
    }

    /// Rebuild a store from a raw row map, re-validating the index
    /// invariants.
    fn from_rows(rows: HashMap<String, String>) -> Result<Self> {
        let mut state = State {
            rows,
            ..State::default()
        };
        for (identifier, row) in &state.rows {
            let user = decode(row)?;
            if user.identifier != *identifier {
                return Err(StoreError::Corruption {
                    reason: format!(
                        "row keyed '{identifier}' contains record '{}'",
                        user.identifier
                    ),
                }
                .into());
            }
            if state
                .by_username
                .insert(user.username.clone(), identifier.clone())
                .is_some()
            {
                return Err(StoreError::Corruption {
                    reason: format!("duplicate username '{}' in snapshot", user.username),
                }
                .into());
            }
            if state
                .by_api_key
                .insert(user.api_key.clone(), identifier.clone())
                .is_some()
            {
                return Err(StoreError::Corruption {
                    reason: "duplicate API key in snapshot".to_string(),
                }
                .into());
            }
        }
        Ok(Self {
            state: RwLock::new(state),
        })
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for InMemory {
    fn find_by_username(&self, username: &str) -> Result<Option<RegisteredUser>> {
        self.read_state()?.find_by_username(username)
    }

    fn find_by_api_key(&self, api_key: &str) -> Result<Option<RegisteredUser>> {
        self.read_state()?.find_by_api_key(api_key)
    }

    fn list(&self) -> Result<Vec<RegisteredUser>> {
        self.read_state()?.list()
    }

    fn insert(&self, user: &RegisteredUser) -> Result<()> {
        self.with_transaction(|txn| txn.insert(user))
    }

    fn update(&self, user: &RegisteredUser) -> Result<bool> {
        self.with_transaction(|txn| txn.update(user))
    }

    fn delete_by_username(&self, username: &str) -> Result<usize> {
        self.with_transaction(|txn| txn.delete_where(|user| user.username == username))
    }
}
