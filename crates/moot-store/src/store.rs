//! # Database Handle
//!
//! Opens the sled database that backs every Moot collection. Each
//! collection lives in its own tree (namespace):
//!
//! | Tree | Key | Value |
//! |------|-----|-------|
//! | `accounts` | user id | points account |
//! | `groups` | group id | group record |
//! | `word_lists` | list id | censored words |
//! | `proposals` | proposal id | pending proposal |
//!
//! ## References
//!
//! - Sled documentation: <https://sled.rs/>

use crate::collection::Collection;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Wrapper around a sled database.
///
/// Cloning is cheap; clones share the same database.
///
/// # Example
///
/// ```rust
/// use moot_store::Store;
///
/// let store = Store::temporary().unwrap();
/// let numbers = store.collection::<u64>("numbers").unwrap();
/// numbers.put("answer", &42).unwrap();
/// assert_eq!(numbers.get("answer").unwrap(), Some(42));
/// ```
#[derive(Clone)]
pub struct Store {
    db: sled::Db,
}

impl Store {
    /// Opens or creates a database at the given path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the path is unusable or the
    /// database is corrupted.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), recovered = db.was_recovered(), "database opened");
        Ok(Store { db })
    }

    /// Creates an in-memory database that vanishes on drop.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Store { db })
    }

    /// Opens (or creates) a named collection of `T` documents.
    pub fn collection<T>(&self, name: &str) -> Result<Collection<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let tree = self.db.open_tree(name)?;
        Ok(Collection::new(name, tree))
    }

    /// Flushes pending writes to disk, returning the bytes flushed.
    pub fn flush(&self) -> Result<usize> {
        Ok(self.db.flush()?)
    }

    /// Whether the database was recovered from disk rather than created.
    pub fn was_recovered(&self) -> bool {
        self.db.was_recovered()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("trees", &self.db.tree_names().len())
            .finish()
    }
}
