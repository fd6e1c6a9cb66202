//! Typed document collections.

use crate::error::{Result, StoreError};
use crate::tx;
use moot_types::StorageKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::ConflictableTransactionError;
use std::fmt;
use std::marker::PhantomData;

/// A named collection of JSON-encoded `T` documents in one sled tree.
///
/// Single-document reads and writes go straight to the tree. Anything that
/// must observe and change a document atomically goes through
/// [`Collection::modify`], or through a multi-tree transaction over
/// [`Collection::tree`] using the helpers in [`crate::tx`].
pub struct Collection<T> {
    name: String,
    tree: sled::Tree,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            tree: self.tree.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub(crate) fn new(name: &str, tree: sled::Tree) -> Self {
        Self {
            name: name.to_string(),
            tree,
            _marker: PhantomData,
        }
    }

    /// Collection (tree) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying tree, for composing multi-tree transactions.
    pub fn tree(&self) -> &sled::Tree {
        &self.tree
    }

    /// Loads a document.
    pub fn get<K: StorageKey + ?Sized>(&self, key: &K) -> Result<Option<T>> {
        match self.tree.get(key.storage_key())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Checks whether a document exists.
    pub fn contains<K: StorageKey + ?Sized>(&self, key: &K) -> Result<bool> {
        Ok(self.tree.contains_key(key.storage_key())?)
    }

    /// Stores a document, overwriting any previous version.
    pub fn put<K: StorageKey + ?Sized>(&self, key: &K, doc: &T) -> Result<()> {
        let bytes = serde_json::to_vec(doc)?;
        self.tree.insert(key.storage_key(), bytes)?;
        Ok(())
    }

    /// Stores a document only if the key is vacant.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if a document already exists.
    pub fn insert_new<K>(&self, key: &K, doc: &T) -> Result<()>
    where
        K: StorageKey + fmt::Display + ?Sized,
    {
        let bytes = serde_json::to_vec(doc)?;
        let swapped = self
            .tree
            .compare_and_swap(key.storage_key(), None::<&[u8]>, Some(bytes))?;

        swapped.map_err(|_| StoreError::Duplicate {
            collection: self.name.clone(),
            key: key.to_string(),
        })
    }

    /// Removes a document, returning it if it existed.
    pub fn remove<K: StorageKey + ?Sized>(&self, key: &K) -> Result<Option<T>> {
        match self.tree.remove(key.storage_key())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Atomically reads, mutates and writes back one document.
    ///
    /// `f` may run more than once if the transaction conflicts with a
    /// concurrent writer, so it must not have side effects beyond the
    /// document. Returning `Err` from `f` aborts without writing.
    ///
    /// Returns `Ok(None)` if the document does not exist.
    pub fn modify<K, R, E, F>(&self, key: &K, f: F) -> std::result::Result<Option<R>, E>
    where
        K: StorageKey + ?Sized,
        E: From<StoreError>,
        F: Fn(&mut T) -> std::result::Result<R, E>,
    {
        let result = self.tree.transaction(|tree| {
            let Some(mut doc) = tx::get::<T, _, E>(tree, key)? else {
                return Ok(None);
            };
            let out = f(&mut doc).map_err(ConflictableTransactionError::Abort)?;
            tx::put::<T, _, E>(tree, key, &doc)?;
            Ok(Some(out))
        });
        tx::commit(result)
    }

    /// Loads every document in key order.
    pub fn values(&self) -> Result<Vec<T>> {
        let mut docs = Vec::new();
        for entry in self.tree.iter() {
            let (_, bytes) = entry?;
            docs.push(serde_json::from_slice(&bytes)?);
        }
        Ok(docs)
    }

    /// Loads every document matching a predicate.
    pub fn filter<P>(&self, predicate: P) -> Result<Vec<T>>
    where
        P: Fn(&T) -> bool,
    {
        let mut docs = Vec::new();
        for entry in self.tree.iter() {
            let (_, bytes) = entry?;
            let doc: T = serde_json::from_slice(&bytes)?;
            if predicate(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("len", &self.tree.len())
            .finish()
    }
}
