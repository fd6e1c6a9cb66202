//! # Transaction Helpers
//!
//! Typed access to [`TransactionalTree`]s plus the error plumbing needed to
//! compose operations from several crates inside one sled transaction.
//!
//! Component crates expose their mutations as functions over
//! `&TransactionalTree` returning [`TxResult`] with their own error type.
//! A caller opening a transaction across several trees converts those
//! results with [`lift`] (errors propagate and abort) or [`settle`] (domain
//! errors become values, the transaction keeps going), and turns the final
//! outcome back into a plain `Result` with [`commit`].
//!
//! Transaction closures may be retried on conflict; everything they do must
//! go through the transactional trees.

use crate::error::StoreError;
use moot_types::StorageKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{
    ConflictableTransactionError, TransactionError, TransactionResult, TransactionalTree,
};

/// Result of a step inside a transaction.
pub type TxResult<T, E> = Result<T, ConflictableTransactionError<E>>;

/// Aborts the surrounding transaction with a domain error.
pub fn abort<T, E>(error: E) -> TxResult<T, E> {
    Err(ConflictableTransactionError::Abort(error))
}

/// Reads and decodes a document.
pub fn get<T, K, E>(tree: &TransactionalTree, key: &K) -> TxResult<Option<T>, E>
where
    T: DeserializeOwned,
    K: StorageKey + ?Sized,
    E: From<StoreError>,
{
    match tree.get(key.storage_key())? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ConflictableTransactionError::Abort(StoreError::from(e).into())),
        None => Ok(None),
    }
}

/// Encodes and writes a document.
pub fn put<T, K, E>(tree: &TransactionalTree, key: &K, doc: &T) -> TxResult<(), E>
where
    T: Serialize,
    K: StorageKey + ?Sized,
    E: From<StoreError>,
{
    let bytes = serde_json::to_vec(doc)
        .map_err(|e| ConflictableTransactionError::Abort(StoreError::from(e).into()))?;
    tree.insert(key.storage_key(), bytes)?;
    Ok(())
}

/// Deletes a document, returning whether it existed.
pub fn remove<K, E>(tree: &TransactionalTree, key: &K) -> TxResult<bool, E>
where
    K: StorageKey + ?Sized,
{
    Ok(tree.remove(key.storage_key())?.is_some())
}

/// Converts a step's abort error into the caller's error type.
pub fn lift<T, E, F>(result: TxResult<T, E>) -> TxResult<T, F>
where
    F: From<E>,
{
    result.map_err(|e| match e {
        ConflictableTransactionError::Abort(e) => ConflictableTransactionError::Abort(e.into()),
        ConflictableTransactionError::Conflict => ConflictableTransactionError::Conflict,
        ConflictableTransactionError::Storage(e) => ConflictableTransactionError::Storage(e),
    })
}

/// Captures a step's domain error as a value instead of aborting.
///
/// Conflicts and storage failures still propagate. The step must not have
/// written anything before failing, since its buffered writes are kept.
pub fn settle<T, E, F>(result: TxResult<T, E>) -> TxResult<Result<T, E>, F> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(ConflictableTransactionError::Abort(e)) => Ok(Err(e)),
        Err(ConflictableTransactionError::Conflict) => Err(ConflictableTransactionError::Conflict),
        Err(ConflictableTransactionError::Storage(e)) => {
            Err(ConflictableTransactionError::Storage(e))
        }
    }
}

/// Flattens a finished transaction into the caller's error type.
pub fn commit<T, E>(result: TransactionResult<T, E>) -> Result<T, E>
where
    E: From<StoreError>,
{
    result.map_err(|e| match e {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => StoreError::Database(e).into(),
    })
}
