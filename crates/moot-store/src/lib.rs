//! # Moot Store
//!
//! Persistence for every Moot record: points accounts, groups, censorship
//! lists and pending proposals. Built on Sled, an embedded transactional
//! key-value database.
//!
//! ## Model
//!
//! The store is a set of key-indexed document collections. Each
//! [`Collection`] maps an identifier to a JSON-encoded document and offers
//! read / insert / update / delete. Nothing above this crate knows how
//! documents are laid out on disk.
//!
//! ## Consistency
//!
//! Requests arrive from independent callers with no in-process locking, so
//! correctness is enforced here:
//!
//! | Need | Mechanism |
//! |------|-----------|
//! | read-modify-write of one document | [`Collection::modify`] (single-tree transaction) |
//! | several documents in one collection | transaction over [`Collection::tree`] |
//! | documents across collections | multi-tree transaction + [`tx`] helpers |
//! | create-if-absent | [`Collection::insert_new`] (compare-and-swap) |
//!
//! Sled transactions are serializable and retried on conflict, so a
//! concurrent reader never observes a half-applied transaction.
//!
//! ## References
//!
//! - Sled documentation: <https://sled.rs/>
//! - Sled transactions: <https://docs.rs/sled/latest/sled/transaction/>

mod collection;
mod error;
mod store;
pub mod tx;

pub use collection::Collection;
pub use error::{Result, StoreError};
pub use store::Store;

pub use sled::transaction::TransactionalTree;
pub use sled::Transactional;
