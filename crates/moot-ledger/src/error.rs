//! Error types for the points ledger.

use moot_store::StoreError;
use moot_types::{ErrorKind, UserId};
use thiserror::Error;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors raised by the points ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No account exists for the user.
    #[error("no points account for user {0}")]
    AccountNotFound(UserId),

    /// An account already exists for the user.
    #[error("points account for user {0} already exists")]
    AccountExists(UserId),

    /// A debit would take the balance below zero.
    #[error("insufficient funds: {user} has {balance} points, {requested} requested")]
    InsufficientFunds {
        /// Account holder.
        user: UserId,
        /// Balance at the time of the debit.
        balance: u64,
        /// Amount requested.
        requested: u64,
    },

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::AccountNotFound(_) => ErrorKind::NotFound,
            LedgerError::AccountExists(_) => ErrorKind::Conflict,
            LedgerError::InsufficientFunds { .. } => ErrorKind::NotAllowed,
            LedgerError::Store(e) => e.kind(),
        }
    }
}
