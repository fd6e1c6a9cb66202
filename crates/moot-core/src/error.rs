//! Error types for Moot Core.

use moot_council::CouncilError;
use moot_groups::GroupError;
use moot_ledger::LedgerError;
use moot_store::StoreError;
use moot_types::ErrorKind;
use thiserror::Error;

/// Core error type for governance operations.
#[derive(Debug, Error)]
pub enum MootError {
    /// Malformed request caught by the facade.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ledger error passthrough.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Group error passthrough.
    #[error("Group error: {0}")]
    Groups(#[from] GroupError),

    /// Council error passthrough.
    #[error("Council error: {0}")]
    Council(#[from] CouncilError),

    /// Storage error passthrough.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl MootError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MootError::InvalidInput(_) | MootError::Config(_) => ErrorKind::InvalidInput,
            MootError::Ledger(e) => e.kind(),
            MootError::Groups(e) => e.kind(),
            MootError::Council(e) => e.kind(),
            MootError::Store(e) => e.kind(),
        }
    }

    /// Whether this is a missing proposal, meaning it already resolved.
    pub fn is_already_resolved(&self) -> bool {
        matches!(self, MootError::Council(CouncilError::ProposalNotFound(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moot_types::{ProposalId, UserId};

    #[test]
    fn test_passthrough_kind() {
        let err: MootError = LedgerError::InsufficientFunds {
            user: UserId::new("alice"),
            balance: 40,
            requested: 100,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NotAllowed);
        assert!(err.to_string().starts_with("Ledger error"));
    }

    #[test]
    fn test_already_resolved() {
        let err: MootError = CouncilError::ProposalNotFound(ProposalId::generate()).into();
        assert!(err.is_already_resolved());
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!MootError::InvalidInput("x".into()).is_already_resolved());
    }

    #[test]
    fn test_config_display() {
        let err = MootError::Config("bad stake".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad stake");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
