//! Error types for the council.
//!
//! Defines errors raised while creating proposals, casting ballots and
//! resolving outcomes.

use moot_store::StoreError;
use moot_types::{ErrorKind, ProposalId, UserId};
use thiserror::Error;

/// Errors that can occur during council operations.
#[derive(Debug, Error)]
pub enum CouncilError {
    /// The proposal does not exist. After a resolution this means "already
    /// resolved".
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    /// The voter is not in the proposal's electorate.
    #[error("user {voter} is not eligible to vote on proposal {proposal}")]
    NotEligible {
        /// Proposal concerned.
        proposal: ProposalId,
        /// Rejected voter.
        voter: UserId,
    },

    /// The voter already cast a ballot on this proposal.
    #[error("user {voter} has already voted on proposal {proposal}")]
    AlreadyVoted {
        /// Proposal concerned.
        proposal: ProposalId,
        /// Repeat voter.
        voter: UserId,
    },

    /// The proposal is past its deadline or no longer pending.
    #[error("proposal {0} is closed")]
    ProposalClosed(ProposalId),

    /// The proposal is malformed.
    #[error("invalid proposal: {0}")]
    InvalidProposal(String),

    /// The action kind or its target is malformed.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CouncilError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CouncilError::ProposalNotFound(_) => ErrorKind::NotFound,
            CouncilError::NotEligible { .. } | CouncilError::ProposalClosed(_) => ErrorKind::NotAllowed,
            CouncilError::AlreadyVoted { .. } => ErrorKind::Conflict,
            CouncilError::InvalidProposal(_) | CouncilError::InvalidAction(_) => {
                ErrorKind::InvalidInput
            }
            CouncilError::Store(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_eligible_display() {
        let err = CouncilError::NotEligible {
            proposal: ProposalId::generate(),
            voter: UserId::new("eve"),
        };
        assert!(err.to_string().contains("eve"));
        assert_eq!(err.kind(), ErrorKind::NotAllowed);
    }

    #[test]
    fn test_already_voted_display() {
        let err = CouncilError::AlreadyVoted {
            proposal: ProposalId::generate(),
            voter: UserId::new("bob"),
        };
        assert!(err.to_string().contains("already voted"));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_invalid_proposal_display() {
        let err = CouncilError::InvalidProposal("end time before start".to_string());
        assert!(err.to_string().contains("end time before start"));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_not_found_kind() {
        assert_eq!(
            CouncilError::ProposalNotFound(ProposalId::generate()).kind(),
            ErrorKind::NotFound
        );
    }
}
