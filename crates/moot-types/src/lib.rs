//! # Moot Types
//!
//! Vocabulary shared by every Moot crate: entity identifiers, the error
//! taxonomy and the clock abstraction used for deadlines.
//!
//! ## Identifiers
//!
//! | Type | Backing | Issued by |
//! |------|---------|-----------|
//! | [`UserId`] | opaque string | external authentication system |
//! | [`GroupId`] | UUID v4 | group directory |
//! | [`WordListId`] | UUID v4 | censorship lists |
//! | [`ProposalId`] | UUID v4 | council |
//!
//! Every identifier implements [`StorageKey`] so it can address a document
//! in a collection without an intermediate `String`.

mod clock;
mod ids;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ids::{GroupId, ProposalId, StorageKey, UserId, WordListId};

use serde::{Deserialize, Serialize};

/// Coarse classification of every error a Moot component can raise.
///
/// Callers adapting Moot to a transport (HTTP, CLI) map these onto their
/// own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The referenced proposal, account, group or list is absent.
    NotFound,
    /// The request is malformed (bad amount, bad action, bad deadline).
    InvalidInput,
    /// The caller is not permitted to do this (not eligible, already voted,
    /// not a member, insufficient funds).
    NotAllowed,
    /// The request collides with existing state (duplicate account).
    Conflict,
    /// Storage or serialization failure.
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::NotAllowed => "not allowed",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not found");
        assert_eq!(ErrorKind::NotAllowed.to_string(), "not allowed");
    }
}
