//! Error types for groups and censorship lists.

use moot_store::StoreError;
use moot_types::{ErrorKind, GroupId, UserId, WordListId};
use thiserror::Error;

/// Result type alias for group operations.
pub type Result<T> = std::result::Result<T, GroupError>;

/// Errors raised by the group directory and censorship lists.
#[derive(Debug, Error)]
pub enum GroupError {
    /// The group does not exist (never created or already deleted).
    #[error("group {0} not found")]
    GroupNotFound(GroupId),

    /// The censorship list does not exist.
    #[error("censorship list {0} not found")]
    WordListNotFound(WordListId),

    /// The user is not a resident of the group.
    #[error("user {user} is not a resident of group {group}")]
    NotResident {
        /// Group concerned.
        group: GroupId,
        /// User concerned.
        user: UserId,
    },

    /// Only the owner may perform this action.
    #[error("user {user} does not own group {group}")]
    NotOwner {
        /// Group concerned.
        group: GroupId,
        /// User who attempted the action.
        user: UserId,
    },

    /// The word is not on the list.
    #[error("word '{word}' is not censored in list {list}")]
    WordNotListed {
        /// List concerned.
        list: WordListId,
        /// Normalized word.
        word: String,
    },

    /// The word is empty or contains non-alphanumeric characters.
    #[error("invalid word: '{0}'")]
    InvalidWord(String),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GroupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GroupError::GroupNotFound(_)
            | GroupError::WordListNotFound(_)
            | GroupError::WordNotListed { .. } => ErrorKind::NotFound,
            GroupError::NotResident { .. } | GroupError::NotOwner { .. } => ErrorKind::NotAllowed,
            GroupError::InvalidWord(_) => ErrorKind::InvalidInput,
            GroupError::Store(e) => e.kind(),
        }
    }
}
