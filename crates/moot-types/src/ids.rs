//! Entity identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Anything that can address a document in a collection.
pub trait StorageKey {
    /// Byte key used by the storage engine.
    fn storage_key(&self) -> Vec<u8>;
}

impl StorageKey for str {
    fn storage_key(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl StorageKey for String {
    fn storage_key(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

/// Identifier of a user, issued by the external authentication system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl StorageKey for UserId {
    fn storage_key(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Issues a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl StorageKey for $name {
            fn storage_key(&self) -> Vec<u8> {
                self.0.as_bytes().to_vec()
            }
        }
    };
}

uuid_id!(
    /// Identifier of a group (the scope of a proposal).
    GroupId
);

uuid_id!(
    /// Identifier of a group's censorship list.
    WordListId
);

uuid_id!(
    /// Identifier of a proposal.
    ProposalId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_is_transparent() {
        let user = UserId::new("alice");
        assert_eq!(serde_json::to_string(&user).unwrap(), "\"alice\"");
        assert_eq!(user.storage_key(), b"alice".to_vec());
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        assert_ne!(GroupId::generate(), GroupId::generate());
        assert_ne!(ProposalId::generate(), ProposalId::generate());
    }

    #[test]
    fn test_uuid_id_parses_its_display() {
        let id = ProposalId::generate();
        let parsed: ProposalId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(id.storage_key().len(), 16);
    }

    #[test]
    fn test_uuid_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<GroupId>().is_err());
    }
}
