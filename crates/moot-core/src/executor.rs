//! Consequence executor: applies an approved proposal's action to its group.
//!
//! | Action | Effect |
//! |--------|--------|
//! | `Ban` | remove the target from residents, promoting a new owner or deleting the emptied group |
//! | `Censor` | add the word to the group's censorship list (no duplicates) |
//! | `Uncensor` | remove the word from the group's censorship list |
//! | `DeleteGroup` | delete the group and reclaim its censorship list |
//!
//! Every effect validates before it writes, so a failed effect leaves the
//! surrounding transaction untouched and the resolution can still commit.

use moot_council::{Action, Proposal};
use moot_groups::{
    add_word_in, delete_group_in, group_in, normalize_word, remove_resident_in, remove_word_in,
    Departure, GroupDirectory, GroupError,
};
use moot_store::tx::{self, TxResult};
use moot_store::{Transactional, TransactionalTree};
use moot_types::GroupId;
use serde::{Deserialize, Serialize};
use tracing::info;

/// What an applied effect changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Consequence {
    Banned { departure: Departure },
    Censored { word: String, added: bool },
    Uncensored { word: String },
    GroupDeleted { group: GroupId },
}

/// Applies approved actions against the group directory.
#[derive(Debug, Clone)]
pub struct ConsequenceExecutor {
    groups: GroupDirectory,
}

impl ConsequenceExecutor {
    pub fn new(groups: GroupDirectory) -> Self {
        Self { groups }
    }

    /// Applies `proposal`'s action inside a transaction over the groups and
    /// word-list trees.
    pub fn apply_in(
        &self,
        groups: &TransactionalTree,
        lists: &TransactionalTree,
        proposal: &Proposal,
    ) -> TxResult<Consequence, GroupError> {
        let scope = &proposal.scope;
        match &proposal.action {
            Action::Ban { user } => {
                let departure = remove_resident_in(groups, lists, scope, user)?;
                Ok(Consequence::Banned { departure })
            }
            Action::Censor { word } => {
                let word = normalize_word(word).or_else(tx::abort)?;
                let group = group_in(groups, scope)?;
                let added = add_word_in(lists, &group.word_list, &word)?;
                Ok(Consequence::Censored { word, added })
            }
            Action::Uncensor { word } => {
                let word = normalize_word(word).or_else(tx::abort)?;
                let group = group_in(groups, scope)?;
                remove_word_in(lists, &group.word_list, &word)?;
                Ok(Consequence::Uncensored { word })
            }
            Action::DeleteGroup => {
                let group = delete_group_in(groups, lists, scope)?;
                Ok(Consequence::GroupDeleted { group: group.id })
            }
        }
    }

    /// Applies `proposal`'s action in its own transaction.
    pub fn apply(&self, proposal: &Proposal) -> moot_groups::Result<Consequence> {
        let result = (
            self.groups.collection().tree(),
            self.groups.word_lists().collection().tree(),
        )
            .transaction(|(groups, lists)| self.apply_in(groups, lists, proposal));
        let consequence = tx::commit(result)?;
        info!(proposal = %proposal.id, scope = %proposal.scope, ?consequence, "consequence applied");
        Ok(consequence)
    }
}
