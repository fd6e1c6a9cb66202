//! # Group Directory
//!
//! Group records: owner, residents, privacy flag, the owned censorship
//! list and back-references to open proposals.
//!
//! ## Invariants
//!
//! - The owner is always a resident.
//! - A group with no residents does not exist: the removal that empties it
//!   deletes the record and its censorship list in the same transaction.
//! - Proposal references are back-references only; the proposal owns its
//!   own lifecycle.

use crate::error::{GroupError, Result};
use crate::words::{WordList, WordLists};
use moot_store::tx::{self, TxResult};
use moot_store::{Collection, Store, Transactional, TransactionalTree};
use moot_types::{GroupId, ProposalId, UserId, WordListId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Collection name for groups.
pub const GROUPS: &str = "groups";

/// A group record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub owner: UserId,
    pub residents: BTreeSet<UserId>,
    pub private: bool,
    pub word_list: WordListId,
    /// Open proposals scoped to this group.
    pub proposals: BTreeSet<ProposalId>,
}

impl Group {
    pub fn is_resident(&self, user: &UserId) -> bool {
        self.residents.contains(user)
    }

    fn require_resident(&self, user: &UserId) -> Result<()> {
        if self.is_resident(user) {
            Ok(())
        } else {
            Err(GroupError::NotResident {
                group: self.id,
                user: user.clone(),
            })
        }
    }
}

/// What happened when a resident left a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Departure {
    pub group: GroupId,
    pub user: UserId,
    /// Set when the departing user owned the group and someone else took over.
    pub new_owner: Option<UserId>,
    /// Set when the user was the last resident.
    pub group_deleted: bool,
}

/// Loads a group inside a transaction.
pub fn group_in(groups: &TransactionalTree, id: &GroupId) -> TxResult<Group, GroupError> {
    match tx::get::<Group, _, GroupError>(groups, id)? {
        Some(group) => Ok(group),
        None => tx::abort(GroupError::GroupNotFound(*id)),
    }
}

/// Removes `user` from the group inside a transaction.
///
/// If the user owned the group, the first remaining resident becomes owner.
/// If nobody remains, the group and its censorship list are deleted.
pub fn remove_resident_in(
    groups: &TransactionalTree,
    lists: &TransactionalTree,
    id: &GroupId,
    user: &UserId,
) -> TxResult<Departure, GroupError> {
    let mut group = group_in(groups, id)?;
    if !group.residents.remove(user) {
        return tx::abort(GroupError::NotResident {
            group: *id,
            user: user.clone(),
        });
    }

    let mut departure = Departure {
        group: *id,
        user: user.clone(),
        new_owner: None,
        group_deleted: false,
    };

    match group.residents.iter().next().cloned() {
        None => {
            tx::remove::<_, GroupError>(groups, id)?;
            tx::remove::<_, GroupError>(lists, &group.word_list)?;
            departure.group_deleted = true;
        }
        Some(first) => {
            if group.owner == *user {
                group.owner = first.clone();
                departure.new_owner = Some(first);
            }
            tx::put(groups, id, &group)?;
        }
    }
    Ok(departure)
}

/// Deletes the group and reclaims its censorship list inside a transaction.
pub fn delete_group_in(
    groups: &TransactionalTree,
    lists: &TransactionalTree,
    id: &GroupId,
) -> TxResult<Group, GroupError> {
    let group = group_in(groups, id)?;
    tx::remove::<_, GroupError>(groups, id)?;
    tx::remove::<_, GroupError>(lists, &group.word_list)?;
    Ok(group)
}

/// Records an open proposal against its group.
pub fn attach_proposal_in(
    groups: &TransactionalTree,
    id: &GroupId,
    proposal: &ProposalId,
) -> TxResult<Group, GroupError> {
    let mut group = group_in(groups, id)?;
    group.proposals.insert(*proposal);
    tx::put(groups, id, &group)?;
    Ok(group)
}

/// Drops a proposal back-reference. A missing group is not an error, since
/// the proposal may have outlived it.
pub fn detach_proposal_in(
    groups: &TransactionalTree,
    id: &GroupId,
    proposal: &ProposalId,
) -> TxResult<bool, GroupError> {
    let Some(mut group) = tx::get::<Group, _, GroupError>(groups, id)? else {
        return Ok(false);
    };
    if !group.proposals.remove(proposal) {
        return Ok(false);
    }
    tx::put(groups, id, &group)?;
    Ok(true)
}

/// Directory of groups and their censorship lists.
#[derive(Debug, Clone)]
pub struct GroupDirectory {
    groups: Collection<Group>,
    lists: WordLists,
}

impl GroupDirectory {
    pub fn new(store: &Store) -> Result<Self> {
        Ok(Self {
            groups: store.collection(GROUPS)?,
            lists: WordLists::new(store)?,
        })
    }

    /// The backing collection, for multi-tree transactions.
    pub fn collection(&self) -> &Collection<Group> {
        &self.groups
    }

    /// The censorship lists owned by these groups.
    pub fn word_lists(&self) -> &WordLists {
        &self.lists
    }

    /// Creates a group owned by `owner`, with `owner` as sole resident and a
    /// fresh empty censorship list.
    pub fn create_group(&self, owner: &UserId) -> Result<Group> {
        let group = Group {
            id: GroupId::generate(),
            owner: owner.clone(),
            residents: BTreeSet::from([owner.clone()]),
            private: false,
            word_list: WordListId::generate(),
            proposals: BTreeSet::new(),
        };
        let list = WordList::new(group.word_list);

        let result = (self.groups.tree(), self.lists.collection().tree()).transaction(|(groups, lists)| {
            tx::put::<_, _, GroupError>(lists, &list.id, &list)?;
            tx::put(groups, &group.id, &group)?;
            Ok(())
        });
        tx::commit(result)?;

        info!(group = %group.id, owner = %owner, "group created");
        Ok(group)
    }

    pub fn group(&self, id: &GroupId) -> Result<Group> {
        self.groups.get(id)?.ok_or(GroupError::GroupNotFound(*id))
    }

    pub fn residents(&self, id: &GroupId) -> Result<BTreeSet<UserId>> {
        Ok(self.group(id)?.residents)
    }

    pub fn owner(&self, id: &GroupId) -> Result<UserId> {
        Ok(self.group(id)?.owner)
    }

    pub fn is_resident(&self, id: &GroupId, user: &UserId) -> Result<bool> {
        Ok(self.group(id)?.is_resident(user))
    }

    /// Every group in the directory.
    pub fn all(&self) -> Result<Vec<Group>> {
        Ok(self.groups.values()?)
    }

    /// Groups `user` resides in.
    pub fn groups_of(&self, user: &UserId) -> Result<Vec<Group>> {
        Ok(self.groups.filter(|g| g.is_resident(user))?)
    }

    /// Adds `invitee` on behalf of resident `inviter`. Inviting a current
    /// resident changes nothing.
    pub fn invite(&self, id: &GroupId, inviter: &UserId, invitee: &UserId) -> Result<Group> {
        let group = self
            .groups
            .modify(id, |group: &mut Group| -> Result<Group> {
                group.require_resident(inviter)?;
                group.residents.insert(invitee.clone());
                Ok(group.clone())
            })?
            .ok_or(GroupError::GroupNotFound(*id))?;
        debug!(group = %id, invitee = %invitee, "resident added");
        Ok(group)
    }

    /// Removes a resident, applying owner promotion and empty-group deletion.
    pub fn remove_resident(&self, id: &GroupId, user: &UserId) -> Result<Departure> {
        let result = (self.groups.tree(), self.lists.collection().tree())
            .transaction(|(groups, lists)| remove_resident_in(groups, lists, id, user));
        let departure = tx::commit(result)?;
        info!(
            group = %id,
            user = %user,
            new_owner = ?departure.new_owner,
            deleted = departure.group_deleted,
            "resident removed"
        );
        Ok(departure)
    }

    /// Makes `new_owner` the owner. They must already be a resident.
    pub fn set_owner(&self, id: &GroupId, new_owner: &UserId) -> Result<Group> {
        self.groups
            .modify(id, |group: &mut Group| -> Result<Group> {
                group.require_resident(new_owner)?;
                group.owner = new_owner.clone();
                Ok(group.clone())
            })?
            .ok_or(GroupError::GroupNotFound(*id))
    }

    /// Hands ownership over; only the current owner may do this.
    pub fn transfer_ownership(&self, id: &GroupId, owner: &UserId, new_owner: &UserId) -> Result<Group> {
        let group = self
            .groups
            .modify(id, |group: &mut Group| -> Result<Group> {
                if group.owner != *owner {
                    return Err(GroupError::NotOwner {
                        group: *id,
                        user: owner.clone(),
                    });
                }
                group.require_resident(new_owner)?;
                group.owner = new_owner.clone();
                Ok(group.clone())
            })?
            .ok_or(GroupError::GroupNotFound(*id))?;
        info!(group = %id, owner = %new_owner, "ownership transferred");
        Ok(group)
    }

    /// Marks the group private or public; any resident may do this.
    pub fn set_privacy(&self, id: &GroupId, actor: &UserId, private: bool) -> Result<Group> {
        self.groups
            .modify(id, |group: &mut Group| -> Result<Group> {
                group.require_resident(actor)?;
                group.private = private;
                Ok(group.clone())
            })?
            .ok_or(GroupError::GroupNotFound(*id))
    }

    /// Deletes the group and reclaims its censorship list.
    pub fn delete_group(&self, id: &GroupId) -> Result<Group> {
        let result = (self.groups.tree(), self.lists.collection().tree())
            .transaction(|(groups, lists)| delete_group_in(groups, lists, id));
        let group = tx::commit(result)?;
        info!(group = %id, "group deleted");
        Ok(group)
    }

    /// Removes `user` from every group they reside in.
    ///
    /// Each group is updated in its own transaction; a group that lost the
    /// user concurrently is skipped.
    pub fn remove_user_everywhere(&self, user: &UserId) -> Result<Vec<Departure>> {
        let mut departures = Vec::new();
        for group in self.groups_of(user)? {
            match self.remove_resident(&group.id, user) {
                Ok(departure) => departures.push(departure),
                Err(GroupError::GroupNotFound(_)) | Err(GroupError::NotResident { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(departures)
    }
}
