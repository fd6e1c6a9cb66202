//! # Moot Groups
//!
//! Group membership, ownership and the per-group censorship list. These
//! are the records that governance decisions act upon: the residents of a
//! group form a proposal's electorate, and an approved proposal bans a
//! resident, edits the censorship list or deletes the group.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`GroupDirectory`] | owner, residents, privacy, proposal back-references |
//! | [`WordLists`] | censored words, one list per group |
//!
//! Mutations that touch both a group and its list (creation, removing the
//! last resident, deletion) run as a single transaction over both trees.
//! The `*_in` functions expose the same mutations for callers composing
//! larger transactions.

mod error;
mod group;
mod words;

pub use error::{GroupError, Result};
pub use group::{
    attach_proposal_in, delete_group_in, detach_proposal_in, group_in, remove_resident_in,
    Departure, Group, GroupDirectory, GROUPS,
};
pub use words::{add_word_in, normalize_word, remove_word_in, WordList, WordLists, WORD_LISTS};
