//! # Moot Council
//!
//! Stake-funded group votes. A resident of a group opens a proposal for an
//! action on that group; the residents at that moment become its
//! electorate and each may vote once. The proposal resolves when it is
//! evaluated.
//!
//! ## Lifecycle
//!
//! | Step | Effect |
//! |------|--------|
//! | open | validated, stored as `Pending` with an electorate snapshot |
//! | cast | one yes or no ballot per eligible voter, before the deadline |
//! | evaluate | `Expired` past the deadline, else `Approved` at the threshold, else stays `Pending` |
//! | resolve | a terminal proposal is deleted |
//!
//! ## Approval
//!
//! Approval is measured against the electorate, not against ballots cast:
//! with the default 51% threshold, 3 yes ballots out of 4 voters approve
//! and 2 do not. Late joiners never vote and leavers keep their vote.
//!
//! ## Example
//!
//! ```rust
//! use moot_council::{Action, Council, NewProposal, Status};
//! use moot_store::Store;
//! use moot_types::{GroupId, UserId};
//! use chrono::{Duration, Utc};
//!
//! let store = Store::temporary().unwrap();
//! let council = Council::new(&store).unwrap();
//! let (alice, bob) = (UserId::new("alice"), UserId::new("bob"));
//! let scope = GroupId::generate();
//! let action = Action::Censor { word: "heck".into() };
//! let now = Utc::now();
//!
//! let proposal = council
//!     .create(NewProposal {
//!         initiator: alice.clone(),
//!         scope,
//!         title: action.title(&scope),
//!         reason: "keep it civil".into(),
//!         electorate: [alice.clone(), bob.clone()].into_iter().collect(),
//!         start_time: now,
//!         end_time: now + Duration::days(1),
//!         action,
//!     })
//!     .unwrap();
//!
//! council.cast_yes(&proposal.id, &alice).unwrap();
//! assert_eq!(council.evaluate(&proposal.id).unwrap().status, Status::Pending);
//!
//! council.cast_yes(&proposal.id, &bob).unwrap();
//! assert_eq!(council.evaluate(&proposal.id).unwrap().status, Status::Approved);
//! ```
//!
//! ## References
//!
//! - Robert's Rules of Order, "majority of the entire membership"

mod ballot;
mod council;
mod error;
mod proposal;
mod resolver;

pub use ballot::{cast, Ballot, Tally};
pub use council::{
    cast_in, decide_in, discard_in, insert_in, proposal_in, Council, Resolution, PROPOSALS,
};
pub use error::CouncilError;
pub use proposal::{Action, ActionKind, NewProposal, Proposal, Status};
pub use resolver::{Resolver, DEFAULT_APPROVAL_PERCENT};

/// Result type for council operations.
pub type Result<T> = std::result::Result<T, CouncilError>;
