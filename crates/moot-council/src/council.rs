//! # Council
//!
//! The store of pending proposals. A proposal lives in the `proposals`
//! collection from creation until it resolves; resolution deletes it, so
//! "not found" after an evaluation means "already resolved".
//!
//! Every step is exposed twice: as a `*_in` function over a
//! [`TransactionalTree`] for callers composing multi-collection
//! transactions, and as a [`Council`] method running its own transaction.

use crate::ballot::{cast, Ballot, Tally};
use crate::error::CouncilError;
use crate::proposal::{NewProposal, Proposal, Status};
use crate::resolver::Resolver;
use crate::Result;
use chrono::{DateTime, Utc};
use moot_store::tx::{self, TxResult};
use moot_store::{Collection, Store, TransactionalTree};
use moot_types::{Clock, GroupId, ProposalId, SystemClock, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Collection name for pending proposals.
pub const PROPOSALS: &str = "proposals";

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub status: Status,
    /// Snapshot of the proposal with `status` applied. For a terminal
    /// status this is the last state before deletion.
    pub proposal: Proposal,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Stores a freshly opened proposal inside a transaction.
pub fn insert_in(tree: &TransactionalTree, proposal: &Proposal) -> TxResult<(), CouncilError> {
    tx::put(tree, &proposal.id, proposal)
}

/// Loads a proposal inside a transaction.
pub fn proposal_in(tree: &TransactionalTree, id: &ProposalId) -> TxResult<Proposal, CouncilError> {
    match tx::get::<Proposal, _, CouncilError>(tree, id)? {
        Some(proposal) => Ok(proposal),
        None => tx::abort(CouncilError::ProposalNotFound(*id)),
    }
}

/// Records a ballot inside a transaction.
pub fn cast_in(
    tree: &TransactionalTree,
    id: &ProposalId,
    voter: &UserId,
    ballot: Ballot,
    now: DateTime<Utc>,
) -> TxResult<Tally, CouncilError> {
    let mut proposal = proposal_in(tree, id)?;
    let tally = cast(&mut proposal, voter, ballot, now).or_else(tx::abort)?;
    tx::put(tree, id, &proposal)?;
    Ok(tally)
}

/// Decides a proposal's outcome at `now` without removing it.
///
/// The returned snapshot carries the decided status.
pub fn decide_in(
    tree: &TransactionalTree,
    id: &ProposalId,
    resolver: &Resolver,
    now: DateTime<Utc>,
) -> TxResult<Proposal, CouncilError> {
    let mut proposal = proposal_in(tree, id)?;
    proposal.status = resolver.decide(&proposal, now);
    Ok(proposal)
}

/// Deletes a resolved proposal inside a transaction.
pub fn discard_in(tree: &TransactionalTree, id: &ProposalId) -> TxResult<bool, CouncilError> {
    tx::remove(tree, id)
}

/// Proposal store and lifecycle.
#[derive(Clone)]
pub struct Council {
    proposals: Collection<Proposal>,
    resolver: Resolver,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Council {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Council")
            .field("proposals", &self.proposals)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl Council {
    /// Opens the council with the default resolver and the system clock.
    pub fn new(store: &Store) -> Result<Self> {
        Self::with_resolver(store, Resolver::new(), Arc::new(SystemClock))
    }

    /// Opens the council with explicit resolution rules and time source.
    pub fn with_resolver(store: &Store, resolver: Resolver, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self {
            proposals: store.collection(PROPOSALS)?,
            resolver,
            clock,
        })
    }

    /// The backing collection, for multi-tree transactions.
    pub fn collection(&self) -> &Collection<Proposal> {
        &self.proposals
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Opens and stores a proposal.
    ///
    /// No stake is taken here; the governance facade debits it in the same
    /// transaction via [`insert_in`].
    pub fn create(&self, draft: NewProposal) -> Result<Proposal> {
        let proposal = Proposal::open(draft)?;
        self.proposals.put(&proposal.id, &proposal)?;
        info!(
            proposal = %proposal.id,
            scope = %proposal.scope,
            electorate = proposal.electorate.len(),
            "proposal opened"
        );
        Ok(proposal)
    }

    /// Loads a stored proposal as it is, without evaluating it.
    pub fn proposal(&self, id: &ProposalId) -> Result<Proposal> {
        self.proposals
            .get(id)?
            .ok_or(CouncilError::ProposalNotFound(*id))
    }

    /// Casts a ballot.
    ///
    /// # Errors
    ///
    /// - `ProposalNotFound` if it does not exist (or already resolved)
    /// - `ProposalClosed` if its deadline has passed
    /// - `NotEligible` if the voter is outside the electorate
    /// - `AlreadyVoted` if the voter already cast either ballot
    pub fn cast(&self, id: &ProposalId, voter: &UserId, ballot: Ballot) -> Result<Tally> {
        let now = self.clock.now();
        let result = self
            .proposals
            .tree()
            .transaction(|tree| cast_in(tree, id, voter, ballot, now));
        let tally = tx::commit(result)?;
        debug!(proposal = %id, voter = %voter, ?ballot, yes = tally.yes, no = tally.no, "ballot cast");
        Ok(tally)
    }

    pub fn cast_yes(&self, id: &ProposalId, voter: &UserId) -> Result<Tally> {
        self.cast(id, voter, Ballot::Yes)
    }

    pub fn cast_no(&self, id: &ProposalId, voter: &UserId) -> Result<Tally> {
        self.cast(id, voter, Ballot::No)
    }

    /// Evaluates a proposal and deletes it if it reached a terminal status.
    ///
    /// This applies no consequence; it is the bare lifecycle step.
    pub fn evaluate(&self, id: &ProposalId) -> Result<Resolution> {
        let now = self.clock.now();
        let resolver = self.resolver;
        let result = self.proposals.tree().transaction(|tree| {
            let proposal = decide_in(tree, id, &resolver, now)?;
            if proposal.status.is_terminal() {
                discard_in(tree, id)?;
            }
            Ok(proposal)
        });
        let proposal = tx::commit(result)?;
        if proposal.status.is_terminal() {
            info!(proposal = %id, status = %proposal.status, "proposal resolved");
        }
        Ok(Resolution {
            status: proposal.status,
            proposal,
        })
    }

    /// Pending proposals, optionally limited to one group, oldest first.
    pub fn list_open(&self, scope: Option<&GroupId>) -> Result<Vec<Proposal>> {
        let mut open = self
            .proposals
            .filter(|p| scope.map_or(true, |s| p.scope == *s))?;
        open.sort_by_key(|p| p.start_time);
        Ok(open)
    }
}
