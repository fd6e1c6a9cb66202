//! Verdict types for proposal evaluations and sweeps.

use crate::executor::Consequence;
use moot_council::{Proposal, Status};
use moot_types::ProposalId;
use serde::{Deserialize, Serialize};

/// The result of evaluating one proposal.
///
/// - `Pending`: still open, nothing changed
/// - `Expired`: deadline passed, proposal deleted, no effect applied
/// - `Approved`: proposal deleted after its consequence was attempted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: Status,

    /// Snapshot with `status` applied. For a resolved proposal this is the
    /// last state before deletion.
    pub proposal: Proposal,

    /// The applied effect, for an approved proposal whose effect succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consequence: Option<Consequence>,

    /// Why the effect of an approved proposal could not be applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl Verdict {
    pub(crate) fn new(proposal: Proposal) -> Self {
        Self {
            status: proposal.status,
            proposal,
            consequence: None,
            failure: None,
        }
    }

    /// Returns true if the proposal reached a terminal status.
    pub fn is_resolved(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns true if the proposal was approved.
    pub fn is_approved(&self) -> bool {
        self.status == Status::Approved
    }

    /// Returns true if the proposal was approved but its effect failed.
    pub fn consequence_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// A consequence that could not be applied during a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsequenceFailure {
    pub proposal: ProposalId,
    pub reason: String,
}

/// Summary of one sweep over open proposals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Proposals approved during this sweep.
    pub approved: Vec<ProposalId>,
    /// Proposals that expired during this sweep.
    pub expired: Vec<ProposalId>,
    /// Proposals still open.
    pub pending: Vec<ProposalId>,
    /// Proposals resolved by a concurrent caller before this sweep got to them.
    pub already_resolved: Vec<ProposalId>,
    /// Approved proposals whose effect failed.
    pub failures: Vec<ConsequenceFailure>,
}

impl SweepReport {
    pub(crate) fn record(&mut self, verdict: &Verdict) {
        let id = verdict.proposal.id;
        match verdict.status {
            Status::Approved => self.approved.push(id),
            Status::Expired | Status::Rejected => self.expired.push(id),
            Status::Pending => self.pending.push(id),
        }
        if let Some(reason) = &verdict.failure {
            self.failures.push(ConsequenceFailure {
                proposal: id,
                reason: reason.clone(),
            });
        }
    }

    /// Number of proposals resolved by this sweep.
    pub fn resolved(&self) -> usize {
        self.approved.len() + self.expired.len()
    }

    /// Number of proposals looked at.
    pub fn total(&self) -> usize {
        self.resolved() + self.pending.len() + self.already_resolved.len()
    }
}
