//! Vote resolver: decides when a pending proposal becomes terminal.
//!
//! ```text
//!                 now > end_time
//!   ┌─────────┐ ─────────────────▶ ┌─────────┐
//!   │ Pending │                    │ Expired │
//!   └────┬────┘                    └─────────┘
//!        │ yes / electorate >= threshold
//!        ▼
//!   ┌──────────┐
//!   │ Approved │
//!   └──────────┘
//! ```
//!
//! The deadline is checked first: a proposal that has enough yes ballots
//! but is evaluated after its deadline expires. There is no early
//! rejection, even when approval has become arithmetically impossible.

use crate::ballot::Tally;
use crate::proposal::{Proposal, Status};
use chrono::{DateTime, Utc};

/// Default approval threshold, in percent of the electorate.
pub const DEFAULT_APPROVAL_PERCENT: u8 = 51;

/// Resolution rules for proposals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    /// Percent of the electorate that must vote yes.
    approval_percent: u8,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Creates a resolver requiring 51% of the electorate.
    pub fn new() -> Self {
        Self {
            approval_percent: DEFAULT_APPROVAL_PERCENT,
        }
    }

    /// Creates a resolver with a custom threshold.
    ///
    /// # Arguments
    /// * `approval_percent` - Percent of the electorate (1 to 100)
    pub fn with_threshold(approval_percent: u8) -> Self {
        assert!(
            (1..=100).contains(&approval_percent),
            "Threshold must be between 1 and 100 percent"
        );
        Self { approval_percent }
    }

    /// Returns the approval threshold in percent.
    pub fn threshold(&self) -> u8 {
        self.approval_percent
    }

    /// Decides the status of `proposal` at `now`.
    pub fn decide(&self, proposal: &Proposal, now: DateTime<Utc>) -> Status {
        if proposal.is_past_deadline(now) {
            return Status::Expired;
        }
        if Tally::of(proposal).reaches(self.approval_percent) {
            return Status::Approved;
        }
        Status::Pending
    }
}
