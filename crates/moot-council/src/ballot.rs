//! Ballot box: casting rules and running tallies.
//!
//! Approval is measured against the whole electorate, not against ballots
//! cast, so every abstention counts against the proposal.

use crate::error::CouncilError;
use crate::proposal::Proposal;
use crate::Result;
use chrono::{DateTime, Utc};
use moot_types::UserId;
use serde::{Deserialize, Serialize};

/// A voter's choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ballot {
    Yes,
    No,
}

/// Running count of ballots on one proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// Number of yes ballots.
    pub yes: usize,
    /// Number of no ballots.
    pub no: usize,
    /// Size of the electorate (the denominator for approval).
    pub electorate: usize,
}

impl Tally {
    /// Counts the ballots on a proposal.
    pub fn of(proposal: &Proposal) -> Self {
        Self {
            yes: proposal.yes.len(),
            no: proposal.no.len(),
            electorate: proposal.electorate.len(),
        }
    }

    /// Eligible voters who have not voted yet.
    pub fn abstentions(&self) -> usize {
        self.electorate.saturating_sub(self.yes + self.no)
    }

    /// Yes ballots as a fraction of the electorate.
    pub fn approval_ratio(&self) -> f64 {
        if self.electorate == 0 {
            0.0
        } else {
            self.yes as f64 / self.electorate as f64
        }
    }

    /// Whether yes ballots reach `percent` of the electorate.
    ///
    /// Integer arithmetic: `yes * 100 >= percent * electorate`.
    pub fn reaches(&self, percent: u8) -> bool {
        self.electorate > 0 && self.yes * 100 >= usize::from(percent) * self.electorate
    }
}

/// Records `voter`'s ballot on a pending proposal.
///
/// Checks run in order: the proposal must still be open at `now`, the voter
/// must belong to the electorate, and must not have voted on either side.
pub fn cast(proposal: &mut Proposal, voter: &UserId, ballot: Ballot, now: DateTime<Utc>) -> Result<Tally> {
    if proposal.status.is_terminal() || proposal.is_past_deadline(now) {
        return Err(CouncilError::ProposalClosed(proposal.id));
    }
    if !proposal.is_eligible(voter) {
        return Err(CouncilError::NotEligible {
            proposal: proposal.id,
            voter: voter.clone(),
        });
    }
    if proposal.has_voted(voter) {
        return Err(CouncilError::AlreadyVoted {
            proposal: proposal.id,
            voter: voter.clone(),
        });
    }

    match ballot {
        Ballot::Yes => proposal.yes.insert(voter.clone()),
        Ballot::No => proposal.no.insert(voter.clone()),
    };
    Ok(Tally::of(proposal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::{Action, Status};
    use crate::testing::draft;
    use chrono::Duration;

    fn proposal(voters: &[&str]) -> Proposal {
        Proposal::open(draft(voters, Action::DeleteGroup)).unwrap()
    }

    fn user(name: &str) -> UserId {
        UserId::new(name)
    }

    #[test]
    fn test_cast_yes_and_no() {
        let mut p = proposal(&["a", "b", "c"]);
        let now = p.start_time;

        cast(&mut p, &user("a"), Ballot::Yes, now).unwrap();
        let tally = cast(&mut p, &user("b"), Ballot::No, now).unwrap();

        assert_eq!(tally, Tally { yes: 1, no: 1, electorate: 3 });
        assert_eq!(tally.abstentions(), 1);
    }

    #[test]
    fn test_cast_not_eligible() {
        let mut p = proposal(&["a"]);
        let now = p.start_time;
        let err = cast(&mut p, &user("z"), Ballot::Yes, now).unwrap_err();
        assert!(matches!(err, CouncilError::NotEligible { .. }));
        assert!(p.yes.is_empty());
    }

    #[test]
    fn test_cast_twice_either_side() {
        let mut p = proposal(&["a", "b"]);
        let now = p.start_time;

        cast(&mut p, &user("a"), Ballot::Yes, now).unwrap();
        assert!(matches!(
            cast(&mut p, &user("a"), Ballot::Yes, now),
            Err(CouncilError::AlreadyVoted { .. })
        ));
        assert!(matches!(
            cast(&mut p, &user("a"), Ballot::No, now),
            Err(CouncilError::AlreadyVoted { .. })
        ));

        cast(&mut p, &user("b"), Ballot::No, now).unwrap();
        assert!(matches!(
            cast(&mut p, &user("b"), Ballot::Yes, now),
            Err(CouncilError::AlreadyVoted { .. })
        ));
        assert!(p.yes.is_disjoint(&p.no));
    }

    #[test]
    fn test_cast_after_deadline() {
        let mut p = proposal(&["a"]);
        let late = p.end_time + Duration::seconds(1);
        assert!(matches!(
            cast(&mut p, &user("a"), Ballot::Yes, late),
            Err(CouncilError::ProposalClosed(_))
        ));
    }

    #[test]
    fn test_cast_on_terminal_proposal() {
        let mut p = proposal(&["a"]);
        p.status = Status::Approved;
        let now = p.start_time;
        assert!(matches!(
            cast(&mut p, &user("a"), Ballot::Yes, now),
            Err(CouncilError::ProposalClosed(_))
        ));
    }

    #[test]
    fn test_tally_reaches_threshold() {
        assert!(!Tally { yes: 2, no: 0, electorate: 4 }.reaches(51));
        assert!(Tally { yes: 3, no: 0, electorate: 4 }.reaches(51));
        assert!(!Tally { yes: 1, no: 0, electorate: 2 }.reaches(51));
        assert!(Tally { yes: 1, no: 0, electorate: 1 }.reaches(51));
        assert!(!Tally { yes: 0, no: 0, electorate: 0 }.reaches(51));
    }

    #[test]
    fn test_abstentions_count_against() {
        // Same ballots, larger electorate.
        assert!(Tally { yes: 2, no: 0, electorate: 3 }.reaches(51));
        assert!(!Tally { yes: 2, no: 0, electorate: 5 }.reaches(51));
    }

    #[test]
    fn test_approval_ratio() {
        let tally = Tally { yes: 3, no: 1, electorate: 4 };
        assert!((tally.approval_ratio() - 0.75).abs() < f64::EPSILON);
    }
}
