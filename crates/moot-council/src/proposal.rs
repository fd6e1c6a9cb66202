//! Proposals and the actions they request.

use crate::error::CouncilError;
use crate::Result;
use chrono::{DateTime, Utc};
use moot_types::{GroupId, ProposalId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Kind of group action a proposal requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Ban,
    Censor,
    Uncensor,
    DeleteGroup,
}

impl FromStr for ActionKind {
    type Err = CouncilError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ban" => Ok(ActionKind::Ban),
            "censor" => Ok(ActionKind::Censor),
            "uncensor" => Ok(ActionKind::Uncensor),
            "delete" | "delete-group" | "delete_group" | "deletegroup" => Ok(ActionKind::DeleteGroup),
            other => Err(CouncilError::InvalidAction(format!("unknown action kind '{other}'"))),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Ban => "ban",
            ActionKind::Censor => "censor",
            ActionKind::Uncensor => "uncensor",
            ActionKind::DeleteGroup => "delete-group",
        };
        f.write_str(name)
    }
}

/// The action a proposal requests, with its target.
///
/// The target type is fixed by the kind: a user for `Ban`, a word for
/// `Censor`/`Uncensor`, and the proposal's own scope for `DeleteGroup`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Ban { user: UserId },
    Censor { word: String },
    Uncensor { word: String },
    DeleteGroup,
}

impl Action {
    /// Builds an action from a kind name and a raw target.
    ///
    /// # Errors
    ///
    /// `InvalidAction` if the kind is unknown, or the target is missing or
    /// blank for a kind that needs one.
    pub fn parse(kind: &str, target: Option<&str>) -> Result<Self> {
        let kind: ActionKind = kind.parse()?;
        let target = target.map(str::trim).filter(|t| !t.is_empty());

        let missing = || CouncilError::InvalidAction(format!("{kind} requires a target"));
        match kind {
            ActionKind::Ban => Ok(Action::Ban {
                user: UserId::new(target.ok_or_else(missing)?),
            }),
            ActionKind::Censor => Ok(Action::Censor {
                word: target.ok_or_else(missing)?.to_string(),
            }),
            ActionKind::Uncensor => Ok(Action::Uncensor {
                word: target.ok_or_else(missing)?.to_string(),
            }),
            ActionKind::DeleteGroup => Ok(Action::DeleteGroup),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Ban { .. } => ActionKind::Ban,
            Action::Censor { .. } => ActionKind::Censor,
            Action::Uncensor { .. } => ActionKind::Uncensor,
            Action::DeleteGroup => ActionKind::DeleteGroup,
        }
    }

    /// Human-readable title for a proposal in `scope`.
    pub fn title(&self, scope: &GroupId) -> String {
        match self {
            Action::Ban { user } => format!("Ban user {user}"),
            Action::Censor { word } => format!("Censor word: {word}"),
            Action::Uncensor { word } => format!("Uncensor word: {word}"),
            Action::DeleteGroup => format!("Delete group {scope}"),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Action::Ban { user } if user.as_str().trim().is_empty() => {
                Err(CouncilError::InvalidAction("ban target is blank".to_string()))
            }
            Action::Censor { word } | Action::Uncensor { word } if word.trim().is_empty() => {
                Err(CouncilError::InvalidAction(format!("{} word is blank", self.kind())))
            }
            _ => Ok(()),
        }
    }
}

/// Lifecycle state of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Collecting ballots.
    Pending,
    /// Reached the approval threshold before the deadline.
    Approved,
    /// Actively rejected. The resolver never produces this: a proposal that
    /// fails to reach approval expires at its deadline instead.
    Rejected,
    /// The deadline passed first.
    Expired,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Pending)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Pending => "Pending",
            Status::Approved => "Approved",
            Status::Rejected => "Rejected",
            Status::Expired => "Expired",
        };
        f.write_str(name)
    }
}

/// Everything needed to open a proposal.
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub initiator: UserId,
    pub scope: GroupId,
    pub title: String,
    pub reason: String,
    /// Eligible voters, fixed for the proposal's lifetime.
    pub electorate: HashSet<UserId>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub action: Action,
}

/// A stake-funded request for a group action.
///
/// `yes` and `no` are disjoint subsets of `electorate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub initiator: UserId,
    pub scope: GroupId,
    pub title: String,
    pub reason: String,
    pub action: Action,
    pub electorate: HashSet<UserId>,
    pub yes: HashSet<UserId>,
    pub no: HashSet<UserId>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: Status,
}

impl Proposal {
    /// Validates a draft and opens it as a pending proposal with no ballots.
    ///
    /// # Errors
    ///
    /// `InvalidProposal` if the deadline is not after the start or the
    /// electorate is empty; `InvalidAction` if the target is blank.
    pub fn open(draft: NewProposal) -> Result<Self> {
        if draft.end_time <= draft.start_time {
            return Err(CouncilError::InvalidProposal(format!(
                "end time {} is not after start time {}",
                draft.end_time, draft.start_time
            )));
        }
        if draft.electorate.is_empty() {
            return Err(CouncilError::InvalidProposal("electorate is empty".to_string()));
        }
        draft.action.validate()?;

        Ok(Self {
            id: ProposalId::generate(),
            initiator: draft.initiator,
            scope: draft.scope,
            title: draft.title,
            reason: draft.reason,
            action: draft.action,
            electorate: draft.electorate,
            yes: HashSet::new(),
            no: HashSet::new(),
            start_time: draft.start_time,
            end_time: draft.end_time,
            status: Status::Pending,
        })
    }

    pub fn is_eligible(&self, voter: &UserId) -> bool {
        self.electorate.contains(voter)
    }

    pub fn has_voted(&self, voter: &UserId) -> bool {
        self.yes.contains(voter) || self.no.contains(voter)
    }

    /// Whether the deadline has passed at `now`.
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        now > self.end_time
    }
}
