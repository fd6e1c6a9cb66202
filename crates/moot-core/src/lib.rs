//! # Moot Core
//!
//! Stake-gated group governance. A resident spends points to open a
//! proposal against their group; the group's residents vote; an approved
//! proposal bans a resident, edits the group's censorship list or deletes
//! the group.
//!
//! ## Components
//!
//! | Component | Crate | Role |
//! |-----------|-------|------|
//! | Points Ledger | `moot-ledger` | balances debited for the stake |
//! | Group Directory | `moot-groups` | residents (the electorate source) and censorship lists |
//! | Council | `moot-council` | proposals, ballots, deadline-first resolution |
//! | Consequence Executor | this crate | applies approved actions |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          MOOT CORE                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │                    ┌─────────────────┐                          │
//! │                    │      Moot       │  ← Unified Facade        │
//! │                    └────────┬────────┘                          │
//! │                             │                                   │
//! │      ┌───────────────┬──────┴────────┬───────────────┐          │
//! │      ▼               ▼               ▼               ▼          │
//! │ ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌─────────────┐    │
//! │ │  Points  │   │  Group   │   │ Council  │   │ Consequence │    │
//! │ │  Ledger  │   │Directory │   │          │   │  Executor   │    │
//! │ └──────────┘   └──────────┘   └──────────┘   └─────────────┘    │
//! │                                                                 │
//! └──────────────────────────── sled ───────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use moot_core::{Action, Moot, MootConfig};
//!
//! let moot = Moot::new(MootConfig::load("config/moot.toml")?)?;
//!
//! let proposal = moot.propose(&alice, &group, "spamming", Action::Ban { user: dave })?;
//! moot.cast_yes(&proposal.id, &bob)?;
//!
//! // on demand, or periodically
//! let report = moot.sweep(Some(&group))?;
//! ```
//!
//! ## Guarantees
//!
//! - A failed stake debit prevents proposal creation; nothing is stored
//! - The deadline is checked before the threshold
//! - A resolved proposal is gone: evaluating it again is `NotFound`
//! - A consequence failure is logged and never aborts a resolution or a sweep

mod config;
mod error;
mod executor;
mod moot;
mod verdict;

pub use config::{GovernanceConfig, LogConfig, MootConfig, PointsConfig, StoreConfig};
pub use error::MootError;
pub use executor::{Consequence, ConsequenceExecutor};
pub use moot::Moot;
pub use verdict::{ConsequenceFailure, SweepReport, Verdict};

// Re-export component types for convenience
pub use moot_council::{Action, ActionKind, Ballot, Proposal, Status, Tally};
pub use moot_groups::{Departure, Group, GroupDirectory};
pub use moot_ledger::{Account, PointsLedger};
pub use moot_types::{Clock, ErrorKind, GroupId, ManualClock, ProposalId, SystemClock, UserId};

/// Core result type for governance operations.
pub type Result<T> = std::result::Result<T, MootError>;
