//! # Points Ledger
//!
//! Per-user point balances and login streaks. Points are the currency of
//! governance: opening a proposal costs a fixed stake that is debited here
//! and never refunded.
//!
//! ## Guarantees
//!
//! - Balances are unsigned and debits are checked before they apply, so no
//!   sequence of debit / credit / transfer can make a balance negative.
//! - Every mutation is a sled transaction on the `accounts` tree.
//! - A transfer debits and credits in one transaction.
//!
//! ## Quick Start
//!
//! ```rust
//! use moot_ledger::PointsLedger;
//! use moot_store::Store;
//! use moot_types::UserId;
//!
//! let store = Store::temporary()?;
//! let ledger = PointsLedger::new(&store)?;
//!
//! let (alice, bob) = (UserId::new("alice"), UserId::new("bob"));
//! ledger.initialize(&alice)?;
//! ledger.initialize(&bob)?;
//! ledger.transfer(&alice, &bob, 25)?;
//!
//! assert_eq!(ledger.balance(&bob)?, 125);
//! # Ok::<(), moot_ledger::LedgerError>(())
//! ```

mod account;
mod error;
mod ledger;

pub use account::{Account, DEFAULT_BALANCE};
pub use error::{LedgerError, Result};
pub use ledger::{credit_in, debit_in, PointsLedger, ACCOUNTS};
