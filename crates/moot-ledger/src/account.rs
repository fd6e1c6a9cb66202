//! Points account record.

use chrono::{DateTime, Utc};
use moot_types::UserId;
use serde::{Deserialize, Serialize};

/// Opening balance of a new account.
pub const DEFAULT_BALANCE: u64 = 100;

/// A user's points balance and login streak.
///
/// The balance is unsigned, so it can never be negative; debits that would
/// overdraw are refused before they are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account holder.
    pub user: UserId,
    /// Spendable points.
    pub balance: u64,
    /// Consecutive daily logins.
    pub streak: u32,
    /// Last recorded login, if any.
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(user: UserId, balance: u64, streak: u32) -> Self {
        Self {
            user,
            balance,
            streak,
            last_login: None,
        }
    }

    /// Whether `amount` can be debited.
    pub fn can_afford(&self, amount: u64) -> bool {
        amount <= self.balance
    }
}
