//! # Points Ledger
//!
//! Per-user balances backed by the `accounts` collection. Every balance
//! change is a sled transaction, so concurrent debits cannot overdraw an
//! account and a transfer is never visible half-applied.
//!
//! The transactional building blocks ([`debit_in`], [`credit_in`]) are
//! public so the governance facade can debit a proposal stake in the same
//! transaction that records the proposal.

use crate::account::{Account, DEFAULT_BALANCE};
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Duration, Utc};
use moot_store::tx::{self, TxResult};
use moot_store::{Collection, Store, StoreError, TransactionalTree};
use moot_types::UserId;
use tracing::{debug, info};

/// Collection name for points accounts.
pub const ACCOUNTS: &str = "accounts";

/// Debits `amount` from `user` inside a transaction.
///
/// A zero amount succeeds without writing.
pub fn debit_in(tree: &TransactionalTree, user: &UserId, amount: u64) -> TxResult<Account, LedgerError> {
    let Some(mut account) = tx::get::<Account, _, LedgerError>(tree, user)? else {
        return tx::abort(LedgerError::AccountNotFound(user.clone()));
    };
    if amount == 0 {
        return Ok(account);
    }
    if !account.can_afford(amount) {
        return tx::abort(LedgerError::InsufficientFunds {
            user: user.clone(),
            balance: account.balance,
            requested: amount,
        });
    }
    account.balance -= amount;
    tx::put(tree, user, &account)?;
    Ok(account)
}

/// Credits `amount` to `user` inside a transaction.
pub fn credit_in(tree: &TransactionalTree, user: &UserId, amount: u64) -> TxResult<Account, LedgerError> {
    let Some(mut account) = tx::get::<Account, _, LedgerError>(tree, user)? else {
        return tx::abort(LedgerError::AccountNotFound(user.clone()));
    };
    account.balance = account.balance.saturating_add(amount);
    tx::put(tree, user, &account)?;
    Ok(account)
}

/// The points ledger.
///
/// # Example
///
/// ```rust
/// use moot_ledger::PointsLedger;
/// use moot_store::Store;
/// use moot_types::UserId;
///
/// let store = Store::temporary().unwrap();
/// let ledger = PointsLedger::new(&store).unwrap();
/// let alice = UserId::new("alice");
///
/// ledger.initialize(&alice).unwrap();
/// let account = ledger.debit(&alice, 30).unwrap();
/// assert_eq!(account.balance, 70);
/// ```
#[derive(Debug, Clone)]
pub struct PointsLedger {
    accounts: Collection<Account>,
    initial_balance: u64,
    streak_window: Duration,
}

impl PointsLedger {
    /// Opens the ledger with a 100-point opening balance and a 24h streak window.
    pub fn new(store: &Store) -> Result<Self> {
        Self::with_settings(store, DEFAULT_BALANCE, Duration::days(1))
    }

    /// Opens the ledger with explicit settings.
    pub fn with_settings(store: &Store, initial_balance: u64, streak_window: Duration) -> Result<Self> {
        Ok(Self {
            accounts: store.collection(ACCOUNTS)?,
            initial_balance,
            streak_window,
        })
    }

    /// The backing collection, for multi-tree transactions.
    pub fn accounts(&self) -> &Collection<Account> {
        &self.accounts
    }

    /// Creates an account with the configured opening balance and no streak.
    ///
    /// # Errors
    ///
    /// `AccountExists` if the user already has an account.
    pub fn initialize(&self, user: &UserId) -> Result<Account> {
        self.initialize_with(user, self.initial_balance, 0)
    }

    /// Creates an account with an explicit opening balance and streak.
    pub fn initialize_with(&self, user: &UserId, balance: u64, streak: u32) -> Result<Account> {
        let account = Account::new(user.clone(), balance, streak);
        self.accounts
            .insert_new(user, &account)
            .map_err(|e| match e {
                StoreError::Duplicate { .. } => LedgerError::AccountExists(user.clone()),
                other => LedgerError::Store(other),
            })?;
        info!(user = %user, balance, "points account initialized");
        Ok(account)
    }

    /// Loads an account.
    pub fn account(&self, user: &UserId) -> Result<Account> {
        self.accounts
            .get(user)?
            .ok_or_else(|| LedgerError::AccountNotFound(user.clone()))
    }

    /// Current balance.
    pub fn balance(&self, user: &UserId) -> Result<u64> {
        Ok(self.account(user)?.balance)
    }

    /// Removes `amount` points.
    ///
    /// # Errors
    ///
    /// `InsufficientFunds` if `amount` exceeds the balance; the balance is
    /// left untouched.
    pub fn debit(&self, user: &UserId, amount: u64) -> Result<Account> {
        let result = self.accounts.tree().transaction(|tree| debit_in(tree, user, amount));
        let account = tx::commit(result)?;
        debug!(user = %user, amount, balance = account.balance, "debit");
        Ok(account)
    }

    /// Adds `amount` points.
    pub fn credit(&self, user: &UserId, amount: u64) -> Result<Account> {
        let result = self.accounts.tree().transaction(|tree| credit_in(tree, user, amount));
        let account = tx::commit(result)?;
        debug!(user = %user, amount, balance = account.balance, "credit");
        Ok(account)
    }

    /// Applies a signed change: positive credits, negative debits.
    pub fn adjust(&self, user: &UserId, delta: i64) -> Result<Account> {
        if delta >= 0 {
            self.credit(user, delta.unsigned_abs())
        } else {
            self.debit(user, delta.unsigned_abs())
        }
    }

    /// Moves `amount` points from `sender` to `receiver` atomically.
    ///
    /// Both accounts are checked before anything is written, and a reader
    /// never sees the debit without the credit.
    pub fn transfer(&self, sender: &UserId, receiver: &UserId, amount: u64) -> Result<(Account, Account)> {
        let result = self.accounts.tree().transaction(|tree| {
            if tx::get::<Account, _, LedgerError>(tree, receiver)?.is_none() {
                return tx::abort(LedgerError::AccountNotFound(receiver.clone()));
            }
            let from = debit_in(tree, sender, amount)?;
            let to = credit_in(tree, receiver, amount)?;
            let from = if sender == receiver { to.clone() } else { from };
            Ok((from, to))
        });
        let (from, to) = tx::commit(result)?;
        info!(from = %sender, to = %receiver, amount, "points transferred");
        Ok((from, to))
    }

    /// Adds one to the login streak.
    pub fn bump_streak(&self, user: &UserId) -> Result<Account> {
        self.accounts
            .modify(user, |account: &mut Account| -> Result<Account> {
                account.streak = account.streak.saturating_add(1);
                Ok(account.clone())
            })?
            .ok_or_else(|| LedgerError::AccountNotFound(user.clone()))
    }

    /// Zeroes the login streak.
    pub fn reset_streak(&self, user: &UserId) -> Result<Account> {
        self.accounts
            .modify(user, |account: &mut Account| -> Result<Account> {
                account.streak = 0;
                Ok(account.clone())
            })?
            .ok_or_else(|| LedgerError::AccountNotFound(user.clone()))
    }

    /// Records a login at `now`.
    ///
    /// The streak grows if the previous login falls within the streak
    /// window and resets otherwise. A first login starts the streak at one.
    pub fn record_login(&self, user: &UserId, now: DateTime<Utc>) -> Result<Account> {
        let window = self.streak_window;
        let account = self
            .accounts
            .modify(user, |account: &mut Account| -> Result<Account> {
                match account.last_login {
                    Some(last) if now - last > window => account.streak = 0,
                    _ => account.streak = account.streak.saturating_add(1),
                }
                account.last_login = Some(now);
                Ok(account.clone())
            })?
            .ok_or_else(|| LedgerError::AccountNotFound(user.clone()))?;
        debug!(user = %user, streak = account.streak, "login recorded");
        Ok(account)
    }

    /// Deletes an account, returning its final state.
    pub fn delete(&self, user: &UserId) -> Result<Account> {
        let account = self
            .accounts
            .remove(user)?
            .ok_or_else(|| LedgerError::AccountNotFound(user.clone()))?;
        info!(user = %user, "points account deleted");
        Ok(account)
    }
}
