//! The unified Moot facade.
//!
//! [`Moot`] wires the points ledger, the group directory, the council and
//! the consequence executor over one store and one clock, and implements
//! the operations that span them: stake-gated proposal creation and
//! resolution with consequences.

use crate::{
    config::MootConfig,
    error::MootError,
    executor::ConsequenceExecutor,
    verdict::{SweepReport, Verdict},
    Result,
};

use moot_council::{
    decide_in, discard_in, insert_in, Action, Council, NewProposal, Proposal, Resolver, Tally,
};
use moot_groups::{
    attach_proposal_in, detach_proposal_in, group_in, normalize_word, Departure, GroupDirectory,
    GroupError,
};
use moot_ledger::{debit_in, Account, LedgerError, PointsLedger};
use moot_store::tx::{self, TxResult};
use moot_store::{Store, Transactional};
use moot_types::{Clock, GroupId, ProposalId, SystemClock, UserId};
use std::sync::Arc;

use tracing::{debug, info, warn};

fn lift<T, E>(result: TxResult<T, E>) -> TxResult<T, MootError>
where
    MootError: From<E>,
{
    tx::lift(result)
}

/// The Moot governance facade.
///
/// Moot composes four components:
/// - **Points Ledger**: balances that fund proposals
/// - **Group Directory**: residents, owners and censorship lists
/// - **Council**: proposals, ballots and resolution rules
/// - **Consequence Executor**: applies approved actions
///
/// # Transactions
///
/// Opening a proposal debits the stake, stores the proposal and links it
/// to its group in one transaction over `accounts`, `proposals` and
/// `groups`. Resolving a proposal decides it, applies its consequence and
/// deletes it in one transaction over `proposals`, `groups` and
/// `word_lists`. A failed consequence is recorded in the [`Verdict`] and
/// does not abort the resolution.
///
/// # Example
///
/// ```rust
/// use moot_core::{Action, Moot, MootConfig, Status};
/// use moot_store::Store;
/// use moot_types::{SystemClock, UserId};
/// use std::sync::Arc;
///
/// let moot = Moot::with_store(MootConfig::default(), Store::temporary()?, Arc::new(SystemClock))?;
/// let (alice, bob) = (UserId::new("alice"), UserId::new("bob"));
/// moot.register_user(&alice)?;
/// moot.register_user(&bob)?;
///
/// let group = moot.groups().create_group(&alice)?;
/// moot.groups().invite(&group.id, &alice, &bob)?;
///
/// let proposal = moot.propose(&alice, &group.id, "spam", Action::Censor { word: "spam".into() })?;
/// moot.cast_yes(&proposal.id, &alice)?;
/// moot.cast_yes(&proposal.id, &bob)?;
///
/// assert_eq!(moot.evaluate(&proposal.id)?.status, Status::Approved);
/// assert_eq!(moot.ledger().balance(&alice)?, 0);
/// # Ok::<(), moot_core::MootError>(())
/// ```
pub struct Moot {
    /// Configuration.
    config: MootConfig,

    /// Backing database.
    store: Store,

    /// Points balances and streaks.
    ledger: PointsLedger,

    /// Groups and censorship lists.
    groups: GroupDirectory,

    /// Proposals and ballots.
    council: Council,

    /// Effects of approved proposals.
    executor: ConsequenceExecutor,

    /// Time source for deadlines and logins.
    clock: Arc<dyn Clock>,
}

impl Moot {
    /// Opens the database at `config.store.db_path` and uses the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration is invalid
    /// - The database cannot be opened
    pub fn new(config: MootConfig) -> Result<Self> {
        config.validate()?;
        let store = Store::open(&config.store.db_path)?;
        Self::with_store(config, store, Arc::new(SystemClock))
    }

    /// Builds the facade over an existing store and clock.
    pub fn with_store(config: MootConfig, store: Store, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let ledger = PointsLedger::with_settings(
            &store,
            config.points.initial_balance,
            config.streak_window(),
        )?;
        let groups = GroupDirectory::new(&store)?;
        let resolver = Resolver::with_threshold(config.governance.approval_percent);
        let council = Council::with_resolver(&store, resolver, clock.clone())?;
        let executor = ConsequenceExecutor::new(groups.clone());

        info!(
            stake = config.governance.stake,
            approval_percent = config.governance.approval_percent,
            voting_window_secs = config.governance.voting_window_secs,
            "Moot initialized"
        );

        Ok(Self {
            config,
            store,
            ledger,
            groups,
            council,
            executor,
            clock,
        })
    }

    pub fn config(&self) -> &MootConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn ledger(&self) -> &PointsLedger {
        &self.ledger
    }

    pub fn groups(&self) -> &GroupDirectory {
        &self.groups
    }

    pub fn council(&self) -> &Council {
        &self.council
    }

    pub fn executor(&self) -> &ConsequenceExecutor {
        &self.executor
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// Opens a points account for a new user.
    pub fn register_user(&self, user: &UserId) -> Result<Account> {
        Ok(self.ledger.initialize(user)?)
    }

    /// Removes a user from every group, then deletes their points account.
    ///
    /// Ballots already cast stay counted, and the user stays in the
    /// electorate of proposals opened before the removal.
    pub fn remove_user(&self, user: &UserId) -> Result<Vec<Departure>> {
        let departures = self.groups.remove_user_everywhere(user)?;
        match self.ledger.delete(user) {
            Ok(_) | Err(LedgerError::AccountNotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        info!(user = %user, groups = departures.len(), "user removed");
        Ok(departures)
    }

    /// Updates the user's login streak.
    pub fn record_login(&self, user: &UserId) -> Result<Account> {
        Ok(self.ledger.record_login(user, self.clock.now())?)
    }

    // -------------------------------------------------------------------------
    // Proposals
    // -------------------------------------------------------------------------

    /// Opens a proposal in `scope`, paid for with the initiator's stake.
    ///
    /// The electorate is the group's residents at this moment and the
    /// deadline is one voting window from now.
    ///
    /// # Errors
    ///
    /// - `GroupNotFound` if the group does not exist
    /// - `NotResident` if the initiator does not reside in the group
    /// - `InvalidInput` if a ban targets a non-resident
    /// - `InvalidWord` if a censorship word is blank or not alphanumeric
    /// - `InsufficientFunds` if the initiator cannot pay the stake
    ///
    /// Nothing is debited or stored on error.
    pub fn propose(
        &self,
        initiator: &UserId,
        scope: &GroupId,
        reason: &str,
        action: Action,
    ) -> Result<Proposal> {
        let action = match action {
            Action::Censor { word } => Action::Censor {
                word: normalize_word(&word)?,
            },
            Action::Uncensor { word } => Action::Uncensor {
                word: normalize_word(&word)?,
            },
            other => other,
        };
        let now = self.clock.now();
        let end_time = now + self.config.voting_window();
        let stake = self.config.governance.stake;
        let title = action.title(scope);

        let result = (
            self.ledger.accounts().tree(),
            self.council.collection().tree(),
            self.groups.collection().tree(),
        )
            .transaction(|(accounts, proposals, groups)| -> TxResult<Proposal, MootError> {
                let group = lift(group_in(groups, scope))?;
                if !group.is_resident(initiator) {
                    return tx::abort(
                        GroupError::NotResident {
                            group: *scope,
                            user: initiator.clone(),
                        }
                        .into(),
                    );
                }
                if let Action::Ban { user } = &action {
                    if !group.is_resident(user) {
                        return tx::abort(MootError::InvalidInput(format!(
                            "ban target {user} is not a resident of group {scope}"
                        )));
                    }
                }

                let proposal = Proposal::open(NewProposal {
                    initiator: initiator.clone(),
                    scope: *scope,
                    title: title.clone(),
                    reason: reason.to_string(),
                    electorate: group.residents.iter().cloned().collect(),
                    start_time: now,
                    end_time,
                    action: action.clone(),
                })
                .map_err(MootError::from)
                .or_else(tx::abort)?;

                lift(debit_in(accounts, initiator, stake))?;
                lift(insert_in(proposals, &proposal))?;
                lift(attach_proposal_in(groups, scope, &proposal.id))?;
                Ok(proposal)
            });
        let proposal = tx::commit(result)?;

        info!(
            proposal = %proposal.id,
            scope = %scope,
            initiator = %initiator,
            kind = %proposal.action.kind(),
            electorate = proposal.electorate.len(),
            stake,
            "proposal opened"
        );
        Ok(proposal)
    }

    pub fn cast_yes(&self, id: &ProposalId, voter: &UserId) -> Result<Tally> {
        Ok(self.council.cast_yes(id, voter)?)
    }

    pub fn cast_no(&self, id: &ProposalId, voter: &UserId) -> Result<Tally> {
        Ok(self.council.cast_no(id, voter)?)
    }

    /// Evaluates a proposal and resolves it if it reached a terminal status.
    ///
    /// An approved proposal's consequence is applied before the proposal is
    /// deleted. A consequence that cannot be applied is logged and reported
    /// in [`Verdict::failure`]; the proposal is still resolved.
    ///
    /// # Errors
    ///
    /// `ProposalNotFound` if the proposal does not exist, which includes a
    /// proposal resolved by an earlier call. See
    /// [`MootError::is_already_resolved`].
    pub fn evaluate(&self, id: &ProposalId) -> Result<Verdict> {
        let now = self.clock.now();
        let resolver = *self.council.resolver();

        let result = (
            self.council.collection().tree(),
            self.groups.collection().tree(),
            self.groups.word_lists().collection().tree(),
        )
            .transaction(|(proposals, groups, lists)| -> TxResult<Verdict, MootError> {
                let mut verdict = Verdict::new(lift(decide_in(proposals, id, &resolver, now))?);
                if !verdict.is_resolved() {
                    return Ok(verdict);
                }
                if verdict.is_approved() {
                    let applied = tx::settle::<_, _, MootError>(self.executor.apply_in(
                        groups,
                        lists,
                        &verdict.proposal,
                    ))?;
                    match applied {
                        Ok(consequence) => verdict.consequence = Some(consequence),
                        Err(e) => verdict.failure = Some(e.to_string()),
                    }
                }
                lift(discard_in(proposals, id))?;
                lift(detach_proposal_in(groups, &verdict.proposal.scope, id))?;
                Ok(verdict)
            });
        let verdict = tx::commit(result)?;

        if verdict.is_resolved() {
            info!(proposal = %id, status = %verdict.status, "proposal resolved");
        }
        if let Some(consequence) = &verdict.consequence {
            info!(proposal = %id, ?consequence, "consequence applied");
        }
        if let Some(reason) = &verdict.failure {
            warn!(proposal = %id, scope = %verdict.proposal.scope, %reason, "consequence failed");
        }
        Ok(verdict)
    }

    /// Evaluates every open proposal, optionally limited to one group.
    ///
    /// Proposals resolved concurrently are counted as already resolved.
    pub fn sweep(&self, scope: Option<&GroupId>) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        for proposal in self.council.list_open(scope)? {
            match self.evaluate(&proposal.id) {
                Ok(verdict) => report.record(&verdict),
                Err(e) if e.is_already_resolved() => report.already_resolved.push(proposal.id),
                Err(e) => return Err(e),
            }
        }

        if report.resolved() > 0 {
            info!(
                approved = report.approved.len(),
                expired = report.expired.len(),
                pending = report.pending.len(),
                failures = report.failures.len(),
                "sweep finished"
            );
        } else {
            debug!(pending = report.pending.len(), "sweep finished, nothing resolved");
        }
        Ok(report)
    }

    /// Open proposals after resolving whatever is due.
    pub fn list_open(&self, scope: Option<&GroupId>) -> Result<Vec<Proposal>> {
        self.sweep(scope)?;
        Ok(self.council.list_open(scope)?)
    }

    /// Reads a proposal, resolving it first if it is due.
    ///
    /// Returns `None` if the proposal is unknown or has resolved.
    pub fn proposal(&self, id: &ProposalId) -> Result<Option<Proposal>> {
        match self.evaluate(id) {
            Ok(verdict) if !verdict.is_resolved() => Ok(Some(verdict.proposal)),
            Ok(_) => Ok(None),
            Err(e) if e.is_already_resolved() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for Moot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Moot")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use moot_council::{CouncilError, Status};
    use moot_types::ManualClock;

    fn moot() -> (Moot, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let moot = Moot::with_store(MootConfig::default(), Store::temporary().unwrap(), clock.clone())
            .unwrap();
        (moot, clock)
    }

    fn user(name: &str) -> UserId {
        UserId::new(name)
    }

    fn group_of(moot: &Moot, names: &[&str]) -> GroupId {
        for name in names {
            moot.register_user(&user(name)).unwrap();
        }
        let group = moot.groups().create_group(&user(names[0])).unwrap();
        for name in &names[1..] {
            moot.groups().invite(&group.id, &user(names[0]), &user(name)).unwrap();
        }
        group.id
    }

    #[test]
    fn test_moot_creation() {
        let (moot, _clock) = moot();
        assert_eq!(moot.config().governance.stake, 100);
        assert_eq!(moot.council().resolver().threshold(), 51);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = MootConfig::default();
        config.governance.approval_percent = 0;
        let err = Moot::with_store(config, Store::temporary().unwrap(), Arc::new(SystemClock)).unwrap_err();
        assert!(matches!(err, MootError::Config(_)));
    }

    #[test]
    fn test_propose_links_group_and_debits() {
        let (moot, clock) = moot();
        let scope = group_of(&moot, &["a", "b"]);

        let proposal = moot
            .propose(&user("a"), &scope, "", Action::Censor { word: " Heck ".into() })
            .unwrap();

        assert_eq!(proposal.action, Action::Censor { word: "heck".into() });
        assert_eq!(proposal.title, "Censor word: heck");
        assert_eq!(proposal.end_time, clock.now() + Duration::days(1));
        assert_eq!(moot.ledger().balance(&user("a")).unwrap(), 0);
        assert!(moot.groups().group(&scope).unwrap().proposals.contains(&proposal.id));
    }

    #[test]
    fn test_propose_requires_resident() {
        let (moot, _clock) = moot();
        let scope = group_of(&moot, &["a"]);
        moot.register_user(&user("x")).unwrap();

        let err = moot.propose(&user("x"), &scope, "", Action::DeleteGroup).unwrap_err();
        assert!(matches!(err, MootError::Groups(GroupError::NotResident { .. })));
        assert_eq!(moot.ledger().balance(&user("x")).unwrap(), 100);
    }

    #[test]
    fn test_propose_ban_target_must_reside() {
        let (moot, _clock) = moot();
        let scope = group_of(&moot, &["a"]);

        let err = moot
            .propose(&user("a"), &scope, "", Action::Ban { user: user("ghost") })
            .unwrap_err();
        assert!(matches!(err, MootError::InvalidInput(_)));
        assert_eq!(moot.ledger().balance(&user("a")).unwrap(), 100);
    }

    #[test]
    fn test_propose_rejects_bad_word() {
        let (moot, _clock) = moot();
        let scope = group_of(&moot, &["a"]);
        let err = moot
            .propose(&user("a"), &scope, "", Action::Censor { word: "two words".into() })
            .unwrap_err();
        assert!(matches!(err, MootError::Groups(GroupError::InvalidWord(_))));
    }

    #[test]
    fn test_evaluate_detaches_proposal() {
        let (moot, _clock) = moot();
        let scope = group_of(&moot, &["a"]);
        let proposal = moot
            .propose(&user("a"), &scope, "", Action::Censor { word: "heck".into() })
            .unwrap();
        moot.cast_yes(&proposal.id, &user("a")).unwrap();

        let verdict = moot.evaluate(&proposal.id).unwrap();

        assert!(verdict.is_approved());
        assert!(!verdict.consequence_failed());
        assert!(moot.groups().group(&scope).unwrap().proposals.is_empty());
    }

    #[test]
    fn test_failed_consequence_still_resolves() {
        let (moot, _clock) = moot();
        let scope = group_of(&moot, &["a"]);
        let proposal = moot
            .propose(&user("a"), &scope, "", Action::Uncensor { word: "heck".into() })
            .unwrap();
        moot.cast_yes(&proposal.id, &user("a")).unwrap();

        let verdict = moot.evaluate(&proposal.id).unwrap();

        assert_eq!(verdict.status, Status::Approved);
        assert!(verdict.consequence.is_none());
        assert!(verdict.failure.as_deref().unwrap().contains("heck"));
        assert!(matches!(
            moot.evaluate(&proposal.id),
            Err(MootError::Council(CouncilError::ProposalNotFound(_)))
        ));
    }

    #[test]
    fn test_lazy_read_resolves() {
        let (moot, clock) = moot();
        let scope = group_of(&moot, &["a", "b"]);
        let proposal = moot.propose(&user("a"), &scope, "", Action::DeleteGroup).unwrap();

        assert!(moot.proposal(&proposal.id).unwrap().is_some());
        clock.advance(Duration::days(1) + Duration::seconds(1));
        assert!(moot.proposal(&proposal.id).unwrap().is_none());
        assert!(moot.groups().group(&scope).is_ok());
    }

    #[test]
    fn test_remove_user() {
        let (moot, _clock) = moot();
        let scope = group_of(&moot, &["a", "b"]);

        let departures = moot.remove_user(&user("a")).unwrap();

        assert_eq!(departures.len(), 1);
        assert_eq!(moot.groups().owner(&scope).unwrap(), user("b"));
        assert!(matches!(
            moot.ledger().account(&user("a")),
            Err(LedgerError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_record_login_uses_clock() {
        let (moot, clock) = moot();
        moot.register_user(&user("a")).unwrap();

        moot.record_login(&user("a")).unwrap();
        clock.advance(Duration::hours(2));
        let account = moot.record_login(&user("a")).unwrap();

        assert_eq!(account.streak, 2);
        assert_eq!(account.last_login, Some(clock.now()));
    }
}
