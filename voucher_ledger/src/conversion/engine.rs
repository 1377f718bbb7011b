//! The conversion engine.
//!
//! ```plain
//! Voucher lifecycle:
//!
//!            lock_and_create_voucher
//!   NONE ─────────────────────────────► LOCKED
//!                                         │
//!                      withdraw ┌─────────┴─────────┐ cancel
//!                               ▼                   ▼
//!                           REDEEMED            CANCELLED
//!                         (deleted)            (deleted)
//! ```
//!
//! Every operation validates before it writes. Recoverable failures return a
//! [`ConverterError`] with the state and ledger untouched; invariant violations abort through
//! [`fatal`]. Within an operation custody is funded before a voucher is created, and a
//! voucher is deleted only after every payout has been issued.

use alloy_primitives::U256;
use candid::Principal;
use icrc_ledger_types::icrc1::account::Account;

use crate::{
    config::ConverterConfig,
    constants::scale,
    genesis::GenesisState,
    journal::{Journal, JournalEntry, LogType},
    ledger::{Clock, Ledger},
    state::ConverterState,
    strategy::{Strategy, StrategyInput, StrategyQuery},
    types::{LockOutcome, WithdrawOutcome},
    utils::{
        common::only_admin,
        error::{fatal, ConverterError, ConverterResult, InvariantViolation},
    },
    voucher::{Voucher, VoucherQuery},
};

use super::{
    custody::{
        burn_from_custody, check_custody_invariant, ensure_custody_covers, mint_into_custody,
        pay_out, pull_into_custody,
    },
    release::{compute_release, convert_amount, ReleaseQuoteQuery},
};

pub struct ConversionEngine<L: Ledger, C: Clock> {
    config: ConverterConfig,
    state: ConverterState,
    ledger: L,
    clock: C,
    journal: Journal,
}

impl<L: Ledger, C: Clock> ConversionEngine<L, C> {
    pub fn new(config: ConverterConfig, state: ConverterState, ledger: L, clock: C) -> Self {
        let journal = Journal::new(config.journal_retention);
        Self {
            config,
            state,
            ledger,
            clock,
            journal,
        }
    }

    /// Builds an engine from an imported genesis document. Nothing is built if the document is
    /// rejected.
    pub fn from_genesis(
        config: ConverterConfig,
        genesis: GenesisState,
        ledger: L,
        clock: C,
    ) -> ConverterResult<Self> {
        let state = ConverterState::from_genesis(genesis)?;
        let mut engine = Self::new(config, state, ledger, clock);

        let note = format!(
            "Imported {} strategies and {} vouchers, next sequence {}.",
            engine.state.strategies.len(),
            engine.state.vouchers.len(),
            engine.state.sequence.current()
        );
        JournalEntry::new(engine.clock.now(), Ok(()), LogType::Genesis)
            .note(note)
            .commit(&mut engine.journal);
        Ok(engine)
    }

    pub fn export_genesis(&self) -> GenesisState {
        self.state.export_genesis()
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn state(&self) -> &ConverterState {
        &self.state
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Hands the state and the collaborators back to the caller.
    pub fn into_parts(self) -> (ConverterState, L, C) {
        (self.state, self.ledger, self.clock)
    }

    // ADMIN

    /// Registers a new strategy. Only configured admins may call this after genesis.
    pub fn create_strategy(
        &mut self,
        caller: Principal,
        input: StrategyInput,
    ) -> ConverterResult<()> {
        let name = input.name.clone();
        let result = only_admin(&self.config.admins, caller)
            .and_then(|_| Strategy::try_from(input))
            .and_then(|strategy| {
                self.state.strategies.create_strategy(
                    &strategy.name,
                    strategy.period,
                    strategy.conversion_rate,
                )
            });

        JournalEntry::new(self.clock.now(), result.clone(), LogType::Strategy)
            .strategy(&name)
            .note(format!("Strategy registration requested by {}.", caller))
            .commit(&mut self.journal);
        result
    }

    // OPERATIONS

    /// Converts `source_amount` of the source asset into the destination asset at 1:1.
    /// Returns the destination amount paid to `sender`.
    pub fn convert(&mut self, sender: &Account, source_amount: U256) -> ConverterResult<U256> {
        let result = self.convert_at_rate(sender, source_amount, scale());

        let mut entry = JournalEntry::new(
            self.clock.now(),
            result.clone().map(|_| ()),
            LogType::Conversion,
        );
        entry.owner(*sender);
        if let Ok(destination_amount) = &result {
            entry.note(format!(
                "Converted {} {} into {} {}.",
                source_amount,
                self.config.source_asset,
                destination_amount,
                self.config.destination_asset
            ));
        }
        entry.commit(&mut self.journal);
        result
    }

    /// Locks `source_amount` under `strategy_name` and issues a voucher.
    /// Zero-period strategies convert immediately at the strategy's rate instead.
    pub fn lock_and_create_voucher(
        &mut self,
        sender: &Account,
        strategy_name: &str,
        source_amount: U256,
    ) -> ConverterResult<LockOutcome> {
        let result = self.try_lock(sender, strategy_name, source_amount);

        let mut entry = JournalEntry::new(
            self.clock.now(),
            result.clone().map(|_| ()),
            LogType::Lock,
        );
        entry.owner(*sender).strategy(strategy_name);
        match &result {
            Ok(LockOutcome::Locked {
                voucher,
                expires_at,
            }) => {
                entry.voucher(&voucher.id).note(format!(
                    "Locked {} {} until {}.",
                    voucher.amount, self.config.source_asset, expires_at
                ));
            }
            Ok(LockOutcome::Converted { destination_amount }) => {
                entry.note(format!(
                    "Converted {} {} into {} {} without a lock.",
                    source_amount,
                    self.config.source_asset,
                    destination_amount,
                    self.config.destination_asset
                ));
            }
            Err(_) => {}
        }
        entry.commit(&mut self.journal);
        result
    }

    /// Redeems a voucher in one shot: the released fraction is converted, the rest is paid
    /// back in the source asset, and the voucher is deleted.
    pub fn withdraw(
        &mut self,
        sender: &Account,
        voucher_id: &str,
    ) -> ConverterResult<WithdrawOutcome> {
        let result = self.try_withdraw(sender, voucher_id);

        let mut entry = JournalEntry::new(
            self.clock.now(),
            result.clone().map(|_| ()),
            LogType::Redemption,
        );
        entry.owner(*sender).voucher(voucher_id);
        if let Ok(outcome) = &result {
            entry.note(format!(
                "Released {} {} and returned {} {}.",
                outcome.released_destination,
                self.config.destination_asset,
                outcome.returned_source,
                self.config.source_asset
            ));
        }
        entry.commit(&mut self.journal);
        result
    }

    /// Reverses a lock entirely. Returns the amount paid back in the source asset.
    pub fn cancel(&mut self, sender: &Account, voucher_id: &str) -> ConverterResult<U256> {
        let result = self.try_cancel(sender, voucher_id);

        let mut entry = JournalEntry::new(
            self.clock.now(),
            result.clone().map(|_| ()),
            LogType::Cancellation,
        );
        entry.owner(*sender).voucher(voucher_id);
        if let Ok(returned) = &result {
            entry.note(format!(
                "Returned {} {}.",
                returned, self.config.source_asset
            ));
        }
        entry.commit(&mut self.journal);
        result
    }

    // QUERIES

    pub fn strategy(&self, name: &str) -> Option<StrategyQuery> {
        self.state.strategies.get_strategy(name).map(StrategyQuery::from)
    }

    pub fn strategies(&self) -> Vec<StrategyQuery> {
        self.state
            .strategies
            .list_strategies()
            .map(StrategyQuery::from)
            .collect()
    }

    pub fn voucher(&self, voucher_id: &str) -> Option<VoucherQuery> {
        self.state.vouchers.get(voucher_id).map(VoucherQuery::from)
    }

    pub fn vouchers_of(&self, owner: &Account) -> Vec<VoucherQuery> {
        self.state
            .vouchers
            .by_owner(owner)
            .map(VoucherQuery::from)
            .collect()
    }

    /// What `withdraw` would pay out right now, without changing anything.
    pub fn preview_withdraw(&self, voucher_id: &str) -> ConverterResult<ReleaseQuoteQuery> {
        let voucher = self
            .state
            .vouchers
            .get(voucher_id)
            .ok_or_else(|| ConverterError::VoucherNotFound(voucher_id.to_string()))?;
        let strategy = self.voucher_strategy(voucher);
        let quote = compute_release(
            voucher.amount,
            voucher.created_time,
            self.clock.now(),
            &strategy,
        )?;
        Ok(ReleaseQuoteQuery::new(
            voucher.id.clone(),
            &quote,
            voucher.expires_at(strategy.period),
        ))
    }

    /// Custody must cover every outstanding voucher.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        check_custody_invariant(&self.state, &self.ledger, &self.config)
    }

    // INTERNALS

    fn convert_at_rate(
        &mut self,
        sender: &Account,
        source_amount: U256,
        rate: U256,
    ) -> ConverterResult<U256> {
        if source_amount.is_zero() {
            return Err(ConverterError::InvalidAmount);
        }
        let destination_amount = convert_amount(source_amount, rate)?;
        if destination_amount.is_zero() {
            return Err(ConverterError::NothingToRelease);
        }

        let config = &self.config;
        pull_into_custody(
            &mut self.ledger,
            config,
            sender,
            &config.source_asset,
            source_amount,
        )?;
        burn_from_custody(&mut self.ledger, config, &config.source_asset, source_amount);
        mint_into_custody(
            &mut self.ledger,
            config,
            &config.destination_asset,
            destination_amount,
        );
        pay_out(
            &mut self.ledger,
            config,
            sender,
            &config.destination_asset,
            destination_amount,
        );
        Ok(destination_amount)
    }

    fn try_lock(
        &mut self,
        sender: &Account,
        strategy_name: &str,
        source_amount: U256,
    ) -> ConverterResult<LockOutcome> {
        let strategy = self
            .state
            .strategies
            .get_strategy(strategy_name)
            .cloned()
            .ok_or_else(|| ConverterError::StrategyNotFound(strategy_name.to_string()))?;
        if source_amount.is_zero() {
            return Err(ConverterError::InvalidAmount);
        }

        if strategy.is_instant() {
            let destination_amount =
                self.convert_at_rate(sender, source_amount, strategy.conversion_rate)?;
            return Ok(LockOutcome::Converted { destination_amount });
        }

        let config = &self.config;
        pull_into_custody(
            &mut self.ledger,
            config,
            sender,
            &config.source_asset,
            source_amount,
        )?;

        let voucher = Voucher {
            id: self.state.sequence.next_voucher_id(),
            owner: *sender,
            strategy: strategy.name.clone(),
            amount: source_amount,
            created_time: self.clock.now(),
        };
        self.state.vouchers.insert(voucher.clone());

        Ok(LockOutcome::Locked {
            expires_at: voucher.expires_at(strategy.period),
            voucher,
        })
    }

    fn try_withdraw(
        &mut self,
        sender: &Account,
        voucher_id: &str,
    ) -> ConverterResult<WithdrawOutcome> {
        let voucher = self.authorized_voucher(sender, voucher_id)?;
        let strategy = self.voucher_strategy(&voucher);
        let quote = compute_release(
            voucher.amount,
            voucher.created_time,
            self.clock.now(),
            &strategy,
        )?;
        if !quote.has_release() {
            return Err(ConverterError::NothingToRelease);
        }

        let config = &self.config;
        // Checked up front so a shortfall aborts before anything is minted
        ensure_custody_covers(&self.ledger, config, &config.source_asset, voucher.amount);

        mint_into_custody(
            &mut self.ledger,
            config,
            &config.destination_asset,
            quote.released_destination,
        );
        pay_out(
            &mut self.ledger,
            config,
            &voucher.owner,
            &config.destination_asset,
            quote.released_destination,
        );
        burn_from_custody(
            &mut self.ledger,
            config,
            &config.source_asset,
            quote.releasable_source,
        );
        pay_out(
            &mut self.ledger,
            config,
            &voucher.owner,
            &config.source_asset,
            quote.returnable_source,
        );
        self.state.vouchers.remove(&voucher.id);

        Ok(WithdrawOutcome {
            released_destination: quote.released_destination,
            returned_source: quote.returnable_source,
        })
    }

    fn try_cancel(&mut self, sender: &Account, voucher_id: &str) -> ConverterResult<U256> {
        let voucher = self.authorized_voucher(sender, voucher_id)?;

        let config = &self.config;
        ensure_custody_covers(&self.ledger, config, &config.source_asset, voucher.amount);
        pay_out(
            &mut self.ledger,
            config,
            &voucher.owner,
            &config.source_asset,
            voucher.amount,
        );
        self.state.vouchers.remove(&voucher.id);

        Ok(voucher.amount)
    }

    /// Looks up a voucher and checks that `sender` owns it.
    fn authorized_voucher(&self, sender: &Account, voucher_id: &str) -> ConverterResult<Voucher> {
        let voucher = self
            .state
            .vouchers
            .get(voucher_id)
            .ok_or_else(|| ConverterError::VoucherNotFound(voucher_id.to_string()))?;
        if !voucher.is_owned_by(sender) {
            return Err(ConverterError::NotOwner);
        }
        Ok(voucher.clone())
    }

    /// Strategy of an outstanding voucher. Strategies are never removed, so a miss is fatal.
    fn voucher_strategy(&self, voucher: &Voucher) -> Strategy {
        self.state
            .strategies
            .get_strategy(&voucher.strategy)
            .cloned()
            .unwrap_or_else(|| {
                fatal(InvariantViolation::MissingStrategy {
                    voucher_id: voucher.id.clone(),
                    strategy: voucher.strategy.clone(),
                })
            })
    }
}
