//! External collaborators: the balance ledger and the deterministic clock.
//!
//! The conversion engine never owns balances. It issues debit/credit/mint/burn instructions
//! through [`Ledger`] and reads time only through [`Clock`], which must be the replicated
//! execution time (e.g. block time) and never wall-clock time.

use std::collections::BTreeMap;

use alloy_primitives::U256;
use icrc_ledger_types::icrc1::account::Account;
#[cfg(test)]
use mockall::automock;

use crate::utils::{common::u256_to_nat, error::LedgerError};

/// Balance ledger capability. Every call either applies fully or not at all.
#[cfg_attr(test, automock)]
pub trait Ledger {
    /// Decreases the spendable balance of `account`.
    fn debit(&mut self, account: &Account, asset: &str, amount: U256) -> Result<(), LedgerError>;
    /// Increases the spendable balance of `account`.
    fn credit(&mut self, account: &Account, asset: &str, amount: U256);
    /// Increases the total supply of `asset`.
    fn mint(&mut self, asset: &str, amount: U256);
    /// Decreases the total supply of `asset`.
    fn burn(&mut self, asset: &str, amount: U256);
    fn balance_of(&self, account: &Account, asset: &str) -> U256;
}

/// Deterministic time source, denominated in seconds.
#[cfg_attr(test, automock)]
pub trait Clock {
    fn now(&self) -> u64;
}

/// Settable clock for embedding and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self { now }
    }

    pub fn set(&mut self, now: u64) -> &mut Self {
        self.now = now;
        self
    }

    pub fn advance(&mut self, seconds: u64) -> &mut Self {
        self.now = self.now.saturating_add(seconds);
        self
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now
    }
}

/// In-memory ledger that tracks balances and total supply per asset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryLedger {
    balances: BTreeMap<(Account, String), U256>,
    supply: BTreeMap<String, U256>,
}

impl MemoryLedger {
    /// Credits `amount` to `account` and mints it, as a genesis allocation would.
    pub fn fund(&mut self, account: &Account, asset: &str, amount: U256) -> &mut Self {
        self.mint(asset, amount);
        self.credit(account, asset, amount);
        self
    }

    pub fn total_supply(&self, asset: &str) -> U256 {
        self.supply.get(asset).copied().unwrap_or(U256::ZERO)
    }
}

impl Ledger for MemoryLedger {
    fn debit(&mut self, account: &Account, asset: &str, amount: U256) -> Result<(), LedgerError> {
        let available = self.balance_of(account, asset);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientFunds {
                asset: asset.to_string(),
                available: u256_to_nat(&available),
                required: u256_to_nat(&amount),
            })?;
        self.balances.insert((*account, asset.to_string()), remaining);
        Ok(())
    }

    fn credit(&mut self, account: &Account, asset: &str, amount: U256) {
        let balance = self
            .balances
            .entry((*account, asset.to_string()))
            .or_insert(U256::ZERO);
        *balance = balance
            .checked_add(amount)
            .unwrap_or_else(|| panic!("credit overflowed the {} balance", asset));
    }

    fn mint(&mut self, asset: &str, amount: U256) {
        let supply = self.supply.entry(asset.to_string()).or_insert(U256::ZERO);
        *supply = supply
            .checked_add(amount)
            .unwrap_or_else(|| panic!("mint overflowed the {} supply", asset));
    }

    fn burn(&mut self, asset: &str, amount: U256) {
        let supply = self.supply.entry(asset.to_string()).or_insert(U256::ZERO);
        *supply = supply
            .checked_sub(amount)
            .unwrap_or_else(|| panic!("burn exceeded the {} supply", asset));
    }

    fn balance_of(&self, account: &Account, asset: &str) -> U256 {
        self.balances
            .get(&(*account, asset.to_string()))
            .copied()
            .unwrap_or(U256::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candid::{Nat, Principal};

    fn alice() -> Account {
        Account {
            owner: Principal::from_slice(&[1]),
            subaccount: None,
        }
    }

    #[test]
    fn test_fund_and_debit() {
        let mut ledger = MemoryLedger::default();
        ledger.fund(&alice(), "usrc", U256::from(100u64));

        assert_eq!(ledger.balance_of(&alice(), "usrc"), U256::from(100u64));
        assert_eq!(ledger.total_supply("usrc"), U256::from(100u64));

        ledger.debit(&alice(), "usrc", U256::from(40u64)).unwrap();
        assert_eq!(ledger.balance_of(&alice(), "usrc"), U256::from(60u64));
    }

    #[test]
    fn test_overdraft_is_rejected_without_change() {
        let mut ledger = MemoryLedger::default();
        ledger.fund(&alice(), "usrc", U256::from(10u64));
        let before = ledger.clone();

        let result = ledger.debit(&alice(), "usrc", U256::from(11u64));
        assert_eq!(
            result,
            Err(LedgerError::InsufficientFunds {
                asset: "usrc".to_string(),
                available: Nat::from(10u64),
                required: Nat::from(11u64),
            })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_assets_are_separate() {
        let mut ledger = MemoryLedger::default();
        ledger.fund(&alice(), "usrc", U256::from(10u64));
        assert_eq!(ledger.balance_of(&alice(), "udst"), U256::ZERO);
        assert!(ledger.debit(&alice(), "udst", U256::from(1u64)).is_err());
    }

    #[test]
    #[should_panic(expected = "burn exceeded the usrc supply")]
    fn test_burn_past_supply_panics() {
        let mut ledger = MemoryLedger::default();
        ledger.fund(&alice(), "usrc", U256::from(5u64));
        ledger.burn("usrc", U256::from(6u64));
    }

    #[test]
    #[should_panic(expected = "mint overflowed the usrc supply")]
    fn test_mint_overflow_panics() {
        let mut ledger = MemoryLedger::default();
        ledger.mint("usrc", U256::MAX);
        ledger.mint("usrc", U256::from(1u64));
    }

    #[test]
    #[should_panic(expected = "credit overflowed the usrc balance")]
    fn test_credit_overflow_panics() {
        let mut ledger = MemoryLedger::default();
        ledger.credit(&alice(), "usrc", U256::MAX);
        ledger.credit(&alice(), "usrc", U256::from(1u64));
    }

    #[test]
    fn test_manual_clock() {
        let mut clock = ManualClock::new(100);
        clock.advance(50);
        assert_eq!(clock.now(), 150);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }
}
