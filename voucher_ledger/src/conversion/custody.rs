//! Custody movements.
//!
//! Custody is the module account that holds locked funds between lock and redemption or
//! cancellation. Once an operation has passed validation, every movement out of custody must
//! succeed; a shortfall means the state is corrupted and aborts the operation.

use alloy_primitives::U256;
use icrc_ledger_types::icrc1::account::Account;

use crate::{
    config::ConverterConfig,
    ledger::Ledger,
    state::ConverterState,
    utils::{
        common::u256_to_nat,
        error::{fatal, InvariantViolation, LedgerError},
    },
};

/// Pulls `amount` of `asset` from `from` into custody.
/// The only fallible movement, so callers do it before any other write.
pub fn pull_into_custody<L: Ledger>(
    ledger: &mut L,
    config: &ConverterConfig,
    from: &Account,
    asset: &str,
    amount: U256,
) -> Result<(), LedgerError> {
    ledger.debit(from, asset, amount)?;
    ledger.credit(&config.custody, asset, amount);
    Ok(())
}

/// Pays `amount` of `asset` out of custody to `to`.
pub fn pay_out<L: Ledger>(
    ledger: &mut L,
    config: &ConverterConfig,
    to: &Account,
    asset: &str,
    amount: U256,
) {
    if amount.is_zero() {
        return;
    }
    debit_custody(ledger, config, asset, amount);
    ledger.credit(to, asset, amount);
}

/// Burns `amount` of `asset` held in custody.
pub fn burn_from_custody<L: Ledger>(
    ledger: &mut L,
    config: &ConverterConfig,
    asset: &str,
    amount: U256,
) {
    if amount.is_zero() {
        return;
    }
    debit_custody(ledger, config, asset, amount);
    ledger.burn(asset, amount);
}

/// Mints `amount` of `asset` into custody.
pub fn mint_into_custody<L: Ledger>(
    ledger: &mut L,
    config: &ConverterConfig,
    asset: &str,
    amount: U256,
) {
    if amount.is_zero() {
        return;
    }
    ledger.mint(asset, amount);
    ledger.credit(&config.custody, asset, amount);
}

/// Aborts unless custody holds at least `required` of `asset`.
pub fn ensure_custody_covers<L: Ledger>(
    ledger: &L,
    config: &ConverterConfig,
    asset: &str,
    required: U256,
) {
    let custody = ledger.balance_of(&config.custody, asset);
    if custody < required {
        fatal(InvariantViolation::CustodyShortfall {
            asset: asset.to_string(),
            custody: u256_to_nat(&custody),
            required: u256_to_nat(&required),
        });
    }
}

/// Checks that custody holds enough of the source asset to honour every outstanding voucher.
/// Returned rather than raised so monitoring code can decide how to escalate.
pub fn check_custody_invariant<L: Ledger>(
    state: &ConverterState,
    ledger: &L,
    config: &ConverterConfig,
) -> Result<(), InvariantViolation> {
    let required = state.vouchers.total_locked();
    let custody = ledger.balance_of(&config.custody, &config.source_asset);
    if custody < required {
        return Err(InvariantViolation::CustodyShortfall {
            asset: config.source_asset.clone(),
            custody: u256_to_nat(&custody),
            required: u256_to_nat(&required),
        });
    }
    Ok(())
}

fn debit_custody<L: Ledger>(ledger: &mut L, config: &ConverterConfig, asset: &str, amount: U256) {
    if let Err(LedgerError::InsufficientFunds {
        asset,
        available,
        required,
    }) = ledger.debit(&config.custody, asset, amount)
    {
        fatal(InvariantViolation::CustodyShortfall {
            asset,
            custody: available,
            required,
        });
    }
}
