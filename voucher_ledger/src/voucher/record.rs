//! Voucher record

use alloy_primitives::U256;
use candid::{CandidType, Nat};
use icrc_ledger_types::icrc1::account::Account;

use crate::utils::common::u256_to_nat;

/// One outstanding locked conversion.
/// A voucher exists only while LOCKED; redemption and cancellation delete it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voucher {
    /// Hex encoded SHA-256 of the textual sequence id
    pub id: String,
    /// The only account allowed to redeem or cancel
    pub owner: Account,
    /// Name of the strategy the voucher was locked under
    pub strategy: String,
    /// Locked source amount, always strictly positive
    pub amount: U256,
    /// Release schedule epoch, denominated in seconds
    pub created_time: u64,
}

impl Voucher {
    /// Time at which the full amount becomes releasable.
    pub fn expires_at(&self, period: u64) -> u64 {
        self.created_time.saturating_add(period)
    }

    pub fn is_owned_by(&self, account: &Account) -> bool {
        &self.owner == account
    }
}

#[derive(Clone, CandidType, Debug, PartialEq)]
pub struct VoucherQuery {
    pub id: String,
    pub owner: Account,
    pub strategy: String,
    pub amount: Nat,
    pub created_time: u64,
}

impl From<&Voucher> for VoucherQuery {
    fn from(value: &Voucher) -> Self {
        Self {
            id: value.id.clone(),
            owner: value.owner,
            strategy: value.strategy.clone(),
            amount: u256_to_nat(&value.amount),
            created_time: value.created_time,
        }
    }
}
