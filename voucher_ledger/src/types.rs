use alloy_primitives::U256;
use candid::{CandidType, Nat};

pub use icrc_ledger_types::icrc1::account::Account;

use crate::{
    utils::common::u256_to_nat,
    voucher::{Voucher, VoucherQuery},
};

/// Result of a locked conversion request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockOutcome {
    /// The strategy has no lock period; the amount was converted immediately
    Converted { destination_amount: U256 },
    /// A voucher was issued
    Locked { voucher: Voucher, expires_at: u64 },
}

/// Result of redeeming a voucher
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WithdrawOutcome {
    /// Destination amount minted to the owner
    pub released_destination: U256,
    /// Source amount paid back to the owner
    pub returned_source: U256,
}

#[derive(Clone, CandidType, Debug, PartialEq)]
pub enum LockOutcomeQuery {
    Converted { destination_amount: Nat },
    Locked { voucher: VoucherQuery, expires_at: u64 },
}

impl From<&LockOutcome> for LockOutcomeQuery {
    fn from(value: &LockOutcome) -> Self {
        match value {
            LockOutcome::Converted { destination_amount } => LockOutcomeQuery::Converted {
                destination_amount: u256_to_nat(destination_amount),
            },
            LockOutcome::Locked {
                voucher,
                expires_at,
            } => LockOutcomeQuery::Locked {
                voucher: voucher.into(),
                expires_at: *expires_at,
            },
        }
    }
}

#[derive(Clone, CandidType, Debug, PartialEq)]
pub struct WithdrawOutcomeQuery {
    pub released_destination: Nat,
    pub returned_source: Nat,
}

impl From<WithdrawOutcome> for WithdrawOutcomeQuery {
    fn from(value: WithdrawOutcome) -> Self {
        Self {
            released_destination: u256_to_nat(&value.released_destination),
            returned_source: u256_to_nat(&value.returned_source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candid::Principal;

    #[test]
    fn test_outcomes_render_as_nat() {
        let converted = LockOutcome::Converted {
            destination_amount: U256::from(250u64),
        };
        assert_eq!(
            LockOutcomeQuery::from(&converted),
            LockOutcomeQuery::Converted {
                destination_amount: Nat::from(250u64)
            }
        );

        let voucher = Voucher {
            id: "abc".to_string(),
            owner: Account {
                owner: Principal::from_slice(&[1]),
                subaccount: None,
            },
            strategy: "90days".to_string(),
            amount: U256::from(10u64),
            created_time: 5,
        };
        match LockOutcomeQuery::from(&LockOutcome::Locked {
            voucher,
            expires_at: 7_776_005,
        }) {
            LockOutcomeQuery::Locked {
                voucher,
                expires_at,
            } => {
                assert_eq!(voucher.amount, Nat::from(10u64));
                assert_eq!(expires_at, 7_776_005);
            }
            other => panic!("Expected a locked outcome, got {:?}", other),
        }

        let withdrawn = WithdrawOutcomeQuery::from(WithdrawOutcome {
            released_destination: U256::from(55_555u64),
            returned_source: U256::from(888_889u64),
        });
        assert_eq!(withdrawn.released_destination, Nat::from(55_555u64));
        assert_eq!(withdrawn.returned_source, Nat::from(888_889u64));
    }
}
