//! Genesis import and export
//!
//! Import validates the whole document before building any state. Export reproduces every
//! strategy, every outstanding voucher and the sequence watermark, which is enough to resume
//! identically on another node.

use std::collections::BTreeSet;

use candid::CandidType;
use icrc_ledger_types::icrc1::account::Account;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{default_strategies, INITIAL_VOUCHER_SEQ},
    state::ConverterState,
    strategy::{settings::validate_name, StrategyRegistry},
    utils::{
        common::string_to_amount,
        decimal::{format_decimal, parse_decimal},
        error::{ConverterError, ConverterResult, GenesisError},
    },
    voucher::{Voucher, VoucherSequence, VoucherStore},
};

#[derive(Clone, CandidType, Debug, Deserialize, PartialEq, Serialize)]
pub struct GenesisStrategy {
    pub name: String,
    pub period: u64,
    /// Decimal text, e.g. `"0.5"`
    pub conversion_rate: String,
}

#[derive(Clone, CandidType, Debug, Deserialize, PartialEq, Serialize)]
pub struct GenesisVoucher {
    pub id: String,
    pub owner: Account,
    pub strategy: String,
    /// Base-10 integer amount
    pub amount: String,
    pub created_time: u64,
}

#[derive(Clone, CandidType, Debug, Deserialize, PartialEq, Serialize)]
pub struct GenesisState {
    pub strategies: Vec<GenesisStrategy>,
    pub vouchers: Vec<GenesisVoucher>,
    pub next_voucher_seq: u64,
}

impl Default for GenesisState {
    fn default() -> Self {
        Self {
            strategies: default_strategies()
                .into_iter()
                .map(|(name, period, rate)| GenesisStrategy {
                    name: name.to_string(),
                    period,
                    conversion_rate: format_decimal(rate),
                })
                .collect(),
            vouchers: vec![],
            next_voucher_seq: INITIAL_VOUCHER_SEQ,
        }
    }
}

impl GenesisState {
    pub fn from_json(json: &str) -> ConverterResult<Self> {
        serde_json::from_str(json).map_err(|err| ConverterError::DecodingError(err.to_string()))
    }

    pub fn to_json(&self) -> ConverterResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| ConverterError::DecodingError(err.to_string()))
    }

    /// Checks the document without building state.
    pub fn validate(&self) -> ConverterResult<()> {
        self.clone().into_state().map(|_| ())
    }

    /// Builds the converter state, rejecting duplicate strategies or vouchers, vouchers that
    /// reference unknown strategies, zero-amount vouchers and a sequence watermark that is not
    /// strictly greater than the number of vouchers.
    pub fn into_state(self) -> ConverterResult<ConverterState> {
        let mut strategies = StrategyRegistry::default();
        for strategy in &self.strategies {
            validate_name(&strategy.name)?;
            if strategies.contains(&strategy.name) {
                return Err(GenesisError::DuplicateStrategy(strategy.name.clone()).into());
            }
            let rate = parse_decimal(&strategy.conversion_rate)?;
            strategies.create_strategy(&strategy.name, strategy.period, rate)?;
        }

        let voucher_count = self.vouchers.len() as u64;
        if self.next_voucher_seq <= voucher_count {
            return Err(GenesisError::SequenceTooLow {
                next_voucher_seq: self.next_voucher_seq,
                vouchers: voucher_count,
            }
            .into());
        }

        let mut seen = BTreeSet::new();
        let mut vouchers = VoucherStore::default();
        for voucher in self.vouchers {
            if !seen.insert(voucher.id.clone()) {
                return Err(GenesisError::DuplicateVoucher(voucher.id).into());
            }
            if !strategies.contains(&voucher.strategy) {
                return Err(GenesisError::UnknownStrategy {
                    voucher_id: voucher.id,
                    strategy: voucher.strategy,
                }
                .into());
            }
            let amount = string_to_amount(&voucher.amount)?;
            if amount.is_zero() {
                return Err(GenesisError::ZeroAmountVoucher(voucher.id).into());
            }
            vouchers.insert(Voucher {
                id: voucher.id,
                owner: voucher.owner,
                strategy: voucher.strategy,
                amount,
                created_time: voucher.created_time,
            });
        }

        Ok(ConverterState {
            strategies,
            vouchers,
            sequence: VoucherSequence::starting_at(self.next_voucher_seq),
        })
    }
}

impl ConverterState {
    pub fn from_genesis(genesis: GenesisState) -> ConverterResult<Self> {
        genesis.into_state()
    }

    pub fn export_genesis(&self) -> GenesisState {
        GenesisState {
            strategies: self
                .strategies
                .list_strategies()
                .map(|strategy| GenesisStrategy {
                    name: strategy.name.clone(),
                    period: strategy.period,
                    conversion_rate: format_decimal(strategy.conversion_rate),
                })
                .collect(),
            vouchers: self
                .vouchers
                .iter()
                .map(|voucher| GenesisVoucher {
                    id: voucher.id.clone(),
                    owner: voucher.owner,
                    strategy: voucher.strategy.clone(),
                    amount: voucher.amount.to_string(),
                    created_time: voucher.created_time,
                })
                .collect(),
            next_voucher_seq: self.sequence.current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use candid::Principal;

    fn owner() -> Account {
        Account {
            owner: Principal::from_slice(&[1, 2, 3]),
            subaccount: None,
        }
    }

    fn voucher(id: &str, strategy: &str, amount: &str) -> GenesisVoucher {
        GenesisVoucher {
            id: id.to_string(),
            owner: owner(),
            strategy: strategy.to_string(),
            amount: amount.to_string(),
            created_time: 1_000,
        }
    }

    fn genesis_with(vouchers: Vec<GenesisVoucher>, next_voucher_seq: u64) -> GenesisState {
        GenesisState {
            vouchers,
            next_voucher_seq,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_genesis_imports() {
        let state = ConverterState::from_genesis(GenesisState::default()).unwrap();
        assert_eq!(state, ConverterState::with_default_strategies().export_genesis().into_state().unwrap());
        assert_eq!(state.strategies.len(), 3);
        assert!(state.vouchers.is_empty());
        assert_eq!(state.sequence.current(), 1);
    }

    #[test]
    fn test_import_export_roundtrip() {
        let genesis = genesis_with(
            vec![voucher("a", "90days", "1000"), voucher("b", "180days", "5")],
            7,
        );
        let state = genesis.clone().into_state().unwrap();
        assert_eq!(state.vouchers.get("a").unwrap().amount, U256::from(1000u64));
        assert_eq!(state.vouchers.by_owner(&owner()).count(), 2);
        assert_eq!(state.sequence.current(), 7);

        let exported = state.export_genesis();
        assert_eq!(exported.vouchers, genesis.vouchers);
        assert_eq!(exported.next_voucher_seq, 7);
        assert_eq!(exported.into_state().unwrap(), state);
    }

    #[test]
    fn test_json_roundtrip() {
        let genesis = genesis_with(vec![voucher("a", "90days", "1000")], 2);
        let json = genesis.to_json().unwrap();
        assert_eq!(GenesisState::from_json(&json).unwrap(), genesis);
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(
            GenesisState::from_json("{\"strategies\": 5}"),
            Err(ConverterError::DecodingError(_))
        ));
    }

    #[test]
    fn test_duplicate_strategy_is_rejected() {
        let mut genesis = GenesisState::default();
        genesis.strategies.push(genesis.strategies[1].clone());
        assert_eq!(
            genesis.validate(),
            Err(ConverterError::Genesis(GenesisError::DuplicateStrategy(
                "90days".to_string()
            )))
        );
    }

    #[test]
    fn test_duplicate_voucher_is_rejected() {
        let genesis = genesis_with(
            vec![voucher("a", "90days", "1"), voucher("a", "180days", "2")],
            3,
        );
        assert_eq!(
            genesis.validate(),
            Err(ConverterError::Genesis(GenesisError::DuplicateVoucher(
                "a".to_string()
            )))
        );
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let genesis = genesis_with(vec![voucher("a", "365days", "1")], 2);
        assert_eq!(
            genesis.validate(),
            Err(ConverterError::Genesis(GenesisError::UnknownStrategy {
                voucher_id: "a".to_string(),
                strategy: "365days".to_string(),
            }))
        );
    }

    #[test]
    fn test_sequence_must_exceed_voucher_count() {
        let vouchers = vec![voucher("a", "90days", "1"), voucher("b", "90days", "1")];
        assert_eq!(
            genesis_with(vouchers.clone(), 2).validate(),
            Err(ConverterError::Genesis(GenesisError::SequenceTooLow {
                next_voucher_seq: 2,
                vouchers: 2,
            }))
        );
        assert!(genesis_with(vouchers, 3).validate().is_ok());
        assert!(genesis_with(vec![], 0).validate().is_err());
    }

    #[test]
    fn test_zero_amount_voucher_is_rejected() {
        let genesis = genesis_with(vec![voucher("a", "90days", "0")], 2);
        assert_eq!(
            genesis.validate(),
            Err(ConverterError::Genesis(GenesisError::ZeroAmountVoucher(
                "a".to_string()
            )))
        );
    }

    #[test]
    fn test_bad_rate_is_rejected() {
        let mut genesis = GenesisState::default();
        genesis.strategies[0].conversion_rate = "one".to_string();
        assert!(matches!(
            genesis.validate(),
            Err(ConverterError::DecodingError(_))
        ));
    }
}
