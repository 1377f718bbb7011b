//! Strategy parameters

use alloy_primitives::U256;
use candid::{CandidType, Nat};
use serde::Deserialize;

use crate::utils::{
    common::{nat_to_u256, u256_to_nat},
    decimal::format_decimal,
    error::{ConverterError, ConverterResult},
};

/// A named conversion strategy.
/// Strategies are plain data; all behaviour lives in the conversion engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Strategy {
    /// Unique name in the registry
    pub name: String,
    /// Lock period denominated in seconds. `0` means instant conversion.
    pub period: u64,
    /// Destination tokens per source token, scaled by `SCALE`
    pub conversion_rate: U256,
}

impl Strategy {
    pub fn new<S: AsRef<str>>(name: S, period: u64, conversion_rate: U256) -> Self {
        Self {
            name: name.as_ref().to_string(),
            period,
            conversion_rate,
        }
    }

    /// Sets the name of the strategy.
    pub fn name<S: AsRef<str>>(&mut self, name: S) -> &mut Self {
        self.name = name.as_ref().to_string();
        self
    }

    /// Sets the lock period, denominated in seconds.
    pub fn period(&mut self, period: u64) -> &mut Self {
        self.period = period;
        self
    }

    /// Sets the conversion rate.
    pub fn conversion_rate(&mut self, conversion_rate: U256) -> &mut Self {
        self.conversion_rate = conversion_rate;
        self
    }

    /// Returns `true` if locking under this strategy converts immediately.
    pub fn is_instant(&self) -> bool {
        self.period == 0
    }
}

/// Strategy creation arguments
#[derive(Clone, CandidType, Debug, Deserialize)]
pub struct StrategyInput {
    pub name: String,
    pub period: u64,
    /// Rate scaled by `SCALE`
    pub conversion_rate: Nat,
}

impl TryFrom<StrategyInput> for Strategy {
    type Error = ConverterError;

    fn try_from(value: StrategyInput) -> Result<Self, Self::Error> {
        validate_name(&value.name)?;
        Ok(Strategy::new(
            value.name,
            value.period,
            nat_to_u256(&value.conversion_rate)?,
        ))
    }
}

/// Query representation of a strategy
#[derive(Clone, CandidType, Debug, PartialEq)]
pub struct StrategyQuery {
    pub name: String,
    pub period: u64,
    pub conversion_rate: Nat,
    /// Human readable rate, e.g. `0.500000000000000000`
    pub conversion_rate_text: String,
}

impl From<&Strategy> for StrategyQuery {
    fn from(value: &Strategy) -> Self {
        Self {
            name: value.name.clone(),
            period: value.period,
            conversion_rate: u256_to_nat(&value.conversion_rate),
            conversion_rate_text: format_decimal(value.conversion_rate),
        }
    }
}

pub(crate) fn validate_name(name: &str) -> ConverterResult<()> {
    if name.trim().is_empty() {
        return Err(ConverterError::InvalidStrategy(
            "Strategy name must not be empty.".to_string(),
        ));
    }
    Ok(())
}
