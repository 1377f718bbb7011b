//! Replicated converter state.
//!
//! Owned by the caller and passed into the engine explicitly, so independent chains or tests
//! never share it.

use crate::{
    strategy::StrategyRegistry,
    voucher::{VoucherSequence, VoucherStore},
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConverterState {
    pub strategies: StrategyRegistry,
    pub vouchers: VoucherStore,
    pub sequence: VoucherSequence,
}

impl ConverterState {
    /// Default strategies, no vouchers and an unset sequence.
    pub fn with_default_strategies() -> Self {
        Self {
            strategies: StrategyRegistry::with_defaults(),
            ..Default::default()
        }
    }
}
