//! Proportional time-based release.
//!
//! ```plain
//! ratio      = round(elapsed / period)             18 places, half to even
//! released   = round(amount * min(ratio, 1))       integer, half to even
//! returned   = amount - released
//! converted  = floor(released * rate)              integer, truncated
//! ```

use alloy_primitives::U256;
use candid::{CandidType, Nat};

use crate::{
    constants::scale,
    strategy::Strategy,
    utils::{
        common::u256_to_nat,
        decimal::{dec_quo, mul_int_round, mul_int_truncate, to_dec},
        error::{arithmetic_err, ConverterResult},
    },
};

/// Outcome of redeeming a voucher at a given time
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReleaseQuote {
    /// Fraction of the period that has elapsed, scaled by `SCALE` and not capped
    pub release_ratio: U256,
    /// Source amount converted and burned
    pub releasable_source: U256,
    /// Source amount paid back to the owner
    pub returnable_source: U256,
    /// Destination amount minted to the owner
    pub released_destination: U256,
}

impl ReleaseQuote {
    /// A redemption is only allowed if it mints something.
    pub fn has_release(&self) -> bool {
        !self.released_destination.is_zero()
    }
}

#[derive(Clone, CandidType, Debug, PartialEq)]
pub struct ReleaseQuoteQuery {
    pub voucher_id: String,
    pub released_destination: Nat,
    pub burned_source: Nat,
    pub returned_source: Nat,
    pub expires_at: u64,
}

impl ReleaseQuoteQuery {
    pub fn new(voucher_id: String, quote: &ReleaseQuote, expires_at: u64) -> Self {
        Self {
            voucher_id,
            released_destination: u256_to_nat(&quote.released_destination),
            burned_source: u256_to_nat(&quote.releasable_source),
            returned_source: u256_to_nat(&quote.returnable_source),
            expires_at,
        }
    }
}

/// Elapsed seconds over the period as a decimal. A zero period is always fully released.
pub fn release_ratio(elapsed: u64, period: u64) -> ConverterResult<U256> {
    if period == 0 {
        return Ok(scale());
    }
    dec_quo(to_dec(U256::from(elapsed))?, to_dec(U256::from(period))?)
}

/// Splits a locked `amount` created at `created_time` into its released and returned parts at
/// time `now` under `strategy`.
pub fn compute_release(
    amount: U256,
    created_time: u64,
    now: u64,
    strategy: &Strategy,
) -> ConverterResult<ReleaseQuote> {
    let elapsed = now.saturating_sub(created_time);
    let release_ratio = release_ratio(elapsed, strategy.period)?;
    let capped_ratio = release_ratio.min(scale());

    let releasable_source = mul_int_round(amount, capped_ratio)?;
    let returnable_source = amount
        .checked_sub(releasable_source)
        .ok_or_else(|| arithmetic_err("Released amount exceeded the locked amount."))?;
    let released_destination = convert_amount(releasable_source, strategy.conversion_rate)?;

    Ok(ReleaseQuote {
        release_ratio,
        releasable_source,
        returnable_source,
        released_destination,
    })
}

/// `floor(amount * rate)`. Never rounds up, so conversions cannot over-mint.
pub fn convert_amount(amount: U256, rate: U256) -> ConverterResult<U256> {
    mul_int_truncate(amount, rate)
}
