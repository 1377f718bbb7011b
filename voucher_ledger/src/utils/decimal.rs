//! Fixed point decimal arithmetic on `U256`.
//!
//! A decimal is an integer scaled by `SCALE` (10^18). Products and quotients are computed at
//! double precision and then chopped back to 18 places with round-half-to-even, so every node
//! produces identical results.

use std::str::FromStr;

use alloy_primitives::U256;

use crate::constants::{scale, DECIMAL_PLACES};

use super::error::{arithmetic_err, ConverterError, ConverterResult};

/// Lifts an integer amount to its decimal representation.
pub fn to_dec(value: U256) -> ConverterResult<U256> {
    value
        .checked_mul(scale())
        .ok_or_else(|| arithmetic_err("Decimal conversion overflowed."))
}

/// Removes the 18 extra decimal places from `value`, rounding half to even.
pub fn chop_precision_and_round(value: U256) -> U256 {
    let scale = scale();
    let quotient = value / scale;
    let remainder = value % scale;
    let half = scale / U256::from(2);

    if remainder < half {
        quotient
    } else if remainder > half {
        quotient + U256::from(1)
    } else if quotient % U256::from(2) == U256::ZERO {
        quotient
    } else {
        quotient + U256::from(1)
    }
}

/// Decimal multiplication
pub fn dec_mul(a: U256, b: U256) -> ConverterResult<U256> {
    let product = a
        .checked_mul(b)
        .ok_or_else(|| arithmetic_err("Decimal multiplication overflowed."))?;
    Ok(chop_precision_and_round(product))
}

/// Decimal division
pub fn dec_quo(a: U256, b: U256) -> ConverterResult<U256> {
    if b.is_zero() {
        return Err(arithmetic_err("Decimal division by zero."));
    }
    let widened = a
        .checked_mul(scale())
        .and_then(|value| value.checked_mul(scale()))
        .ok_or_else(|| arithmetic_err("Decimal division overflowed."))?;
    Ok(chop_precision_and_round(widened / b))
}

/// Integer amount times a decimal, rounded to the nearest integer with ties to even.
/// The amount is not lifted first, so only `amount * dec` has to fit.
pub fn mul_int_round(amount: U256, dec: U256) -> ConverterResult<U256> {
    let product = amount
        .checked_mul(dec)
        .ok_or_else(|| arithmetic_err("Amount multiplication overflowed."))?;
    Ok(chop_precision_and_round(product))
}

/// Integer amount times a decimal, fractional part dropped.
pub fn mul_int_truncate(amount: U256, dec: U256) -> ConverterResult<U256> {
    let product = amount
        .checked_mul(dec)
        .ok_or_else(|| arithmetic_err("Amount multiplication overflowed."))?;
    Ok(product / scale())
}

/// Parses `"0.25"`, `"1"` or `"12.000001"` into a decimal.
pub fn parse_decimal(input: &str) -> ConverterResult<U256> {
    let decoding_err = || ConverterError::DecodingError(format!("Invalid decimal: {:?}", input));
    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (input, ""),
    };

    if whole.is_empty()
        || fraction.len() > DECIMAL_PLACES
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
        || (input.contains('.') && fraction.is_empty())
    {
        return Err(decoding_err());
    }

    let whole = U256::from_str(whole).map_err(|_| decoding_err())?;
    let padded = format!("{:0<width$}", fraction, width = DECIMAL_PLACES);
    let fraction = U256::from_str(&padded).map_err(|_| decoding_err())?;

    to_dec(whole)?
        .checked_add(fraction)
        .ok_or_else(|| arithmetic_err("Decimal parsing overflowed."))
}

/// Renders a decimal with all 18 fractional digits, e.g. `0.250000000000000000`.
pub fn format_decimal(dec: U256) -> String {
    let whole = dec / scale();
    let fraction = dec % scale();
    format!(
        "{}.{:0>width$}",
        whole,
        fraction.to_string(),
        width = DECIMAL_PLACES
    )
}
