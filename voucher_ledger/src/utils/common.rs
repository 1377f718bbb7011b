//! Common utility and helper functions that are used across the project

use std::str::FromStr;

use alloy_primitives::U256;
use candid::{Nat, Principal};
use num_bigint::BigUint;

use super::error::*;

/// Returns Err if the `caller` is not one of the configured admins
pub fn only_admin(admins: &[Principal], caller: Principal) -> ConverterResult<()> {
    if !admins.contains(&caller) {
        // only an admin should be able to call this function
        return Err(ConverterError::Unauthorized);
    }
    Ok(())
}

/// Converts values of type `Nat` to `U256`
pub fn nat_to_u256(n: &Nat) -> ConverterResult<U256> {
    let be_bytes = n.0.to_bytes_be();
    if be_bytes.len() > 32 {
        return Err(ConverterError::DecodingError("The `Nat` input length exceedes 32 bytes when converted to big-endian bytes representation.".to_string()));
    }
    // Ensure the byte array is exactly 32 bytes long
    let mut padded_bytes = [0u8; 32];
    let start_pos = 32 - be_bytes.len();
    padded_bytes[start_pos..].copy_from_slice(&be_bytes);

    Ok(U256::from_be_bytes(padded_bytes))
}

/// Converts values of type `U256` to `Nat`
pub fn u256_to_nat(value: &U256) -> Nat {
    Nat(BigUint::from_bytes_be(&value.to_be_bytes::<32>()))
}

/// Parses a base-10 integer amount and returns ConverterError on failure
pub fn string_to_amount(input: &str) -> ConverterResult<U256> {
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConverterError::DecodingError(format!(
            "Invalid amount: {:?}",
            input
        )));
    }
    U256::from_str(input).map_err(|err| ConverterError::DecodingError(format!("{:#?}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nat_to_u256_valid() {
        let value = 1234567890_u64;
        let nat = Nat::from(value);
        let result = nat_to_u256(&nat);
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), U256::from(value));
    }

    #[test]
    fn test_nat_to_u256_too_large() {
        let nat = Nat(BigUint::from_bytes_be(&[1u8; 33]));
        assert!(matches!(
            nat_to_u256(&nat),
            Err(ConverterError::DecodingError(_))
        ));
    }

    #[test]
    fn test_u256_to_nat_roundtrip_max() {
        let nat = u256_to_nat(&U256::MAX);
        assert_eq!(nat_to_u256(&nat).unwrap(), U256::MAX);
        assert_eq!(u256_to_nat(&U256::ZERO), Nat::from(0u64));
    }

    #[test]
    fn test_only_admin() {
        let admin = Principal::from_slice(&[1, 2, 3]);
        let stranger = Principal::from_slice(&[4, 5, 6]);
        assert!(only_admin(&[admin], admin).is_ok());
        assert_eq!(
            only_admin(&[admin], stranger),
            Err(ConverterError::Unauthorized)
        );
        assert_eq!(only_admin(&[], admin), Err(ConverterError::Unauthorized));
    }

    #[test]
    fn test_string_to_amount() {
        assert_eq!(string_to_amount("1000000").unwrap(), U256::from(1_000_000u64));
        assert!(string_to_amount("").is_err());
        assert!(string_to_amount("0x10").is_err());
        assert!(string_to_amount("-5").is_err());
    }
}
