//! Voucher Ledger's Constants

use alloy_primitives::U256;
use candid::Principal;
use chrono::Duration;
use icrc_ledger_types::icrc1::account::Account;

/// Scale used for fixed point arithmetic
pub const SCALE: u128 = 1_000_000_000_000_000_000; // e18
pub fn scale() -> U256 {
    U256::from(SCALE)
}

/// Number of decimal places carried by rates and ratios
pub const DECIMAL_PLACES: usize = 18;

/// First value of the voucher sequence when the counter has never been written
pub const INITIAL_VOUCHER_SEQ: u64 = 1;

/// Prefix of the textual voucher id that is hashed into the public id
pub const VOUCHER_ID_PREFIX: &str = "voucher-";

/// Name of the default zero-period strategy
pub const INSTANT_STRATEGY: &str = "instant";

/// Default asset that is locked into vouchers
pub const DEFAULT_SOURCE_ASSET: &str = "usrc";

/// Default asset that vouchers release into
pub const DEFAULT_DESTINATION_ASSET: &str = "udst";

/// Number of journal entries kept after pruning
pub const JOURNAL_RETENTION: u64 = 300;

/// Custody (module) account holding locked funds between lock and redemption
const CUSTODY_OWNER_RAW: &[u8] = b"voucher-custody";
pub fn default_custody() -> Account {
    Account {
        owner: Principal::from_slice(CUSTODY_OWNER_RAW),
        subaccount: None,
    }
}

/// `instant` strategy rate: 0.25
const INSTANT_RATE_RAW: u128 = 25 * SCALE / 100;
/// `90days` strategy rate: 0.5
const NINETY_DAYS_RATE_RAW: u128 = 50 * SCALE / 100;
/// `180days` strategy rate: 1.0
const ONE_EIGHTY_DAYS_RATE_RAW: u128 = SCALE;

/// Default strategy set as `(name, period in seconds, rate)`
pub fn default_strategies() -> Vec<(&'static str, u64, U256)> {
    vec![
        (INSTANT_STRATEGY, 0, U256::from(INSTANT_RATE_RAW)),
        (
            "90days",
            Duration::days(90).num_seconds() as u64,
            U256::from(NINETY_DAYS_RATE_RAW),
        ),
        (
            "180days",
            Duration::days(180).num_seconds() as u64,
            U256::from(ONE_EIGHTY_DAYS_RATE_RAW),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_e18() {
        assert_eq!(SCALE, 10_u128.pow(18));
        assert_eq!(SCALE, 10_u128.pow(DECIMAL_PLACES as u32));
    }

    #[test]
    fn default_strategy_periods_are_exact() {
        let strategies = default_strategies();
        assert_eq!(strategies[0], ("instant", 0, U256::from(250_000_000_000_000_000_u128)));
        assert_eq!(strategies[1].1, 7_776_000);
        assert_eq!(strategies[1].2, U256::from(500_000_000_000_000_000_u128));
        assert_eq!(strategies[2].1, 15_552_000);
        assert_eq!(strategies[2].2, scale());
    }

    #[test]
    fn custody_account_is_stable() {
        assert_eq!(default_custody(), default_custody());
        assert_eq!(default_custody().subaccount, None);
    }
}
