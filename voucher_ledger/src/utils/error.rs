use candid::{CandidType, Nat};
use serde::Deserialize;

/// Voucher ledger result
pub type ConverterResult<T> = Result<T, ConverterError>;

/// Recoverable errors. Returning one of these leaves the state untouched.
#[derive(Clone, CandidType, Debug, Deserialize, PartialEq)]
pub enum ConverterError {
    /// No strategy is registered under the given name
    StrategyNotFound(String),
    /// A strategy with the same name is already registered
    StrategyAlreadyExists(String),
    /// The strategy parameters are malformed
    InvalidStrategy(String),
    /// Amounts must be strictly positive
    InvalidAmount,
    /// No outstanding voucher has the given id
    VoucherNotFound(String),
    /// The caller does not own the voucher
    NotOwner,
    /// The redemption would release zero destination tokens at this time
    NothingToRelease,
    /// The caller is not allowed to perform an admin operation
    Unauthorized,
    /// Error surfaced by the external ledger
    Ledger(LedgerError),
    /// Genesis import rejected
    Genesis(GenesisError),
    /// Arithmetic error
    Arithmetic(String),
    /// Decoding issue
    DecodingError(String),
}

/// Errors returned by a [`crate::ledger::Ledger`] implementation.
#[derive(Clone, CandidType, Debug, Deserialize, PartialEq)]
pub enum LedgerError {
    /// The debit would take the account balance below zero
    InsufficientFunds {
        asset: String,
        available: Nat,
        required: Nat,
    },
}

impl From<LedgerError> for ConverterError {
    fn from(value: LedgerError) -> Self {
        ConverterError::Ledger(value)
    }
}

/// Reasons a genesis state is rejected on import.
#[derive(Clone, CandidType, Debug, Deserialize, PartialEq)]
pub enum GenesisError {
    DuplicateStrategy(String),
    DuplicateVoucher(String),
    UnknownStrategy { voucher_id: String, strategy: String },
    ZeroAmountVoucher(String),
    /// The sequence watermark must be strictly greater than the number of vouchers
    SequenceTooLow { next_voucher_seq: u64, vouchers: u64 },
}

impl From<GenesisError> for ConverterError {
    fn from(value: GenesisError) -> Self {
        ConverterError::Genesis(value)
    }
}

pub fn arithmetic_err<S: AsRef<str>>(s: S) -> ConverterError {
    ConverterError::Arithmetic(format!("{:#?}", s.as_ref()))
}

/// State corruption. These are never returned to a caller; see [`fatal`].
#[derive(Clone, CandidType, Debug, PartialEq)]
pub enum InvariantViolation {
    /// Custody holds less of the locked asset than an outstanding voucher requires
    CustodyShortfall {
        asset: String,
        custody: Nat,
        required: Nat,
    },
    /// An outstanding voucher references a strategy that is no longer registered
    MissingStrategy { voucher_id: String, strategy: String },
    /// The sequence produced an id that is already in use
    DuplicateVoucher(String),
    /// The voucher sequence counter cannot advance any further
    SequenceExhausted,
}

/// Aborts the enclosing operation. The surrounding replicated execution discards every write
/// made by the aborted call, so nothing is committed.
pub fn fatal(violation: InvariantViolation) -> ! {
    panic!("invariant violation: {:?}", violation)
}
