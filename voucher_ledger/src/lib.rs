pub mod config;
pub mod constants;
pub mod conversion;
pub mod genesis;
pub mod journal;
pub mod ledger;
pub mod state;
pub mod strategy;
pub mod types;
pub mod utils;
pub mod voucher;

pub use config::ConverterConfig;
pub use conversion::ConversionEngine;
pub use genesis::GenesisState;
pub use ledger::{Clock, Ledger, ManualClock, MemoryLedger};
pub use state::ConverterState;
pub use types::{Account, LockOutcome, WithdrawOutcome};
pub use utils::error::{ConverterError, ConverterResult, InvariantViolation};
