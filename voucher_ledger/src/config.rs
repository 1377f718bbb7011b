//! Engine configuration

use candid::Principal;
use icrc_ledger_types::icrc1::account::Account;

use crate::constants::{
    default_custody, DEFAULT_DESTINATION_ASSET, DEFAULT_SOURCE_ASSET, JOURNAL_RETENTION,
};

/// Settings fixed for the lifetime of an engine
#[derive(Clone, Debug, PartialEq)]
pub struct ConverterConfig {
    /// Asset that is locked into vouchers
    pub source_asset: String,
    /// Asset that vouchers release into
    pub destination_asset: String,
    /// Module account holding locked funds
    pub custody: Account,
    /// Principals allowed to register strategies after genesis
    pub admins: Vec<Principal>,
    /// Number of journal entries kept
    pub journal_retention: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            source_asset: DEFAULT_SOURCE_ASSET.to_string(),
            destination_asset: DEFAULT_DESTINATION_ASSET.to_string(),
            custody: default_custody(),
            admins: vec![],
            journal_retention: JOURNAL_RETENTION,
        }
    }
}

impl ConverterConfig {
    pub fn source_asset<S: AsRef<str>>(&mut self, asset: S) -> &mut Self {
        self.source_asset = asset.as_ref().to_string();
        self
    }

    pub fn destination_asset<S: AsRef<str>>(&mut self, asset: S) -> &mut Self {
        self.destination_asset = asset.as_ref().to_string();
        self
    }

    pub fn custody(&mut self, custody: Account) -> &mut Self {
        self.custody = custody;
        self
    }

    pub fn admins(&mut self, admins: Vec<Principal>) -> &mut Self {
        self.admins = admins;
        self
    }

    pub fn journal_retention(&mut self, retention: u64) -> &mut Self {
        self.journal_retention = retention;
        self
    }
}
