//! Operation journal
//!
//! Every engine operation leaves one entry, successful or not. Entries are Candid encoded
//! into a stable B-tree keyed by a monotonically increasing index, and the oldest entries are
//! pruned once the retention limit is exceeded.

use std::borrow::Cow;

use candid::{CandidType, Decode, Encode};
use ic_stable_structures::{storable::Bound, StableBTreeMap, Storable, VectorMemory};
use icrc_ledger_types::icrc1::account::Account;
use serde::Deserialize;

use crate::utils::error::ConverterResult;

/// Category of a journal entry
#[derive(Clone, CandidType, Debug, Deserialize, PartialEq)]
pub enum LogType {
    Conversion,
    Lock,
    Redemption,
    Cancellation,
    Strategy,
    Genesis,
}

/// Journal entry
#[derive(Clone, CandidType, Debug, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub timestamp: u64,
    pub entry: ConverterResult<()>,
    pub log_type: LogType,
    pub voucher_id: Option<String>,
    pub owner: Option<Account>,
    pub strategy: Option<String>,
    pub note: Option<String>,
}

/// Builder for journal entries
impl JournalEntry {
    /// Create a new instance of a journal entry
    /// Fills the `timestamp`, `entry` and `log_type` fields
    pub fn new(timestamp: u64, entry: ConverterResult<()>, log_type: LogType) -> Self {
        Self {
            timestamp,
            entry,
            log_type,
            voucher_id: None,
            owner: None,
            strategy: None,
            note: None,
        }
    }

    /// Fills the `voucher_id` field of the entry
    pub fn voucher<S: AsRef<str>>(&mut self, id: S) -> &mut Self {
        self.voucher_id = Some(id.as_ref().to_string());
        self
    }

    /// Fills the `owner` field of the entry
    pub fn owner(&mut self, owner: Account) -> &mut Self {
        self.owner = Some(owner);
        self
    }

    /// Fills the `strategy` field of the entry
    pub fn strategy<S: AsRef<str>>(&mut self, name: S) -> &mut Self {
        self.strategy = Some(name.as_ref().to_string());
        self
    }

    /// Fills the `note` field of the entry
    pub fn note<S: AsRef<str>>(&mut self, text: S) -> &mut Self {
        self.note = Some(text.as_ref().to_string());
        self
    }

    /// Commits the entry to the journal
    pub fn commit(&mut self, journal: &mut Journal) {
        journal.append(self.clone());
    }
}

impl Storable for JournalEntry {
    fn to_bytes(&self) -> std::borrow::Cow<[u8]> {
        Cow::Owned(Encode!(self).expect("journal entries are always encodable"))
    }

    fn from_bytes(bytes: std::borrow::Cow<[u8]>) -> Self {
        Decode!(bytes.as_ref(), Self).expect("journal entries are written by `to_bytes`")
    }

    const BOUND: Bound = Bound::Unbounded;
}

/// Bounded, append-only log of engine operations.
pub struct Journal {
    entries: StableBTreeMap<u64, JournalEntry, VectorMemory>,
    next_index: u64,
    retention: u64,
}

impl Journal {
    pub fn new(retention: u64) -> Self {
        Self {
            entries: StableBTreeMap::init(VectorMemory::default()),
            next_index: 0,
            retention,
        }
    }

    /// Appends an entry and drops the oldest ones past the retention limit.
    pub fn append(&mut self, entry: JournalEntry) {
        self.entries.insert(self.next_index, entry);
        self.next_index += 1;
        self.prune(self.retention);
    }

    /// Keeps only the `keep` most recent entries.
    pub fn prune(&mut self, keep: u64) {
        let excess = self.entries.len().saturating_sub(keep);
        let stale: Vec<u64> = self
            .entries
            .iter()
            .take(excess as usize)
            .map(|(index, _)| index)
            .collect();
        for index in stale {
            self.entries.remove(&index);
        }
    }

    /// Entries from oldest to newest.
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.iter().map(|(_, entry)| entry).collect()
    }

    pub fn last(&self) -> Option<JournalEntry> {
        self.next_index
            .checked_sub(1)
            .and_then(|index| self.entries.get(&index))
    }

    pub fn len(&self) -> u64 {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }
}
