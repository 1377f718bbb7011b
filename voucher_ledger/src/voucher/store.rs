//! Voucher store with an owner index for enumeration.

use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::U256;
use icrc_ledger_types::icrc1::account::Account;

use crate::utils::error::{fatal, InvariantViolation};

use super::record::Voucher;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VoucherStore {
    vouchers: BTreeMap<String, Voucher>,
    by_owner: BTreeSet<(Account, String)>,
}

impl VoucherStore {
    /// Persists a new voucher and indexes it by owner.
    /// Ids come from the sequence, so a collision means the state is corrupted.
    pub fn insert(&mut self, voucher: Voucher) {
        if self.vouchers.contains_key(&voucher.id) {
            fatal(InvariantViolation::DuplicateVoucher(voucher.id));
        }
        self.by_owner.insert((voucher.owner, voucher.id.clone()));
        self.vouchers.insert(voucher.id.clone(), voucher);
    }

    pub fn get(&self, id: &str) -> Option<&Voucher> {
        self.vouchers.get(id)
    }

    /// Deletes the voucher and its index entry.
    pub fn remove(&mut self, id: &str) -> Option<Voucher> {
        let voucher = self.vouchers.remove(id)?;
        self.by_owner.remove(&(voucher.owner, voucher.id.clone()));
        Some(voucher)
    }

    /// Vouchers of `owner`, ordered by id.
    pub fn by_owner(&self, owner: &Account) -> impl Iterator<Item = &Voucher> + '_ {
        let owner = *owner;
        self.by_owner
            .range((owner, String::new())..)
            .take_while(move |(account, _)| *account == owner)
            .filter_map(move |(_, id)| self.vouchers.get(id))
    }

    /// All outstanding vouchers, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Voucher> {
        self.vouchers.values()
    }

    /// Sum of all locked amounts. Saturates, which can only matter for corrupted state.
    pub fn total_locked(&self) -> U256 {
        self.vouchers
            .values()
            .fold(U256::ZERO, |total, voucher| total.saturating_add(voucher.amount))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.vouchers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.vouchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vouchers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candid::Principal;

    fn account(byte: u8) -> Account {
        Account {
            owner: Principal::from_slice(&[byte]),
            subaccount: None,
        }
    }

    fn voucher(id: &str, owner: Account, amount: u64) -> Voucher {
        Voucher {
            id: id.to_string(),
            owner,
            strategy: "90days".to_string(),
            amount: U256::from(amount),
            created_time: 0,
        }
    }

    #[test]
    fn test_insert_get_remove() {
        let mut store = VoucherStore::default();
        store.insert(voucher("a", account(1), 5));

        assert!(store.contains("a"));
        assert_eq!(store.get("a").unwrap().amount, U256::from(5u64));

        let removed = store.remove("a").unwrap();
        assert_eq!(removed.id, "a");
        assert!(store.is_empty());
        assert_eq!(store.by_owner(&account(1)).count(), 0);
        assert!(store.remove("a").is_none());
    }

    #[test]
    fn test_owner_index() {
        let mut store = VoucherStore::default();
        store.insert(voucher("b", account(1), 1));
        store.insert(voucher("a", account(1), 2));
        store.insert(voucher("c", account(2), 3));

        let ids: Vec<&str> = store.by_owner(&account(1)).map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        let ids: Vec<&str> = store.by_owner(&account(2)).map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
        assert_eq!(store.by_owner(&account(3)).count(), 0);
    }

    #[test]
    fn test_owner_iterator_outlives_the_owner_argument() {
        let mut store = VoucherStore::default();
        store.insert(voucher("a", account(1), 1));

        let vouchers = {
            let owner = account(1);
            store.by_owner(&owner)
        };
        assert_eq!(vouchers.map(|v| v.id.clone()).collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_subaccounts_are_separate_owners() {
        let mut store = VoucherStore::default();
        let main = account(1);
        let sub = Account {
            owner: main.owner,
            subaccount: Some([1u8; 32]),
        };
        store.insert(voucher("a", main, 1));
        store.insert(voucher("b", sub, 1));

        assert_eq!(store.by_owner(&main).count(), 1);
        assert_eq!(store.by_owner(&sub).count(), 1);
    }

    #[test]
    fn test_total_locked() {
        let mut store = VoucherStore::default();
        store.insert(voucher("a", account(1), 5));
        store.insert(voucher("b", account(2), 7));
        assert_eq!(store.total_locked(), U256::from(12u64));
    }

    #[test]
    #[should_panic(expected = "DuplicateVoucher")]
    fn test_duplicate_insert_is_fatal() {
        let mut store = VoucherStore::default();
        store.insert(voucher("a", account(1), 5));
        store.insert(voucher("a", account(2), 5));
    }
}
