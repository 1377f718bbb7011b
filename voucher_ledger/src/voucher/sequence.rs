//! Voucher id sequence
//!
//! The counter is a watermark: it advances once per voucher and never moves back, even when
//! vouchers are deleted. Public ids are the SHA-256 of `voucher-<seq>`, so the ordinal is not
//! exposed.

use sha2::{Digest, Sha256};

use crate::{
    constants::{INITIAL_VOUCHER_SEQ, VOUCHER_ID_PREFIX},
    utils::error::{fatal, InvariantViolation},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoucherSequence {
    /// `None` until the counter is first written
    next: Option<u64>,
}

impl VoucherSequence {
    pub fn starting_at(next: u64) -> Self {
        Self { next: Some(next) }
    }

    /// Current watermark, `INITIAL_VOUCHER_SEQ` if unset.
    pub fn current(&self) -> u64 {
        self.next.unwrap_or(INITIAL_VOUCHER_SEQ)
    }

    /// Issues the next voucher id and advances the counter.
    pub fn next_voucher_id(&mut self) -> String {
        let seq = self.current();
        let next = seq
            .checked_add(1)
            .unwrap_or_else(|| fatal(InvariantViolation::SequenceExhausted));
        self.next = Some(next);
        hash_voucher_seq(seq)
    }
}

/// Hashes the textual id of the given ordinal.
pub fn hash_voucher_seq(seq: u64) -> String {
    let textual = format!("{}{}", VOUCHER_ID_PREFIX, seq);
    hex::encode(Sha256::digest(textual.as_bytes()))
}
