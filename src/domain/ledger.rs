use std::cmp::Ordering;
use std::collections::HashMap;

use parking_lot::RwLock;

use super::{AccountId, AccountKind, Action, Cents, NewRecord, TransactionRecord};

/// Append-only store of every balance-affecting operation, keyed by account.
///
/// One ledger is shared (behind an `Arc`) by all accounts of a bank. Appends
/// take the write lock and queries the read lock, so a query always sees
/// whole appends, including both halves of a transfer.
#[derive(Debug, Default)]
pub struct Ledger {
    inner: RwLock<LedgerState>,
}

#[derive(Debug, Default)]
struct LedgerState {
    transactions: HashMap<AccountId, Vec<TransactionRecord>>,
    next_sequence: u64,
}

impl LedgerState {
    fn append(&mut self, entry: NewRecord) -> TransactionRecord {
        let record = entry.into_record(self.next_sequence);
        self.next_sequence += 1;
        self.transactions
            .entry(record.account_id.clone())
            .or_default()
            .push(record.clone());
        record
    }

    fn all(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.transactions.values().flatten()
    }
}

/// Ranking order: larger amount first, earlier record first among equals.
fn rank(a: &TransactionRecord, b: &TransactionRecord) -> Ordering {
    b.amount
        .cmp(&a.amount)
        .then_with(|| a.sequence.cmp(&b.sequence))
}

/// The best-ranked record. `Iterator::max_by_key` keeps the last maximum,
/// which would break the earliest-wins tie rule.
fn best<'a>(iter: impl Iterator<Item = &'a TransactionRecord>) -> Option<&'a TransactionRecord> {
    iter.min_by(|a, b| rank(a, b))
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record for `account_id`. No validation is done here; accounts
    /// only record operations that already succeeded.
    pub fn record(
        &self,
        account_id: &str,
        action: Action,
        amount: Cents,
        account_type: AccountKind,
    ) -> TransactionRecord {
        self.inner
            .write()
            .append(NewRecord::new(account_id, action, amount, account_type))
    }

    /// Append several records as one unit: readers see all of them or none.
    pub(crate) fn record_batch<const N: usize>(
        &self,
        entries: [NewRecord; N],
    ) -> [TransactionRecord; N] {
        let mut state = self.inner.write();
        entries.map(|entry| state.append(entry))
    }

    /// The largest record across all accounts, or `None` when the ledger is
    /// empty. On equal amounts the earliest record wins.
    pub fn largest_transaction_overall(&self) -> Option<(AccountId, TransactionRecord)> {
        let state = self.inner.read();
        best(state.all()).map(|record| (record.account_id.clone(), record.clone()))
    }

    /// Up to `n` records across all accounts, largest first. Records with
    /// equal amounts keep the order they were recorded in.
    pub fn top_n_transactions_overall(&self, n: usize) -> Vec<(AccountId, TransactionRecord)> {
        if n == 0 {
            return Vec::new();
        }

        let state = self.inner.read();
        let mut ranked: Vec<&TransactionRecord> = state.all().collect();
        ranked.sort_by(|a, b| rank(a, b));

        ranked
            .into_iter()
            .take(n)
            .map(|record| (record.account_id.clone(), record.clone()))
            .collect()
    }

    /// The largest record of one account, or `None` if the account is unknown
    /// or has no records.
    pub fn largest_transaction_for(&self, account_id: &str) -> Option<TransactionRecord> {
        let state = self.inner.read();
        state
            .transactions
            .get(account_id)
            .and_then(|records| best(records.iter()))
            .cloned()
    }

    /// All records of one account in the order they were recorded.
    pub fn transactions_for(&self, account_id: &str) -> Vec<TransactionRecord> {
        self.inner
            .read()
            .transactions
            .get(account_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.inner.read().next_sequence as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
