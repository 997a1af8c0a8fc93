use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AccountError, Action, Cents, Ledger, NewRecord, TransactionRecord};

pub type AccountId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    Savings,
    Checking,
}

impl AccountKind {
    /// Label attached to every record the account produces.
    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Savings => "Savings",
            AccountKind::Checking => "Checking",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "savings" => Some(AccountKind::Savings),
            "checking" => Some(AccountKind::Checking),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The two records a successful transfer appends under the source account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub withdrawal: TransactionRecord,
    pub transfer: TransactionRecord,
}

/// A balance-holding account.
///
/// Deposit, withdraw and transfer are the only ways to change the balance, and
/// each holds the account lock while it appends to the ledger and updates the
/// balance, so the two never diverge.
#[derive(Debug)]
pub struct Account {
    id: AccountId,
    kind: AccountKind,
    balance: Mutex<Cents>,
    ledger: Arc<Ledger>,
}

impl Account {
    /// Open an account. The opening balance is not recorded in the ledger.
    pub fn open(
        id: impl Into<AccountId>,
        kind: AccountKind,
        initial_balance: Cents,
        ledger: Arc<Ledger>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            balance: Mutex::new(initial_balance),
            ledger,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn balance(&self) -> Cents {
        *self.balance.lock()
    }

    /// Credit the account.
    ///
    /// A non-positive amount is silently ignored: nothing is applied, nothing
    /// is recorded and no error is returned (`Ok(None)`). The only failure is a
    /// credit the balance cannot hold, which also changes nothing.
    pub fn deposit(&self, amount: Cents) -> Result<Option<TransactionRecord>, AccountError> {
        if amount <= 0 {
            debug!(account = %self.id, amount, "ignoring non-positive deposit");
            return Ok(None);
        }

        let mut balance = self.balance.lock();
        let credited = self.credited(*balance, amount)?;

        let record = self
            .ledger
            .record(&self.id, Action::Deposit, amount, self.kind);
        *balance = credited;

        debug!(account = %self.id, amount, balance = *balance, "deposit applied");
        Ok(Some(record))
    }

    /// Debit the account. Fails without side effects when the amount is not
    /// positive or exceeds the balance.
    pub fn withdraw(&self, amount: Cents) -> Result<TransactionRecord, AccountError> {
        validate_amount(amount)?;

        let mut balance = self.balance.lock();
        self.ensure_funds(*balance, amount)?;

        let record = self
            .ledger
            .record(&self.id, Action::Withdraw, amount, self.kind);
        *balance -= amount;

        debug!(account = %self.id, amount, balance = *balance, "withdrawal applied");
        Ok(record)
    }

    /// Move `amount` from this account to `target`.
    ///
    /// On success the source gets a Withdraw record followed by a Transfer
    /// record; the target's balance changes but nothing is recorded under it.
    /// Both accounts stay locked for the whole operation.
    pub fn transfer(
        &self,
        amount: Cents,
        target: &Account,
    ) -> Result<TransferReceipt, AccountError> {
        validate_amount(amount)?;

        if std::ptr::eq(self, target) {
            // Debit and credit cancel out; the audit trail is still written.
            let balance = self.balance.lock();
            self.ensure_funds(*balance, amount)?;
            let receipt = self.record_transfer(amount);
            debug!(account = %self.id, amount, "self-transfer recorded");
            return Ok(receipt);
        }

        let (mut source, mut destination) = lock_pair(self, target);
        self.ensure_funds(*source, amount)?;
        // Both new balances are known before anything is recorded.
        let debited = *source - amount;
        let credited = target.credited(*destination, amount)?;

        let receipt = self.record_transfer(amount);
        *source = debited;
        *destination = credited;

        debug!(
            from = %self.id,
            to = %target.id,
            amount,
            balance = *source,
            "transfer applied"
        );
        Ok(receipt)
    }

    fn record_transfer(&self, amount: Cents) -> TransferReceipt {
        let [withdrawal, transfer] = self.ledger.record_batch([
            NewRecord::new(self.id.as_str(), Action::Withdraw, amount, self.kind),
            NewRecord::new(self.id.as_str(), Action::Transfer, amount, self.kind),
        ]);
        TransferReceipt {
            withdrawal,
            transfer,
        }
    }

    fn ensure_funds(&self, balance: Cents, amount: Cents) -> Result<(), AccountError> {
        if balance < amount {
            warn!(account = %self.id, balance, required = amount, "insufficient funds");
            return Err(AccountError::InsufficientFunds {
                account_id: self.id.clone(),
                balance,
                required: amount,
            });
        }
        Ok(())
    }

    fn credited(&self, balance: Cents, amount: Cents) -> Result<Cents, AccountError> {
        balance.checked_add(amount).ok_or_else(|| {
            warn!(account = %self.id, balance, amount, "credit would overflow balance");
            AccountError::BalanceOverflow {
                account_id: self.id.clone(),
                balance,
                amount,
            }
        })
    }

    /// Total lock order: account id, then address for distinct accounts that
    /// share an id.
    fn lock_key(&self) -> (&str, usize) {
        (&self.id, self as *const Account as usize)
    }
}

fn validate_amount(amount: Cents) -> Result<(), AccountError> {
    if amount <= 0 {
        return Err(AccountError::InvalidAmount(amount));
    }
    Ok(())
}

/// Lock two distinct accounts in lock-key order and return the guards as
/// (source, target).
fn lock_pair<'a>(
    source: &'a Account,
    target: &'a Account,
) -> (MutexGuard<'a, Cents>, MutexGuard<'a, Cents>) {
    if source.lock_key() < target.lock_key() {
        let s = source.balance.lock();
        let t = target.balance.lock();
        (s, t)
    } else {
        let t = target.balance.lock();
        let s = source.balance.lock();
        (s, t)
    }
}
