use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, AccountKind, Cents};

pub type RecordId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Deposit,
    Withdraw,
    Transfer,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Deposit => "Deposit",
            Action::Withdraw => "Withdraw",
            Action::Transfer => "Transfer",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed balance-affecting operation.
/// Records are immutable once the ledger has stored them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: RecordId,
    /// Ledger-wide append position, used to order ties
    pub sequence: u64,
    pub account_id: AccountId,
    pub action: Action,
    /// Amount in cents (positive for every record an account produces)
    pub amount: Cents,
    /// Kind of the account that produced the record, kept for display
    pub account_type: AccountKind,
    pub recorded_at: DateTime<Utc>,
}

/// Input for an append; the ledger assigns id, sequence and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub account_id: AccountId,
    pub action: Action,
    pub amount: Cents,
    pub account_type: AccountKind,
}

impl NewRecord {
    pub fn new(
        account_id: impl Into<AccountId>,
        action: Action,
        amount: Cents,
        account_type: AccountKind,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            action,
            amount,
            account_type,
        }
    }

    pub(crate) fn into_record(self, sequence: u64) -> TransactionRecord {
        TransactionRecord {
            id: Uuid::new_v4(),
            sequence,
            account_id: self.account_id,
            action: self.action,
            amount: self.amount,
            account_type: self.account_type,
            recorded_at: Utc::now(),
        }
    }
}
