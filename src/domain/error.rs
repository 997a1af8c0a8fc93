use thiserror::Error;

use super::{AccountId, Cents};

/// Failures of a single account operation. A failed operation changes nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Insufficient funds in account {account_id}: balance {balance}, required {required}")]
    InsufficientFunds {
        account_id: AccountId,
        balance: Cents,
        required: Cents,
    },

    #[error("Invalid amount: {0} (must be positive)")]
    InvalidAmount(Cents),

    #[error("Balance overflow in account {account_id}: balance {balance}, credit {amount}")]
    BalanceOverflow {
        account_id: AccountId,
        balance: Cents,
        amount: Cents,
    },
}
