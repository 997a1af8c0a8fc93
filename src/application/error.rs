use thiserror::Error;

use crate::domain::AccountError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Account not found: {0}")]
    UnknownAccount(String),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error(transparent)]
    Account(#[from] AccountError),
}
