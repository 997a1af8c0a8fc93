use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::{
    Account, AccountId, AccountKind, Cents, Ledger, TransactionRecord, TransferReceipt,
};

use super::AppError;

/// Registry of accounts sharing one ledger.
/// This is the primary interface for any driver (script runner, CLI, tests).
#[derive(Debug)]
pub struct Bank {
    ledger: Arc<Ledger>,
    accounts: RwLock<HashMap<AccountId, Arc<Account>>>,
}

impl Default for Bank {
    fn default() -> Self {
        Self::new()
    }
}

impl Bank {
    /// Create a bank with a fresh ledger.
    pub fn new() -> Self {
        Self::with_ledger(Arc::new(Ledger::new()))
    }

    /// Create a bank around an existing ledger handle.
    pub fn with_ledger(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            accounts: RwLock::new(HashMap::new()),
        }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    // ========================
    // Account operations
    // ========================

    /// Open a new account wired to this bank's ledger.
    pub fn create_account(
        &self,
        id: &str,
        kind: AccountKind,
        initial_balance: Cents,
    ) -> Result<Arc<Account>, AppError> {
        let mut accounts = self.accounts.write();
        match accounts.entry(id.to_string()) {
            Entry::Occupied(_) => Err(AppError::AccountAlreadyExists(id.to_string())),
            Entry::Vacant(slot) => {
                let account = Arc::new(Account::open(
                    id,
                    kind,
                    initial_balance,
                    self.ledger.clone(),
                ));
                slot.insert(account.clone());
                info!(account = id, kind = %kind, balance = initial_balance, "account created");
                Ok(account)
            }
        }
    }

    /// Look up an account by id.
    pub fn account(&self, id: &str) -> Result<Arc<Account>, AppError> {
        self.accounts
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::UnknownAccount(id.to_string()))
    }

    /// All accounts, sorted by id.
    pub fn accounts(&self) -> Vec<Arc<Account>> {
        let mut accounts: Vec<Arc<Account>> = self.accounts.read().values().cloned().collect();
        accounts.sort_by(|a, b| a.id().cmp(b.id()));
        accounts
    }

    pub fn balance(&self, id: &str) -> Result<Cents, AppError> {
        Ok(self.account(id)?.balance())
    }

    // ========================
    // Money movement
    // ========================

    /// Deposit into an account. Non-positive amounts are ignored (`Ok(None)`).
    pub fn deposit(&self, id: &str, amount: Cents) -> Result<Option<TransactionRecord>, AppError> {
        let account = self.account(id)?;
        Ok(account.deposit(amount)?)
    }

    pub fn withdraw(&self, id: &str, amount: Cents) -> Result<TransactionRecord, AppError> {
        let account = self.account(id)?;
        Ok(account.withdraw(amount)?)
    }

    /// Transfer between two accounts. Both must exist before anything moves.
    pub fn transfer(
        &self,
        from_id: &str,
        to_id: &str,
        amount: Cents,
    ) -> Result<TransferReceipt, AppError> {
        let source = self.account(from_id)?;
        let target = self.account(to_id)?;
        let receipt = source.transfer(amount, &target)?;
        debug!(from = from_id, to = to_id, amount, "transfer completed");
        Ok(receipt)
    }

    // ========================
    // Queries
    // ========================

    pub fn largest_transaction_overall(&self) -> Option<(AccountId, TransactionRecord)> {
        self.ledger.largest_transaction_overall()
    }

    pub fn top_n_transactions_overall(&self, n: usize) -> Vec<(AccountId, TransactionRecord)> {
        self.ledger.top_n_transactions_overall(n)
    }

    /// Largest record of an account the ledger knows about. Unlike the
    /// movement operations this does not require a registered account.
    pub fn largest_transaction_for(&self, id: &str) -> Option<TransactionRecord> {
        self.ledger.largest_transaction_for(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountError, Action};

    #[test]
    fn test_create_and_lookup() {
        let bank = Bank::new();
        let created = bank.create_account("A123", AccountKind::Savings, 50000).unwrap();

        let found = bank.account("A123").unwrap();
        assert!(Arc::ptr_eq(&created, &found));

        // Accounts record into the bank's own ledger.
        found.deposit(100).unwrap();
        assert_eq!(bank.ledger().transactions_for("A123").len(), 1);
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let bank = Bank::new();
        bank.create_account("A123", AccountKind::Savings, 50000).unwrap();

        let err = bank
            .create_account("A123", AccountKind::Checking, 0)
            .unwrap_err();
        assert_eq!(err, AppError::AccountAlreadyExists("A123".into()));
        assert_eq!(bank.account("A123").unwrap().kind(), AccountKind::Savings);
    }

    #[test]
    fn test_unknown_account() {
        let bank = Bank::new();
        assert_eq!(
            bank.deposit("Z000", 100).unwrap_err(),
            AppError::UnknownAccount("Z000".into())
        );
        assert!(matches!(bank.balance("Z000"), Err(AppError::UnknownAccount(_))));
    }

    #[test]
    fn test_transfer_to_unknown_target_moves_nothing() {
        let bank = Bank::new();
        bank.create_account("A123", AccountKind::Savings, 50000).unwrap();

        let err = bank.transfer("A123", "Z000", 100).unwrap_err();
        assert_eq!(err, AppError::UnknownAccount("Z000".into()));
        assert_eq!(bank.balance("A123").unwrap(), 50000);
        assert!(bank.ledger().is_empty());
    }

    #[test]
    fn test_account_errors_pass_through() {
        let bank = Bank::new();
        bank.create_account("A123", AccountKind::Savings, 100).unwrap();

        let err = bank.withdraw("A123", 200).unwrap_err();
        assert!(matches!(
            err,
            AppError::Account(AccountError::InsufficientFunds { .. })
        ));
        assert_eq!(
            err.to_string(),
            "Insufficient funds in account A123: balance 100, required 200"
        );
    }

    #[test]
    fn test_overflowing_deposit_passes_through() {
        let bank = Bank::new();
        bank.create_account("A123", AccountKind::Savings, Cents::MAX).unwrap();

        let err = bank.deposit("A123", 1).unwrap_err();
        assert!(matches!(
            err,
            AppError::Account(AccountError::BalanceOverflow { .. })
        ));
        assert_eq!(bank.balance("A123").unwrap(), Cents::MAX);
        assert!(bank.ledger().is_empty());
    }

    #[test]
    fn test_accounts_sorted() {
        let bank = Bank::new();
        bank.create_account("B456", AccountKind::Checking, 0).unwrap();
        bank.create_account("A123", AccountKind::Savings, 0).unwrap();

        let ids: Vec<String> = bank.accounts().iter().map(|a| a.id().to_string()).collect();
        assert_eq!(ids, vec!["A123", "B456"]);
    }

    #[test]
    fn test_queries_delegate_to_ledger() {
        let bank = Bank::new();
        bank.create_account("A123", AccountKind::Savings, 0).unwrap();
        bank.deposit("A123", 500).unwrap();

        let record = bank.largest_transaction_for("A123").unwrap();
        assert_eq!(record.action, Action::Deposit);
        assert_eq!(record.amount, 500);
        assert_eq!(bank.top_n_transactions_overall(3).len(), 1);
    }
}
