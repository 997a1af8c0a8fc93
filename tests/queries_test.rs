mod common;

use anyhow::Result;
use bankledger::Bank;
use bankledger::domain::{AccountKind, Action, Cents};
use common::{SampleAccounts, dollars};

fn amounts(bank: &Bank, n: usize) -> Vec<Cents> {
    bank.top_n_transactions_overall(n)
        .into_iter()
        .map(|(_, r)| r.amount)
        .collect()
}

#[test]
fn test_top_n_length_is_bounded_by_record_count() -> Result<()> {
    let bank = Bank::new();
    SampleAccounts::create_with_history(&bank)?;

    assert_eq!(bank.top_n_transactions_overall(2).len(), 2);
    assert_eq!(bank.top_n_transactions_overall(5).len(), 5);
    assert_eq!(bank.top_n_transactions_overall(50).len(), 5);
    assert!(bank.top_n_transactions_overall(0).is_empty());

    Ok(())
}

#[test]
fn test_top_n_is_sorted_descending() -> Result<()> {
    let bank = Bank::new();
    SampleAccounts::create(&bank)?;
    for amount in [3, 9, 1, 7, 7, 2] {
        bank.deposit("A123", dollars(amount))?;
    }

    let ranked = amounts(&bank, 10);
    let mut sorted = ranked.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(ranked, sorted);

    Ok(())
}

#[test]
fn test_ties_keep_insertion_order_across_accounts() -> Result<()> {
    let bank = Bank::new();
    SampleAccounts::create(&bank)?;

    let first = bank.deposit("B456", dollars(50))?.expect("applied");
    let second = bank.deposit("A123", dollars(50))?.expect("applied");
    let third = bank.withdraw("B456", dollars(50))?;

    let ids: Vec<_> = bank
        .top_n_transactions_overall(3)
        .into_iter()
        .map(|(_, r)| r.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);

    let (_, largest) = bank.largest_transaction_overall().expect("records exist");
    assert_eq!(largest.id, first.id);

    Ok(())
}

#[test]
fn test_queries_on_empty_ledger() {
    let bank = Bank::new();

    assert!(bank.largest_transaction_overall().is_none());
    assert!(bank.top_n_transactions_overall(3).is_empty());
    assert!(bank.largest_transaction_for("A123").is_none());
}

#[test]
fn test_records_carry_account_kind() -> Result<()> {
    let bank = Bank::new();
    SampleAccounts::create_with_history(&bank)?;

    for (account_id, record) in bank.top_n_transactions_overall(10) {
        let expected = if account_id == "A123" {
            AccountKind::Savings
        } else {
            AccountKind::Checking
        };
        assert_eq!(record.account_type, expected);
        assert_eq!(record.account_id, account_id);
    }

    Ok(())
}

#[test]
fn test_largest_for_ignores_other_accounts() -> Result<()> {
    let bank = Bank::new();
    SampleAccounts::create(&bank)?;
    bank.deposit("A123", dollars(10))?;
    bank.deposit("B456", dollars(900))?;

    let record = bank.largest_transaction_for("A123").expect("A123 has a deposit");
    assert_eq!(record.amount, dollars(10));
    assert_eq!(record.action, Action::Deposit);

    Ok(())
}
