use bankledger::Bank;
use bankledger::domain::{AccountKind, Cents};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Deposit(usize, Cents),
    Withdraw(usize, Cents),
    Transfer(usize, usize, Cents),
}

const IDS: [&str; 3] = ["A123", "B456", "C789"];

fn op() -> impl Strategy<Value = Op> {
    let account = 0..IDS.len();
    let amount = -50i64..2_000;
    prop_oneof![
        (account.clone(), amount.clone()).prop_map(|(a, m)| Op::Deposit(a, m)),
        (account.clone(), amount.clone()).prop_map(|(a, m)| Op::Withdraw(a, m)),
        (account.clone(), account, amount).prop_map(|(a, b, m)| Op::Transfer(a, b, m)),
    ]
}

proptest! {
    #[test]
    fn balances_follow_the_applied_operations(
        initial in prop::collection::vec(0i64..5_000, IDS.len()),
        ops in prop::collection::vec(op(), 0..60),
    ) {
        let bank = Bank::new();
        for (id, balance) in IDS.iter().zip(&initial) {
            bank.create_account(id, AccountKind::Checking, *balance).unwrap();
        }

        let mut expected = initial.clone();
        let mut records = 0;

        for op in ops {
            let before = bank.ledger().len();
            match op {
                Op::Deposit(a, amount) => {
                    if bank.deposit(IDS[a], amount).unwrap().is_some() {
                        expected[a] += amount;
                        records += 1;
                    }
                }
                Op::Withdraw(a, amount) => {
                    if bank.withdraw(IDS[a], amount).is_ok() {
                        expected[a] -= amount;
                        records += 1;
                    }
                }
                Op::Transfer(a, b, amount) => {
                    if bank.transfer(IDS[a], IDS[b], amount).is_ok() {
                        expected[a] -= amount;
                        expected[b] += amount;
                        records += 2;
                    }
                }
            }
            prop_assert!(bank.ledger().len() >= before);
        }

        for (a, id) in IDS.iter().enumerate() {
            prop_assert_eq!(bank.balance(id).unwrap(), expected[a]);
            prop_assert!(expected[a] >= 0);
        }
        prop_assert_eq!(bank.ledger().len(), records);
    }

    #[test]
    fn top_n_is_sorted_and_bounded(
        amounts in prop::collection::vec(1i64..500, 0..40),
        n in 0usize..50,
    ) {
        let bank = Bank::new();
        bank.create_account("A123", AccountKind::Savings, 0).unwrap();
        for amount in &amounts {
            bank.deposit("A123", *amount).unwrap();
        }

        let top = bank.top_n_transactions_overall(n);
        prop_assert_eq!(top.len(), n.min(amounts.len()));
        for pair in top.windows(2) {
            let (a, b) = (&pair[0].1, &pair[1].1);
            prop_assert!(a.amount > b.amount || (a.amount == b.amount && a.sequence < b.sequence));
        }
    }
}
