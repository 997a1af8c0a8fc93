// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use bankledger::Bank;
use bankledger::domain::{AccountKind, Cents};

/// Whole currency units to cents
pub fn dollars(units: i64) -> Cents {
    units * 100
}

/// Test fixture: the two accounts of the sample session
pub struct SampleAccounts;

impl SampleAccounts {
    /// Savings A123 with $500 and Checking B456 with $300
    pub fn create(bank: &Bank) -> Result<()> {
        bank.create_account("A123", AccountKind::Savings, dollars(500))?;
        bank.create_account("B456", AccountKind::Checking, dollars(300))?;
        Ok(())
    }

    /// Create the accounts and replay the sample movements
    pub fn create_with_history(bank: &Bank) -> Result<()> {
        Self::create(bank)?;
        bank.deposit("A123", dollars(100))?;
        bank.deposit("B456", dollars(700))?;
        bank.withdraw("A123", dollars(200))?;
        bank.transfer("B456", "A123", dollars(150))?;
        Ok(())
    }
}
