use std::io::Read;

use serde::Serialize;
use thiserror::Error;

use crate::application::{AppError, Bank};
use crate::domain::{self, AccountId, AccountKind, Cents, ParseCentsError, TransactionRecord};

/// The sample session the command layer has always shipped with.
pub const SAMPLE_SCRIPT: &str = "\
# Two accounts, a few movements, then every ranking query
CREATE_ACCOUNT,A123,Savings,500
CREATE_ACCOUNT,B456,Checking,300
DEPOSIT,A123,100
DEPOSIT,B456,700
WITHDRAW,A123,200
TRANSFER,B456,A123,150
FIND_LARGEST_TRANSACTION_ALL
FIND_TOP_N_TRANSACTIONS_ALL,5
FIND_LARGEST_TRANACTION,A123
";

/// One driver command. Amounts are already converted to cents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateAccount {
        id: AccountId,
        kind: AccountKind,
        initial_balance: Cents,
    },
    Deposit {
        id: AccountId,
        amount: Cents,
    },
    Withdraw {
        id: AccountId,
        amount: Cents,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Cents,
    },
    LargestTransactionAll,
    TopNTransactionsAll {
        n: usize,
    },
    LargestTransactionFor {
        id: AccountId,
    },
    Balance {
        id: AccountId,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateAccount { .. } => "CREATE_ACCOUNT",
            Command::Deposit { .. } => "DEPOSIT",
            Command::Withdraw { .. } => "WITHDRAW",
            Command::Transfer { .. } => "TRANSFER",
            Command::LargestTransactionAll => "FIND_LARGEST_TRANSACTION_ALL",
            Command::TopNTransactionsAll { .. } => "FIND_TOP_N_TRANSACTIONS_ALL",
            Command::LargestTransactionFor { .. } => "FIND_LARGEST_TRANSACTION",
            Command::Balance { .. } => "BALANCE",
        }
    }
}

/// A parsed command together with the script line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub line: u64,
    pub command: Command,
}

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: unknown command '{name}'")]
    UnknownCommand { line: u64, name: String },

    #[error("line {line}: {name} expects {expected} argument(s), got {got}")]
    WrongArity {
        line: u64,
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: unknown account kind '{kind}' (expected Savings or Checking)")]
    UnknownKind { line: u64, kind: String },

    #[error("line {line}: {source}")]
    InvalidAmount {
        line: u64,
        #[source]
        source: ParseCentsError,
    },

    #[error("line {line}: invalid transaction count '{value}'")]
    InvalidCount { line: u64, value: String },
}

/// Parse a command script: CSV rows without a header, one command per row,
/// `#` starting a comment line.
pub fn parse_script<R: Read>(reader: R) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut lines = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let fields: Vec<&str> = record.iter().collect();
        lines.push(ScriptLine {
            line,
            command: parse_command(line, &fields)?,
        });
    }
    Ok(lines)
}

fn parse_command(line: u64, fields: &[&str]) -> Result<Command, ScriptError> {
    let (name, args) = match fields.split_first() {
        Some((name, args)) => (name.to_uppercase(), args),
        None => {
            return Err(ScriptError::UnknownCommand {
                line,
                name: String::new(),
            });
        }
    };

    let arity = |name: &'static str, expected: usize| -> Result<(), ScriptError> {
        if args.len() != expected {
            return Err(ScriptError::WrongArity {
                line,
                name,
                expected,
                got: args.len(),
            });
        }
        Ok(())
    };
    let amount = |value: &str| {
        domain::parse_cents(value).map_err(|source| ScriptError::InvalidAmount { line, source })
    };

    let command = match name.as_str() {
        "CREATE_ACCOUNT" => {
            arity("CREATE_ACCOUNT", 3)?;
            let kind = AccountKind::from_str(args[1]).ok_or_else(|| ScriptError::UnknownKind {
                line,
                kind: args[1].to_string(),
            })?;
            Command::CreateAccount {
                id: args[0].to_string(),
                kind,
                initial_balance: amount(args[2])?,
            }
        }
        "DEPOSIT" => {
            arity("DEPOSIT", 2)?;
            Command::Deposit {
                id: args[0].to_string(),
                amount: amount(args[1])?,
            }
        }
        "WITHDRAW" => {
            arity("WITHDRAW", 2)?;
            Command::Withdraw {
                id: args[0].to_string(),
                amount: amount(args[1])?,
            }
        }
        "TRANSFER" => {
            arity("TRANSFER", 3)?;
            Command::Transfer {
                from: args[0].to_string(),
                to: args[1].to_string(),
                amount: amount(args[2])?,
            }
        }
        "FIND_LARGEST_TRANSACTION_ALL" => {
            arity("FIND_LARGEST_TRANSACTION_ALL", 0)?;
            Command::LargestTransactionAll
        }
        "FIND_TOP_N_TRANSACTIONS_ALL" => {
            arity("FIND_TOP_N_TRANSACTIONS_ALL", 1)?;
            let n: i64 = args[0].parse().map_err(|_| ScriptError::InvalidCount {
                line,
                value: args[0].to_string(),
            })?;
            // Non-positive counts select nothing.
            Command::TopNTransactionsAll {
                n: usize::try_from(n).unwrap_or(0),
            }
        }
        "FIND_LARGEST_TRANSACTION" | "FIND_LARGEST_TRANACTION" => {
            arity("FIND_LARGEST_TRANSACTION", 1)?;
            Command::LargestTransactionFor {
                id: args[0].to_string(),
            }
        }
        "BALANCE" => {
            arity("BALANCE", 1)?;
            Command::Balance {
                id: args[0].to_string(),
            }
        }
        _ => {
            return Err(ScriptError::UnknownCommand {
                line,
                name: fields[0].to_string(),
            });
        }
    };
    Ok(command)
}

/// Ranked query entry: the owning account plus the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub account_id: AccountId,
    pub record: TransactionRecord,
}

impl From<(AccountId, TransactionRecord)> for RankedEntry {
    fn from((account_id, record): (AccountId, TransactionRecord)) -> Self {
        Self { account_id, record }
    }
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    AccountCreated {
        account_id: AccountId,
        kind: AccountKind,
        balance: Cents,
    },
    Deposited {
        account_id: AccountId,
        kind: AccountKind,
        amount: Cents,
        /// False when the deposit was ignored for a non-positive amount
        applied: bool,
        balance: Cents,
    },
    Withdrew {
        account_id: AccountId,
        kind: AccountKind,
        amount: Cents,
        balance: Cents,
    },
    Transferred {
        from: AccountId,
        to: AccountId,
        amount: Cents,
        from_balance: Cents,
        to_balance: Cents,
    },
    LargestOverall {
        entry: Option<RankedEntry>,
    },
    TopN {
        n: usize,
        entries: Vec<RankedEntry>,
    },
    LargestFor {
        account_id: AccountId,
        record: Option<TransactionRecord>,
    },
    Balance {
        account_id: AccountId,
        balance: Cents,
    },
    Failed {
        command: &'static str,
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub line: u64,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Result of running a script
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub steps: Vec<Step>,
    pub failures: usize,
    /// True when fail-fast stopped the run before the last command
    pub aborted: bool,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures == 0
    }
}

/// Executes parsed scripts against a bank
pub struct ScriptRunner<'a> {
    bank: &'a Bank,
    fail_fast: bool,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(bank: &'a Bank) -> Self {
        Self {
            bank,
            fail_fast: false,
        }
    }

    /// Stop at the first failing command instead of reporting and continuing.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn run(&self, lines: &[ScriptLine]) -> RunReport {
        let mut report = RunReport::default();

        for (index, script_line) in lines.iter().enumerate() {
            let outcome = match self.execute(&script_line.command) {
                Ok(outcome) => outcome,
                Err(err) => {
                    report.failures += 1;
                    Outcome::Failed {
                        command: script_line.command.name(),
                        error: err.to_string(),
                    }
                }
            };
            let failed = matches!(outcome, Outcome::Failed { .. });
            report.steps.push(Step {
                line: script_line.line,
                outcome,
            });

            if failed && self.fail_fast {
                report.aborted = index + 1 < lines.len();
                break;
            }
        }

        report
    }

    /// Execute a single command.
    pub fn execute(&self, command: &Command) -> Result<Outcome, AppError> {
        let bank = self.bank;
        let outcome = match command {
            Command::CreateAccount {
                id,
                kind,
                initial_balance,
            } => {
                let account = bank.create_account(id, *kind, *initial_balance)?;
                Outcome::AccountCreated {
                    account_id: id.clone(),
                    kind: account.kind(),
                    balance: account.balance(),
                }
            }
            Command::Deposit { id, amount } => {
                let applied = bank.deposit(id, *amount)?.is_some();
                let account = bank.account(id)?;
                Outcome::Deposited {
                    account_id: id.clone(),
                    kind: account.kind(),
                    amount: *amount,
                    applied,
                    balance: account.balance(),
                }
            }
            Command::Withdraw { id, amount } => {
                bank.withdraw(id, *amount)?;
                let account = bank.account(id)?;
                Outcome::Withdrew {
                    account_id: id.clone(),
                    kind: account.kind(),
                    amount: *amount,
                    balance: account.balance(),
                }
            }
            Command::Transfer { from, to, amount } => {
                bank.transfer(from, to, *amount)?;
                Outcome::Transferred {
                    from: from.clone(),
                    to: to.clone(),
                    amount: *amount,
                    from_balance: bank.balance(from)?,
                    to_balance: bank.balance(to)?,
                }
            }
            Command::LargestTransactionAll => Outcome::LargestOverall {
                entry: bank.largest_transaction_overall().map(RankedEntry::from),
            },
            Command::TopNTransactionsAll { n } => Outcome::TopN {
                n: *n,
                entries: bank
                    .top_n_transactions_overall(*n)
                    .into_iter()
                    .map(RankedEntry::from)
                    .collect(),
            },
            Command::LargestTransactionFor { id } => Outcome::LargestFor {
                account_id: id.clone(),
                record: bank.largest_transaction_for(id),
            },
            Command::Balance { id } => Outcome::Balance {
                account_id: id.clone(),
                balance: bank.balance(id)?,
            },
        };
        Ok(outcome)
    }
}
