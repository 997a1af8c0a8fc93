use std::fs::File;
use std::io::{Read, Write};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::application::Bank;
use crate::domain::{AccountId, AccountKind, Cents, TransactionRecord, format_cents};
use crate::io::{Outcome, RankedEntry, RunReport, SAMPLE_SCRIPT, ScriptRunner, parse_script};

/// bankledger - in-memory banking ledger
#[derive(Parser)]
#[command(name = "bankledger")]
#[command(about = "Run banking command scripts against an in-memory transaction ledger")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a command script (CSV rows such as "DEPOSIT,A123,100")
    Run {
        /// Script file path, or "-" for stdin
        script: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Stop at the first failing command and exit with an error
        #[arg(long)]
        fail_fast: bool,
    },

    /// Execute the built-in sample session
    Demo {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Final balance of one account, printed after a run
#[derive(Debug, Clone, Serialize)]
pub struct AccountBalance {
    pub account_id: AccountId,
    pub kind: AccountKind,
    pub balance: Cents,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: &'a RunReport,
    balances: Vec<AccountBalance>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_to(&mut out)
    }

    /// Run the selected command, writing all output to `out`.
    pub fn run_to<W: Write>(self, out: &mut W) -> Result<()> {
        match self.command {
            Commands::Run {
                script,
                format,
                fail_fast,
            } => {
                let input: Box<dyn Read> = if script == "-" {
                    Box::new(std::io::stdin())
                } else {
                    Box::new(
                        File::open(&script)
                            .with_context(|| format!("Failed to open script '{}'", script))?,
                    )
                };
                let report = run_script(input, format, fail_fast, out)?;
                if fail_fast && !report.is_success() {
                    bail!("Script stopped after a failed command");
                }
            }

            Commands::Demo { format } => {
                run_script(SAMPLE_SCRIPT.as_bytes(), format, false, out)?;
            }
        }

        Ok(())
    }
}

fn run_script<R: Read, W: Write>(
    input: R,
    format: OutputFormat,
    fail_fast: bool,
    out: &mut W,
) -> Result<RunReport> {
    let lines = parse_script(input).context("Invalid command script")?;

    let bank = Bank::new();
    let report = ScriptRunner::new(&bank).fail_fast(fail_fast).run(&lines);
    let balances: Vec<AccountBalance> = bank
        .accounts()
        .iter()
        .map(|account| AccountBalance {
            account_id: account.id().to_string(),
            kind: account.kind(),
            balance: account.balance(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let output = JsonOutput {
                report: &report,
                balances,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        }
        OutputFormat::Text => {
            for step in &report.steps {
                write_outcome(out, step.line, &step.outcome)?;
            }
            write_balances(out, &balances)?;
            if report.failures > 0 {
                writeln!(out)?;
                writeln!(out, "{} command(s) failed", report.failures)?;
            }
        }
    }

    Ok(report)
}

fn describe(record: &TransactionRecord) -> String {
    format!(
        "{} ${} ({})",
        record.action,
        format_cents(record.amount),
        record.account_type
    )
}

fn write_outcome<W: Write>(out: &mut W, line: u64, outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::AccountCreated {
            account_id,
            kind,
            balance,
        } => writeln!(
            out,
            "{} account {} created with a balance of ${}.",
            kind,
            account_id,
            format_cents(*balance)
        )?,
        Outcome::Deposited {
            account_id,
            kind,
            amount,
            applied: true,
            ..
        } => writeln!(
            out,
            "{} account {} deposit ${}.",
            kind,
            account_id,
            format_cents(*amount)
        )?,
        Outcome::Deposited {
            account_id,
            kind,
            amount,
            applied: false,
            ..
        } => writeln!(
            out,
            "{} account {} ignored deposit of ${}.",
            kind,
            account_id,
            format_cents(*amount)
        )?,
        Outcome::Withdrew {
            account_id,
            kind,
            amount,
            ..
        } => writeln!(
            out,
            "{} account {} withdraw ${}.",
            kind,
            account_id,
            format_cents(*amount)
        )?,
        Outcome::Transferred {
            from, to, amount, ..
        } => writeln!(out, "{} transferred ${} to {}", from, format_cents(*amount), to)?,
        Outcome::LargestOverall { entry } => match entry {
            Some(RankedEntry { account_id, record }) => writeln!(
                out,
                "Largest transaction account: {}, details: {}",
                account_id,
                describe(record)
            )?,
            None => writeln!(out, "Largest transaction: no transactions recorded")?,
        },
        Outcome::TopN { n, entries } => {
            writeln!(out, "Top {} transactions:", n)?;
            for (rank, entry) in entries.iter().enumerate() {
                writeln!(
                    out,
                    "  {:>2}. {:<10} {}",
                    rank + 1,
                    entry.account_id,
                    describe(&entry.record)
                )?;
            }
        }
        Outcome::LargestFor { account_id, record } => match record {
            Some(record) => writeln!(
                out,
                "Largest transaction for account {}: {}",
                account_id,
                describe(record)
            )?,
            None => writeln!(out, "Largest transaction for account {}: none", account_id)?,
        },
        Outcome::Balance {
            account_id,
            balance,
        } => writeln!(out, "Account {} balance: ${}", account_id, format_cents(*balance))?,
        Outcome::Failed { command, error } => {
            writeln!(out, "line {}: {} failed: {}", line, command, error)?
        }
    }
    Ok(())
}

fn write_balances<W: Write>(out: &mut W, balances: &[AccountBalance]) -> Result<()> {
    if balances.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{:<12} {:<10} {:>14}", "ACCOUNT", "KIND", "BALANCE")?;
    writeln!(out, "{}", "-".repeat(38))?;
    for entry in balances {
        writeln!(
            out,
            "{:<12} {:<10} {:>14}",
            entry.account_id,
            entry.kind.label(),
            format_cents(entry.balance)
        )?;
    }
    Ok(())
}
