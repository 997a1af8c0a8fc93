use anyhow::Result;
use bankledger::cli::Cli;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    bankledger::telemetry::init(cli.verbose);
    cli.run()
}
