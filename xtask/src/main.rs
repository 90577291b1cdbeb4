// Host tooling crate: unwrap/expect/panic are fine outside embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod doc;
mod step;
mod test;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Multi-lane SPI development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check no_std firmware builds, host builds, clippy and formatting
    Check {
        /// Embedded target triple for the no_std checks
        #[arg(long, default_value = "thumbv7em-none-eabihf")]
        target: String,
    },
    /// Run unit, integration and doc tests
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
        /// Cases per proptest property (sets PROPTEST_CASES)
        #[arg(long)]
        proptest_cases: Option<u32>,
    },
    /// Build and optionally open documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { target } => check::run(&target),
        Commands::Test {
            unit,
            integration,
            proptest_cases,
        } => test::run(unit, integration, proptest_cases),
        Commands::Doc { open } => doc::run(open),
    }
}
