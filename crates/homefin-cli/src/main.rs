mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::growth::GrowthArgs;
use commands::loans::{LoanArgs, RefinanceArgs};
use commands::revolving::MinPaymentArgs;
use commands::savings::SavingsArgs;
use commands::tax::{CapitalGainsArgs, IncomeTaxArgs};

/// Household finance calculations
#[derive(Parser)]
#[command(
    name = "homefin",
    version,
    about = "Household finance calculations with decimal precision",
    long_about = "A CLI for the calculations behind everyday money decisions: loan \
                  payments and payoff, refinancing, savings projections, bracketed \
                  income and capital gains tax, credit card minimum payments and \
                  simple growth comparisons."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log calculation decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Loan payment, payoff horizon and amortization schedule
    Loan(LoanArgs),
    /// Compare refinancing against keeping the current loan
    Refinance(RefinanceArgs),
    /// Project savings growth, goal contributions and drawdown
    Savings(SavingsArgs),
    /// Progressive income tax over a bracket table
    IncomeTax(IncomeTaxArgs),
    /// Short- and long-term capital gains tax
    CapitalGains(CapitalGainsArgs),
    /// Credit card payoff paying only the minimum
    MinPayment(MinPaymentArgs),
    /// CAGR and total return between two values
    Growth(GrowthArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "homefin=debug,homefin_core=debug" } else { "homefin=warn,homefin_core=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Loan(args) => commands::loans::run_loan(args),
        Commands::Refinance(args) => commands::loans::run_refinance(args),
        Commands::Savings(args) => commands::savings::run_savings(args),
        Commands::IncomeTax(args) => commands::tax::run_income_tax(args),
        Commands::CapitalGains(args) => commands::tax::run_capital_gains(args),
        Commands::MinPayment(args) => commands::revolving::run_min_payment(args),
        Commands::Growth(args) => commands::growth::run_growth(args),
        Commands::Version => {
            println!("homefin {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
