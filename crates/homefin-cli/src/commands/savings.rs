use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use homefin_core::savings::annuity::{self, SavingsInput};

use crate::input;

/// Arguments for a savings projection
#[derive(Args)]
pub struct SavingsArgs {
    /// Starting balance
    #[arg(long, default_value = "0")]
    pub present_value: Decimal,

    /// Contribution made at the end of every month
    #[arg(long, default_value = "0")]
    pub contribution: Decimal,

    /// Expected nominal annual return (e.g. 0.07 for 7%)
    #[arg(long)]
    pub annual_return: Option<Decimal>,

    /// Projection horizon in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Target balance to solve the required contribution for
    #[arg(long)]
    pub goal: Option<Decimal>,

    /// Monthly withdrawal to test against the projected balance
    #[arg(long)]
    pub withdrawal: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_savings(args: SavingsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let savings_input: SavingsInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        SavingsInput {
            present_value: args.present_value,
            monthly_contribution: args.contribution,
            annual_return: args
                .annual_return
                .ok_or("--annual-return is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
            goal: args.goal,
            monthly_withdrawal: args.withdrawal,
        }
    };
    let result = annuity::project_savings(&savings_input)?;
    Ok(serde_json::to_value(result)?)
}
