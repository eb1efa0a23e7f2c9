use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use homefin_core::time_value::{self, GrowthInput};

use crate::input;

/// Arguments for growth and return comparison
#[derive(Args)]
pub struct GrowthArgs {
    /// Starting value
    #[arg(long)]
    pub begin: Option<Decimal>,

    /// Ending value
    #[arg(long)]
    pub end: Option<Decimal>,

    /// Holding period in years (fractional allowed)
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_growth(args: GrowthArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let growth_input: GrowthInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        GrowthInput {
            begin_value: args.begin.ok_or("--begin is required (or provide --input)")?,
            end_value: args.end.ok_or("--end is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
        }
    };
    let result = time_value::compare_growth(&growth_input)?;
    Ok(serde_json::to_value(result)?)
}
