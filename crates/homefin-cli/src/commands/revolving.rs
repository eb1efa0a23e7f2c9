use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use homefin_core::revolving::minimum_payment::{self, MinimumPaymentInput, DEFAULT_MAX_PERIODS};

use crate::input;

/// Arguments for a minimum-payment payoff simulation
#[derive(Args)]
pub struct MinPaymentArgs {
    /// Current card balance
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Annual percentage rate (e.g. 0.20 for 20%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Minimum payment as a share of the balance (e.g. 0.02 for 2%)
    #[arg(long)]
    pub min_pct: Option<Decimal>,

    /// Minimum payment floor
    #[arg(long, default_value = "0")]
    pub min_floor: Decimal,

    /// Stop after this many months
    #[arg(long, default_value_t = DEFAULT_MAX_PERIODS)]
    pub max_periods: u32,

    /// Include the month-by-month payment schedule
    #[arg(long)]
    pub schedule: bool,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_min_payment(args: MinPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mp_input: MinimumPaymentInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        MinimumPaymentInput {
            balance: args.balance.ok_or("--balance is required (or provide --input)")?,
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            min_payment_pct: args
                .min_pct
                .ok_or("--min-pct is required (or provide --input)")?,
            min_payment_floor: args.min_floor,
            max_periods: args.max_periods,
            include_schedule: args.schedule,
        }
    };
    let result = minimum_payment::analyze_minimum_payment(&mp_input)?;
    Ok(serde_json::to_value(result)?)
}
