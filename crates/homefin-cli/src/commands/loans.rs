use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use homefin_core::loans::amortization::{self, LoanInput};
use homefin_core::loans::refinance::{self, RefinanceInput};

use crate::input;

/// Arguments for loan payment and payoff analysis
#[derive(Args)]
pub struct LoanArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual interest rate (e.g. 0.06 for 6%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months (solve for the payment)
    #[arg(long, conflicts_with = "payment")]
    pub term_months: Option<u32>,

    /// Fixed monthly payment (solve for the payoff horizon)
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Report the outstanding balance after this many payments
    #[arg(long)]
    pub balance_after: Option<u32>,

    /// Include the month-by-month amortization schedule
    #[arg(long)]
    pub schedule: bool,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a refinance comparison
#[derive(Args)]
pub struct RefinanceArgs {
    /// Outstanding balance on the current loan
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Current annual rate
    #[arg(long)]
    pub current_rate: Option<Decimal>,

    /// Months remaining on the current loan
    #[arg(long)]
    pub remaining_months: Option<u32>,

    /// Annual rate on the new loan
    #[arg(long)]
    pub new_rate: Option<Decimal>,

    /// Term of the new loan in months
    #[arg(long)]
    pub new_term_months: Option<u32>,

    /// Closing costs of the refinance
    #[arg(long, default_value = "0")]
    pub closing_costs: Decimal,

    /// Add closing costs to the new principal instead of paying them up front
    #[arg(long)]
    pub roll_costs: bool,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_loan(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: LoanInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        if args.term_months.is_none() && args.payment.is_none() {
            return Err("one of --term-months or --payment is required (or provide --input)".into());
        }
        LoanInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_months: args.term_months,
            monthly_payment: args.payment,
            balance_after_months: args.balance_after,
            include_schedule: args.schedule,
        }
    };
    let result = amortization::analyze_loan(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_refinance(args: RefinanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let refi_input: RefinanceInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        RefinanceInput {
            current_balance: args
                .balance
                .ok_or("--balance is required (or provide --input)")?,
            current_annual_rate: args
                .current_rate
                .ok_or("--current-rate is required (or provide --input)")?,
            current_remaining_months: args
                .remaining_months
                .ok_or("--remaining-months is required (or provide --input)")?,
            new_annual_rate: args
                .new_rate
                .ok_or("--new-rate is required (or provide --input)")?,
            new_term_months: args
                .new_term_months
                .ok_or("--new-term-months is required (or provide --input)")?,
            closing_costs: args.closing_costs,
            roll_costs_into_loan: args.roll_costs,
        }
    };
    let result = refinance::compare_refinance(&refi_input)?;
    Ok(serde_json::to_value(result)?)
}
