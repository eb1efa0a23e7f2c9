use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use homefin_core::tax::brackets::{self, IncomeTaxInput, TaxBracketTable};
use homefin_core::tax::capital_gains::{self, CapitalGainsInput};

use crate::input;

/// Arguments for progressive income tax
#[derive(Args)]
pub struct IncomeTaxArgs {
    /// Gross income before the deduction
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Deduction subtracted from gross income
    #[arg(long, default_value = "0")]
    pub deduction: Decimal,

    /// JSON bracket table: [{"rate": "0.10", "upper_bound": "11600"}, ...]
    #[arg(long)]
    pub brackets: Option<String>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for capital gains tax
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CapitalGainsArgs {
    /// Ordinary taxable income, excluding gains
    #[arg(long)]
    pub ordinary_income: Option<Decimal>,

    /// Net short-term gains (negative for a loss)
    #[arg(long, default_value = "0")]
    pub short_term: Decimal,

    /// Net long-term gains (negative for a loss)
    #[arg(long, default_value = "0")]
    pub long_term: Decimal,

    /// JSON bracket table for ordinary income and short-term gains
    #[arg(long)]
    pub brackets: Option<String>,

    /// JSON bracket table for long-term gains
    #[arg(long)]
    pub long_term_brackets: Option<String>,

    /// Maximum net loss deductible against ordinary income
    #[arg(long, default_value = "3000")]
    pub loss_limit: Decimal,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn read_table(path: Option<&str>, flag: &str) -> Result<TaxBracketTable, Box<dyn std::error::Error>> {
    let path = path.ok_or_else(|| format!("--{flag} is required (or provide --input)"))?;
    input::file::read_json(path)
}

pub fn run_income_tax(args: IncomeTaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let tax_input: IncomeTaxInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        IncomeTaxInput {
            gross_income: args.income.ok_or("--income is required (or provide --input)")?,
            deduction: args.deduction,
            brackets: read_table(args.brackets.as_deref(), "brackets")?,
        }
    };
    let result = brackets::calculate_income_tax(&tax_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_capital_gains(args: CapitalGainsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cg_input: CapitalGainsInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        CapitalGainsInput {
            ordinary_taxable_income: args
                .ordinary_income
                .ok_or("--ordinary-income is required (or provide --input)")?,
            short_term_gains: args.short_term,
            long_term_gains: args.long_term,
            ordinary_brackets: read_table(args.brackets.as_deref(), "brackets")?,
            long_term_brackets: read_table(args.long_term_brackets.as_deref(), "long-term-brackets")?,
            loss_deduction_limit: args.loss_limit,
        }
    };
    let result = capital_gains::calculate_capital_gains_tax(&cg_input)?;
    Ok(serde_json::to_value(result)?)
}
