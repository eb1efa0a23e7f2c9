use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::HomeFinError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::HomeFinResult;

use super::brackets::{stacked_capital_gains_tax, tax_owed, TaxBracketTable};

const DEFAULT_LOSS_DEDUCTION_LIMIT: Money = dec!(3000);

fn default_loss_limit() -> Money {
    DEFAULT_LOSS_DEDUCTION_LIMIT
}

/// Realised gains for one tax year. Negative gain figures are net losses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalGainsInput {
    pub ordinary_taxable_income: Money,
    #[serde(default)]
    pub short_term_gains: Money,
    #[serde(default)]
    pub long_term_gains: Money,
    pub ordinary_brackets: TaxBracketTable,
    pub long_term_brackets: TaxBracketTable,
    /// Maximum net capital loss deductible against ordinary income.
    #[serde(default = "default_loss_limit")]
    pub loss_deduction_limit: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalGainsOutput {
    pub net_short_term_gain: Money,
    pub net_long_term_gain: Money,
    pub loss_deduction: Money,
    pub loss_carryforward: Money,
    pub adjusted_ordinary_income: Money,
    pub ordinary_tax: Money,
    pub short_term_tax: Money,
    pub long_term_tax: Money,
    pub total_capital_gains_tax: Money,
    pub total_tax: Money,
    /// Tax on ordinary income alone, before any gains or losses.
    pub tax_without_gains: Money,
    pub effective_rate_on_gains: Rate,
}

/// Net short- and long-term results against each other: a loss in one
/// category absorbs gains in the other. Returns (net short, net long);
/// at most one is negative only when the overall result is a loss.
fn net_gains(short_term: Money, long_term: Money) -> (Money, Money) {
    match (short_term < Decimal::ZERO, long_term < Decimal::ZERO) {
        (true, false) => {
            let lt = long_term + short_term;
            if lt >= Decimal::ZERO {
                (Decimal::ZERO, lt)
            } else {
                (lt, Decimal::ZERO)
            }
        }
        (false, true) => {
            let st = short_term + long_term;
            if st >= Decimal::ZERO {
                (st, Decimal::ZERO)
            } else {
                (Decimal::ZERO, st)
            }
        }
        _ => (short_term, long_term),
    }
}

/// Tax on a year's capital gains: short-term gains at ordinary rates,
/// long-term gains stacked on ordinary income at the long-term rates, and
/// net losses deducted (up to the limit) from ordinary income.
pub fn calculate_capital_gains_tax(
    input: &CapitalGainsInput,
) -> HomeFinResult<ComputationOutput<CapitalGainsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.ordinary_taxable_income < Decimal::ZERO {
        return Err(HomeFinError::invalid("ordinary_taxable_income", "must be >= 0"));
    }
    if input.loss_deduction_limit < Decimal::ZERO {
        return Err(HomeFinError::invalid("loss_deduction_limit", "must be >= 0"));
    }

    let (net_st, net_lt) = net_gains(input.short_term_gains, input.long_term_gains);
    let net_total = net_st + net_lt;

    // Deductible loss is bounded by the limit and by the income it offsets;
    // whatever is left carries forward.
    let (loss_deduction, loss_carryforward) = if net_total < Decimal::ZERO {
        let loss = -net_total;
        let allowed = loss.min(input.loss_deduction_limit);
        if allowed < loss {
            warnings.push(format!(
                "Net capital loss of {loss} exceeds the {} deduction limit",
                input.loss_deduction_limit
            ));
        }
        let deduction = allowed.min(input.ordinary_taxable_income);
        if deduction < allowed {
            debug!(%allowed, %deduction, "loss deduction limited by ordinary income");
            warnings.push(format!(
                "Ordinary income of {} absorbs only {deduction} of the loss deduction",
                input.ordinary_taxable_income
            ));
        }
        (deduction, loss - deduction)
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let adjusted_ordinary = input.ordinary_taxable_income - loss_deduction;

    let taxable_st = net_st.max(Decimal::ZERO);
    let taxable_lt = net_lt.max(Decimal::ZERO);

    let ordinary_tax = tax_owed(adjusted_ordinary, &input.ordinary_brackets)?;
    let short_term_tax =
        tax_owed(adjusted_ordinary + taxable_st, &input.ordinary_brackets)? - ordinary_tax;
    let long_term_tax = stacked_capital_gains_tax(
        taxable_lt,
        adjusted_ordinary + taxable_st,
        &input.long_term_brackets,
    )?;
    let total_capital_gains_tax = short_term_tax + long_term_tax;

    let taxable_gains = taxable_st + taxable_lt;
    let effective_rate_on_gains = if taxable_gains > Decimal::ZERO {
        total_capital_gains_tax / taxable_gains
    } else {
        Decimal::ZERO
    };

    let output = CapitalGainsOutput {
        net_short_term_gain: net_st,
        net_long_term_gain: net_lt,
        loss_deduction,
        loss_carryforward,
        adjusted_ordinary_income: adjusted_ordinary,
        ordinary_tax,
        short_term_tax,
        long_term_tax,
        total_capital_gains_tax,
        total_tax: ordinary_tax + total_capital_gains_tax,
        tax_without_gains: tax_owed(input.ordinary_taxable_income, &input.ordinary_brackets)?,
        effective_rate_on_gains,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capital gains tax (short-term at ordinary rates, long-term stacked on ordinary income)",
        &serde_json::json!({
            "ordinary_taxable_income": input.ordinary_taxable_income.to_string(),
            "short_term_gains": input.short_term_gains.to_string(),
            "long_term_gains": input.long_term_gains.to_string(),
            "loss_deduction_limit": input.loss_deduction_limit.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
