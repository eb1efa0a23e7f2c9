use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::HomeFinError;
use crate::types::{with_metadata, ComputationOutput, Horizon, Money, Rate};
use crate::HomeFinResult;

use super::amortization::monthly_payment;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceInput {
    pub current_balance: Money,
    pub current_annual_rate: Rate,
    pub current_remaining_months: u32,
    pub new_annual_rate: Rate,
    pub new_term_months: u32,
    #[serde(default)]
    pub closing_costs: Money,
    /// Finance the closing costs instead of paying them up front.
    #[serde(default)]
    pub roll_costs_into_loan: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceOutput {
    pub current_payment: Money,
    pub new_principal: Money,
    pub new_payment: Money,
    pub monthly_savings: Money,
    pub current_remaining_interest: Money,
    pub new_total_interest: Money,
    /// Total cash out of pocket under the new loan (including up-front costs)
    /// minus the remaining cost of the current loan. Negative means the
    /// refinance is cheaper over its life.
    pub lifetime_cost_difference: Money,
    pub break_even: Horizon,
}

/// Compare keeping the current loan against refinancing the balance.
pub fn compare_refinance(input: &RefinanceInput) -> HomeFinResult<ComputationOutput<RefinanceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.closing_costs < Decimal::ZERO {
        return Err(HomeFinError::invalid("closing_costs", "must be >= 0"));
    }

    let current_payment = monthly_payment(
        input.current_balance,
        input.current_annual_rate,
        input.current_remaining_months,
    )?;
    let current_total = current_payment * Decimal::from(input.current_remaining_months);

    let (new_principal, upfront) = if input.roll_costs_into_loan {
        (input.current_balance + input.closing_costs, Decimal::ZERO)
    } else {
        (input.current_balance, input.closing_costs)
    };
    let new_payment = monthly_payment(new_principal, input.new_annual_rate, input.new_term_months)?;
    let new_total = new_payment * Decimal::from(input.new_term_months);

    let monthly_savings = current_payment - new_payment;
    let break_even = if monthly_savings <= Decimal::ZERO {
        warnings.push("New payment is not lower than the current payment".into());
        Horizon::Never
    } else {
        Horizon::Finite(input.closing_costs / monthly_savings)
    };

    if input.new_term_months > input.current_remaining_months {
        warnings.push(format!(
            "New term extends repayment by {} months",
            input.new_term_months - input.current_remaining_months
        ));
    }

    let output = RefinanceOutput {
        current_payment,
        new_principal,
        new_payment,
        monthly_savings,
        current_remaining_interest: current_total - input.current_balance,
        new_total_interest: new_total - new_principal,
        lifetime_cost_difference: new_total + upfront - current_total,
        break_even,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Refinance comparison (remaining payments vs new amortized loan)",
        &serde_json::json!({
            "current_annual_rate": input.current_annual_rate.to_string(),
            "new_annual_rate": input.new_annual_rate.to_string(),
            "closing_costs": input.closing_costs.to_string(),
            "roll_costs_into_loan": input.roll_costs_into_loan,
        }),
        warnings,
        elapsed,
        output,
    ))
}
