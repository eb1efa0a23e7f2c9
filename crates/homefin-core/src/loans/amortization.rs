use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::HomeFinError;
use crate::time_value::{checked, compound, ln, monthly_rate};
use crate::types::{with_metadata, ComputationOutput, Horizon, Money, Periods, Rate};
use crate::HomeFinResult;

/// Longest schedule ever materialised: 100 years of monthly rows.
pub const MAX_SCHEDULE_ROWS: u32 = 1200;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Lifetime cost of a loan paid at a level payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTotals {
    pub total_paid: Money,
    pub total_interest: Money,
}

/// A single month in an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub period: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub balance: Money,
}

/// Input for `analyze_loan`. Supply either `term_months` (solve for the
/// payment) or `monthly_payment` (solve for the payoff time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Money,
    pub annual_rate: Rate,
    #[serde(default)]
    pub term_months: Option<u32>,
    #[serde(default)]
    pub monthly_payment: Option<Money>,
    /// Report the outstanding balance after this many payments.
    #[serde(default)]
    pub balance_after_months: Option<u32>,
    #[serde(default)]
    pub include_schedule: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOutput {
    pub monthly_payment: Money,
    pub payoff: Horizon,
    pub totals: Option<PaymentTotals>,
    pub balance_after: Option<Money>,
    pub schedule: Vec<ScheduleRow>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_terms(principal: Money, annual_rate: Rate) -> HomeFinResult<()> {
    if principal < Decimal::ZERO {
        return Err(HomeFinError::invalid("principal", "must be >= 0"));
    }
    if annual_rate < Decimal::ZERO {
        return Err(HomeFinError::invalid("annual_rate", "must be >= 0"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Core formulas
// ---------------------------------------------------------------------------

/// Level monthly payment that retires `principal` over `periods` months:
/// P·r / (1 − (1+r)^−n), or P/n when the rate is zero.
pub fn monthly_payment(principal: Money, annual_rate: Rate, periods: u32) -> HomeFinResult<Money> {
    validate_terms(principal, annual_rate)?;
    if periods == 0 {
        return Err(HomeFinError::invalid("periods", "must be > 0"));
    }

    let n = Decimal::from(periods);
    if annual_rate.is_zero() {
        return Ok(principal / n);
    }

    let r = monthly_rate(annual_rate);
    // P·r/(1 − (1+r)^−n) rewritten as P·r·f/(f − 1) to keep one division
    let factor = compound(r, periods)?;
    let denom = factor - Decimal::ONE;
    if denom.is_zero() {
        return Err(HomeFinError::DivisionByZero {
            context: "monthly payment annuity factor".into(),
        });
    }
    checked(
        principal
            .checked_mul(r)
            .and_then(|v| v.checked_mul(factor))
            .and_then(|v| v.checked_div(denom)),
        "periods",
    )
}

/// Months needed to retire `principal` at a fixed `payment`.
///
/// Returns `Horizon::Never` when the payment does not exceed the first
/// month's interest.
pub fn periods_to_payoff(principal: Money, annual_rate: Rate, payment: Money) -> HomeFinResult<Horizon> {
    validate_terms(principal, annual_rate)?;
    if payment <= Decimal::ZERO {
        return Err(HomeFinError::invalid("payment", "must be > 0"));
    }
    if principal.is_zero() {
        return Ok(Horizon::Finite(Decimal::ZERO));
    }
    if annual_rate.is_zero() {
        return Ok(Horizon::Finite(principal / payment));
    }

    let r = monthly_rate(annual_rate);
    let interest = checked(principal.checked_mul(r), "annual_rate")?;
    if payment <= interest {
        debug!(%payment, %interest, "payment does not cover interest; loan never amortizes");
        return Ok(Horizon::Never);
    }

    let numerator = ln(payment / (payment - interest), "payment")?;
    let denominator = ln(Decimal::ONE + r, "annual_rate")?;
    Ok(Horizon::Finite(numerator / denominator))
}

/// Total paid and interest portion for a loan paid at `payment` for `periods`.
pub fn total_paid_and_interest(principal: Money, payment: Money, periods: Periods) -> HomeFinResult<PaymentTotals> {
    if principal < Decimal::ZERO {
        return Err(HomeFinError::invalid("principal", "must be >= 0"));
    }
    if payment < Decimal::ZERO {
        return Err(HomeFinError::invalid("payment", "must be >= 0"));
    }
    if periods < Decimal::ZERO {
        return Err(HomeFinError::invalid("periods", "must be >= 0"));
    }
    let total_paid = checked(payment.checked_mul(periods), "periods")?;
    Ok(PaymentTotals {
        total_paid,
        total_interest: total_paid - principal,
    })
}

/// Outstanding balance after `periods_elapsed` payments, from the closed-form
/// identity B_k = P(1+r)^k − pmt·((1+r)^k − 1)/r. Never negative.
pub fn remaining_balance(
    principal: Money,
    annual_rate: Rate,
    payment: Money,
    periods_elapsed: u32,
) -> HomeFinResult<Money> {
    validate_terms(principal, annual_rate)?;
    if payment < Decimal::ZERO {
        return Err(HomeFinError::invalid("payment", "must be >= 0"));
    }

    let k = Decimal::from(periods_elapsed);
    let balance = if annual_rate.is_zero() {
        checked(payment.checked_mul(k).and_then(|paid| principal.checked_sub(paid)), "periods")?
    } else {
        let r = monthly_rate(annual_rate);
        let factor = compound(r, periods_elapsed)?;
        let grown = checked(principal.checked_mul(factor), "periods")?;
        let repaid = checked(
            payment
                .checked_mul(factor - Decimal::ONE)
                .and_then(|v| v.checked_div(r)),
            "periods",
        )?;
        checked(grown.checked_sub(repaid), "periods")?
    };
    Ok(balance.max(Decimal::ZERO))
}

/// Same as [`remaining_balance`] but walks the loan month by month.
pub fn simulate_remaining_balance(
    principal: Money,
    annual_rate: Rate,
    payment: Money,
    periods_elapsed: u32,
) -> HomeFinResult<Money> {
    validate_terms(principal, annual_rate)?;
    if payment < Decimal::ZERO {
        return Err(HomeFinError::invalid("payment", "must be >= 0"));
    }

    let r = monthly_rate(annual_rate);
    let mut balance = principal;
    for _ in 0..periods_elapsed {
        let interest = checked(balance.checked_mul(r), "periods")?;
        let reduction = checked(payment.checked_sub(interest), "periods")?;
        balance = checked(balance.checked_sub(reduction), "periods")?;
        if balance <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
    }
    Ok(balance)
}

/// Month-by-month schedule for a fully amortizing loan. The final row's
/// payment is trimmed so the balance lands on exactly zero.
pub fn amortization_schedule(principal: Money, annual_rate: Rate, periods: u32) -> HomeFinResult<Vec<ScheduleRow>> {
    if periods > MAX_SCHEDULE_ROWS {
        return Err(HomeFinError::invalid(
            "periods",
            format!("schedules are limited to {MAX_SCHEDULE_ROWS} months"),
        ));
    }
    let payment = monthly_payment(principal, annual_rate, periods)?;
    Ok(build_schedule(principal, monthly_rate(annual_rate), payment, periods, periods))
}

/// Schedule for a loan paid at a fixed `payment` until it is retired.
///
/// A payment that never retires the loan has no finite schedule.
pub fn payment_schedule(principal: Money, annual_rate: Rate, payment: Money) -> HomeFinResult<Vec<ScheduleRow>> {
    let months = match periods_to_payoff(principal, annual_rate, payment)? {
        Horizon::Never => {
            return Err(HomeFinError::FinancialImpossibility(format!(
                "payment of {payment} does not cover the first month's interest"
            )));
        }
        horizon => horizon.whole_periods().filter(|&m| m <= MAX_SCHEDULE_ROWS).ok_or_else(|| {
            HomeFinError::invalid(
                "payment",
                format!("payoff takes longer than the {MAX_SCHEDULE_ROWS}-month schedule limit"),
            )
        })?,
    };
    Ok(build_schedule(principal, monthly_rate(annual_rate), payment, months, months))
}

/// Rows for the first `row_limit` of `payoff_months` months. The final
/// payoff row is only trimmed when it falls inside the limit.
fn build_schedule(principal: Money, r: Rate, payment: Money, payoff_months: u32, row_limit: u32) -> Vec<ScheduleRow> {
    let shown = payoff_months.min(row_limit);
    let mut rows = Vec::with_capacity(shown as usize);
    let mut balance = principal;

    for period in 1..=shown {
        if balance <= Decimal::ZERO {
            break;
        }
        let interest = balance * r;
        let mut principal_part = payment - interest;
        // Last payment, or rounding residue within the final month
        if principal_part >= balance || period == payoff_months {
            principal_part = balance;
        }
        balance -= principal_part;

        rows.push(ScheduleRow {
            period,
            payment: principal_part + interest,
            interest,
            principal: principal_part,
            balance,
        });
    }

    rows
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Analyse a fixed-rate installment loan from either its term or its payment.
pub fn analyze_loan(input: &LoanInput) -> HomeFinResult<ComputationOutput<LoanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_terms(input.principal, input.annual_rate)?;

    let (payment, payoff) = match (input.term_months, input.monthly_payment) {
        (Some(_), Some(_)) => {
            return Err(HomeFinError::invalid(
                "term_months",
                "provide term_months or monthly_payment, not both",
            ));
        }
        (None, None) => {
            return Err(HomeFinError::invalid(
                "term_months",
                "one of term_months or monthly_payment is required",
            ));
        }
        (Some(term), None) => {
            let payment = monthly_payment(input.principal, input.annual_rate, term)?;
            (payment, Horizon::Finite(Decimal::from(term)))
        }
        (None, Some(payment)) => {
            let payoff = periods_to_payoff(input.principal, input.annual_rate, payment)?;
            (payment, payoff)
        }
    };

    let totals = match payoff {
        Horizon::Finite(n) => Some(total_paid_and_interest(input.principal, payment, n)?),
        Horizon::Never => {
            warnings.push("Payment does not cover monthly interest; the loan never pays off".into());
            None
        }
    };

    let balance_after = match input.balance_after_months {
        Some(k) => {
            if let Some(n) = payoff.periods() {
                if Decimal::from(k) > n {
                    warnings.push(format!("Loan is paid off before month {k}"));
                }
            }
            Some(remaining_balance(input.principal, input.annual_rate, payment, k)?)
        }
        None => None,
    };

    let schedule = match (input.include_schedule, payoff) {
        (false, _) => Vec::new(),
        (true, Horizon::Never) => {
            warnings.push("Schedule omitted: loan never pays off".into());
            Vec::new()
        }
        (true, Horizon::Finite(n)) => {
            // Horizons past u32 months still show the first rows
            let months = payoff.whole_periods().unwrap_or(u32::MAX);
            if months > MAX_SCHEDULE_ROWS {
                warnings.push(format!(
                    "Schedule truncated to the first {MAX_SCHEDULE_ROWS} of {} months",
                    n.ceil()
                ));
            }
            build_schedule(
                input.principal,
                monthly_rate(input.annual_rate),
                payment,
                months,
                MAX_SCHEDULE_ROWS,
            )
        }
    };

    let output = LoanOutput {
        monthly_payment: payment,
        payoff,
        totals,
        balance_after,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate amortized loan (level monthly payment, rate/12 compounding)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate": input.annual_rate.to_string(),
            "term_months": input.term_months,
            "monthly_payment": input.monthly_payment.map(|p| p.to_string()),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
