use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::HomeFinError;
use crate::time_value::{checked, monthly_rate};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::HomeFinResult;

/// Balances below one cent count as paid off.
pub const PAID_OFF_EPSILON: Money = dec!(0.01);

/// 50 years of monthly statements.
pub const DEFAULT_MAX_PERIODS: u32 = 600;

fn default_max_periods() -> u32 {
    DEFAULT_MAX_PERIODS
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimumPaymentInput {
    pub balance: Money,
    pub annual_rate: Rate,
    /// Minimum payment as a share of the statement balance (0.02 = 2%).
    pub min_payment_pct: Rate,
    /// Minimum payment never falls below this amount.
    pub min_payment_floor: Money,
    #[serde(default = "default_max_periods")]
    pub max_periods: u32,
    #[serde(default)]
    pub include_schedule: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoffOutcome {
    PaidOff,
    /// The cap was reached with a balance still outstanding.
    HorizonExceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub period: u32,
    pub interest: Money,
    pub payment: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffSimulation {
    pub outcome: PayoffOutcome,
    pub periods: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    pub ending_balance: Money,
    pub schedule: Vec<PaymentRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedPaymentComparison {
    pub fixed_payment: Money,
    pub outcome: PayoffOutcome,
    pub periods: u32,
    pub total_interest: Money,
    pub interest_saved: Money,
    pub months_saved: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimumPaymentOutput {
    pub minimum_payments: PayoffSimulation,
    /// Paying the first month's minimum every month instead.
    pub fixed_payment: Option<FixedPaymentComparison>,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Revolving balance paid down one statement at a time. Each period accrues
/// interest first, then applies the payment.
struct RevolvingBalance {
    balance: Money,
    monthly_rate: Rate,
    min_pct: Rate,
    min_floor: Money,
}

impl RevolvingBalance {
    fn is_exhausted(&self) -> bool {
        self.balance < PAID_OFF_EPSILON
    }

    fn minimum_due(&self) -> Money {
        (self.balance * self.min_pct).max(self.min_floor)
    }

    /// Accrue a month of interest and pay the minimum, never more than is
    /// owed. Returns (interest, payment).
    ///
    /// A balance that outgrows `Decimal` is an input error; only a cap short
    /// enough to stay in range yields `HorizonExceeded`.
    fn step(&mut self) -> HomeFinResult<(Money, Money)> {
        let due = self.minimum_due();
        let interest = checked(self.balance.checked_mul(self.monthly_rate), "max_periods")?;
        let owed = checked(self.balance.checked_add(interest), "max_periods")?;
        let payment = due.min(owed);
        self.balance = owed - payment;
        Ok((interest, payment))
    }
}

fn validate(input: &MinimumPaymentInput) -> HomeFinResult<()> {
    if input.balance < Decimal::ZERO {
        return Err(HomeFinError::invalid("balance", "must be >= 0"));
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(HomeFinError::invalid("annual_rate", "must be >= 0"));
    }
    if input.min_payment_pct < Decimal::ZERO || input.min_payment_pct > Decimal::ONE {
        return Err(HomeFinError::invalid("min_payment_pct", "must be between 0 and 1"));
    }
    if input.min_payment_floor < Decimal::ZERO {
        return Err(HomeFinError::invalid("min_payment_floor", "must be >= 0"));
    }
    if input.min_payment_pct.is_zero() && input.min_payment_floor.is_zero() {
        return Err(HomeFinError::invalid(
            "min_payment_floor",
            "a percentage or a floor is required for a positive minimum payment",
        ));
    }
    if input.max_periods == 0 {
        return Err(HomeFinError::invalid("max_periods", "must be > 0"));
    }
    Ok(())
}

/// Pay a revolving balance down with minimum payments until it is gone or
/// `max_periods` statements have passed.
pub fn simulate(input: &MinimumPaymentInput) -> HomeFinResult<PayoffSimulation> {
    validate(input)?;

    let mut state = RevolvingBalance {
        balance: input.balance,
        monthly_rate: monthly_rate(input.annual_rate),
        min_pct: input.min_payment_pct,
        min_floor: input.min_payment_floor,
    };

    let mut periods = 0u32;
    let mut total_paid = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut schedule = Vec::new();

    while !state.is_exhausted() && periods < input.max_periods {
        let (interest, payment) = state.step()?;
        periods += 1;
        total_paid = checked(total_paid.checked_add(payment), "max_periods")?;
        total_interest = checked(total_interest.checked_add(interest), "max_periods")?;
        if input.include_schedule {
            schedule.push(PaymentRow {
                period: periods,
                interest,
                payment,
                balance: state.balance,
            });
        }
    }

    let outcome = if state.is_exhausted() {
        PayoffOutcome::PaidOff
    } else {
        PayoffOutcome::HorizonExceeded
    };
    debug!(?outcome, periods, %total_interest, "minimum payment simulation finished");

    Ok(PayoffSimulation {
        outcome,
        periods,
        total_paid,
        total_interest,
        ending_balance: state.balance,
        schedule,
    })
}

/// Minimum-payment payoff, compared with holding the first payment fixed.
pub fn analyze_minimum_payment(
    input: &MinimumPaymentInput,
) -> HomeFinResult<ComputationOutput<MinimumPaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let minimum_payments = simulate(input)?;
    if minimum_payments.outcome == PayoffOutcome::HorizonExceeded {
        warnings.push(format!(
            "Balance not paid off within {} months; {} still owed",
            input.max_periods,
            minimum_payments.ending_balance.round_dp(2)
        ));
    }

    let first_payment = (input.balance * input.min_payment_pct).max(input.min_payment_floor);
    let fixed_payment = if input.balance < PAID_OFF_EPSILON {
        None
    } else {
        let fixed = simulate(&MinimumPaymentInput {
            min_payment_pct: Decimal::ZERO,
            min_payment_floor: first_payment,
            include_schedule: false,
            ..input.clone()
        })?;
        Some(FixedPaymentComparison {
            fixed_payment: first_payment,
            outcome: fixed.outcome,
            periods: fixed.periods,
            total_interest: fixed.total_interest,
            interest_saved: minimum_payments.total_interest - fixed.total_interest,
            months_saved: i64::from(minimum_payments.periods) - i64::from(fixed.periods),
        })
    };

    let output = MinimumPaymentOutput {
        minimum_payments,
        fixed_payment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Revolving balance minimum-payment simulation (monthly accrual, payment capped at amount owed)",
        &serde_json::json!({
            "balance": input.balance.to_string(),
            "annual_rate": input.annual_rate.to_string(),
            "min_payment_pct": input.min_payment_pct.to_string(),
            "min_payment_floor": input.min_payment_floor.to_string(),
            "max_periods": input.max_periods,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(balance: Money) -> MinimumPaymentInput {
        MinimumPaymentInput {
            balance,
            annual_rate: dec!(0.20),
            min_payment_pct: dec!(0.02),
            min_payment_floor: dec!(25),
            max_periods: DEFAULT_MAX_PERIODS,
            include_schedule: true,
        }
    }

    #[test]
    fn test_zero_balance_is_already_paid() {
        let sim = simulate(&card(Decimal::ZERO)).unwrap();
        assert_eq!(sim.outcome, PayoffOutcome::PaidOff);
        assert_eq!(sim.periods, 0);
        assert!(sim.schedule.is_empty());
    }

    #[test]
    fn test_floor_applies_to_small_balance() {
        // 2% of 500 = 10, floor of 25 wins
        let sim = simulate(&card(dec!(500))).unwrap();
        assert_eq!(sim.schedule[0].payment, dec!(25));
    }

    #[test]
    fn test_final_payment_clears_balance_exactly() {
        let sim = simulate(&card(dec!(60))).unwrap();
        assert_eq!(sim.outcome, PayoffOutcome::PaidOff);
        let last = sim.schedule.last().unwrap();
        assert_eq!(last.balance, Decimal::ZERO);
        assert!(last.payment < dec!(25));
    }

    #[test]
    fn test_zero_payment_rejected() {
        let mut input = card(dec!(1000));
        input.min_payment_pct = Decimal::ZERO;
        input.min_payment_floor = Decimal::ZERO;
        assert!(simulate(&input).is_err());
    }

    #[test]
    fn test_pct_above_one_rejected() {
        let mut input = card(dec!(1000));
        input.min_payment_pct = dec!(1.5);
        assert!(simulate(&input).is_err());
    }

    #[test]
    fn test_runaway_balance_past_decimal_range_is_an_error() {
        // 30% APR against a 1% minimum grows about 1.5% a month; 5000
        // months takes the balance past the decimal range
        let input = MinimumPaymentInput {
            balance: dec!(5000),
            annual_rate: dec!(0.30),
            min_payment_pct: dec!(0.01),
            min_payment_floor: Decimal::ZERO,
            max_periods: 5000,
            include_schedule: false,
        };
        match simulate(&input) {
            Err(HomeFinError::InvalidInput { field, .. }) => assert_eq!(field, "max_periods"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        assert!(analyze_minimum_payment(&input).is_err());

        // The same card under the default cap stays in range
        let capped = simulate(&MinimumPaymentInput { max_periods: DEFAULT_MAX_PERIODS, ..input }).unwrap();
        assert_eq!(capped.outcome, PayoffOutcome::HorizonExceeded);
        assert!(capped.ending_balance > dec!(5000));
    }

    #[test]
    fn test_analyze_reports_fixed_payment_savings() {
        let out = analyze_minimum_payment(&card(dec!(5000))).unwrap();
        let fixed = out.result.fixed_payment.unwrap();
        assert_eq!(fixed.fixed_payment, dec!(100));
        assert_eq!(fixed.periods, 109);
        assert_eq!(fixed.months_saved, 524 - 109);
        assert!((fixed.interest_saved - dec!(14369.90)).abs() < dec!(0.01));
        assert!(out.warnings.is_empty());
    }
}
