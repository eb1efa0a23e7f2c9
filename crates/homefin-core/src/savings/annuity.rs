use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::HomeFinError;
use crate::time_value::{checked, compound, ln, monthly_rate};
use crate::types::{with_metadata, ComputationOutput, Horizon, Money, Rate};
use crate::HomeFinResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for `project_savings`. Contributions and withdrawals are monthly;
/// the return is a nominal annual rate compounded monthly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsInput {
    pub present_value: Money,
    pub monthly_contribution: Money,
    pub annual_return: Rate,
    pub years: u32,
    /// Savings target to test the plan against.
    #[serde(default)]
    pub goal: Option<Money>,
    /// Monthly draw applied to the projected balance once saving stops.
    #[serde(default)]
    pub monthly_withdrawal: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsOutput {
    pub future_value: Money,
    pub total_contributions: Money,
    pub growth: Money,
    pub year_by_year: Vec<SavingsYear>,
    pub goal: Option<GoalAnalysis>,
    pub drawdown: Option<DrawdownAnalysis>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsYear {
    pub year: u32,
    pub contributions_to_date: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalAnalysis {
    pub target: Money,
    pub required_monthly_contribution: Money,
    pub months_to_goal: Horizon,
    pub on_track: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawdownAnalysis {
    pub starting_balance: Money,
    pub monthly_withdrawal: Money,
    pub months_to_exhaust: Horizon,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn non_negative(value: Decimal, field: &str) -> HomeFinResult<()> {
    if value < Decimal::ZERO {
        return Err(HomeFinError::invalid(field, "must be >= 0"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Core formulas
// ---------------------------------------------------------------------------

/// Future value of `present_value` plus `contribution` at the end of each of
/// `periods` periods: PV(1+r)^n + PMT·((1+r)^n − 1)/r, or PV + PMT·n at r = 0.
pub fn future_value(present_value: Money, contribution: Money, periodic_rate: Rate, periods: u32) -> HomeFinResult<Money> {
    non_negative(present_value, "present_value")?;
    non_negative(contribution, "contribution")?;
    non_negative(periodic_rate, "periodic_rate")?;

    if periodic_rate.is_zero() {
        let contributed = checked(contribution.checked_mul(Decimal::from(periods)), "periods")?;
        return checked(present_value.checked_add(contributed), "periods");
    }

    let factor = compound(periodic_rate, periods)?;
    let grown = checked(present_value.checked_mul(factor), "periods")?;
    let annuity = checked(
        contribution
            .checked_mul(factor - Decimal::ONE)
            .and_then(|v| v.checked_div(periodic_rate)),
        "periods",
    )?;
    checked(grown.checked_add(annuity), "periods")
}

/// Periods a `balance` can fund a level `withdrawal` before running dry:
/// ln(1 − B·r/W) / ln(1/(1+r)).
///
/// Returns `Horizon::Never` when the balance's earnings cover the withdrawal
/// (B·r ≥ W), i.e. the balance lasts indefinitely.
pub fn periods_to_exhaust(balance: Money, withdrawal: Money, periodic_rate: Rate) -> HomeFinResult<Horizon> {
    non_negative(balance, "balance")?;
    non_negative(periodic_rate, "periodic_rate")?;
    if withdrawal <= Decimal::ZERO {
        return Err(HomeFinError::invalid("withdrawal", "must be > 0"));
    }
    if balance.is_zero() {
        return Ok(Horizon::Finite(Decimal::ZERO));
    }
    if periodic_rate.is_zero() {
        return Ok(Horizon::Finite(balance / withdrawal));
    }

    let earnings = balance * periodic_rate;
    if earnings >= withdrawal {
        debug!(%earnings, %withdrawal, "withdrawal covered by earnings; balance lasts indefinitely");
        return Ok(Horizon::Never);
    }

    let remaining = ln(Decimal::ONE - earnings / withdrawal, "withdrawal")?;
    let per_period = ln(Decimal::ONE + periodic_rate, "periodic_rate")?;
    Ok(Horizon::Finite(-remaining / per_period))
}

/// Level contribution per period needed to grow `present_value` to
/// `target` in `periods` periods.
///
/// A negative result means the present value alone overshoots the target.
pub fn required_periodic_contribution(
    present_value: Money,
    target: Money,
    periodic_rate: Rate,
    periods: u32,
) -> HomeFinResult<Money> {
    non_negative(present_value, "present_value")?;
    non_negative(target, "target")?;
    non_negative(periodic_rate, "periodic_rate")?;
    if periods == 0 {
        return Err(HomeFinError::invalid("periods", "must be > 0"));
    }

    if periodic_rate.is_zero() {
        return Ok((target - present_value) / Decimal::from(periods));
    }

    let factor = compound(periodic_rate, periods)?;
    let denom = factor - Decimal::ONE;
    if denom.is_zero() {
        return Err(HomeFinError::DivisionByZero {
            context: "required contribution annuity factor".into(),
        });
    }
    let shortfall = checked(
        present_value
            .checked_mul(factor)
            .and_then(|grown| target.checked_sub(grown)),
        "periods",
    )?;
    checked(
        shortfall
            .checked_mul(periodic_rate)
            .and_then(|v| v.checked_div(denom)),
        "periods",
    )
}

/// Periods of level contributions needed to reach `target`.
///
/// `Finite(0)` when the target is already met; `Never` when nothing is
/// contributed and there is nothing to grow.
pub fn periods_to_goal(
    present_value: Money,
    target: Money,
    contribution: Money,
    periodic_rate: Rate,
) -> HomeFinResult<Horizon> {
    non_negative(present_value, "present_value")?;
    non_negative(target, "target")?;
    non_negative(contribution, "contribution")?;
    non_negative(periodic_rate, "periodic_rate")?;

    if target <= present_value {
        return Ok(Horizon::Finite(Decimal::ZERO));
    }

    if periodic_rate.is_zero() {
        if contribution.is_zero() {
            return Ok(Horizon::Never);
        }
        return Ok(Horizon::Finite((target - present_value) / contribution));
    }

    // (1+r)^n = (FV + PMT/r) / (PV + PMT/r)
    let annuity_level = contribution / periodic_rate;
    let base = present_value + annuity_level;
    if base.is_zero() {
        return Ok(Horizon::Never);
    }
    let growth_needed = ln((target + annuity_level) / base, "target")?;
    let per_period = ln(Decimal::ONE + periodic_rate, "periodic_rate")?;
    Ok(Horizon::Finite(growth_needed / per_period))
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Project a savings plan, optionally testing it against a goal and a
/// post-saving drawdown.
pub fn project_savings(input: &SavingsInput) -> HomeFinResult<ComputationOutput<SavingsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.annual_return < Decimal::ZERO {
        return Err(HomeFinError::invalid("annual_return", "must be >= 0"));
    }
    let months = input
        .years
        .checked_mul(12)
        .ok_or_else(|| HomeFinError::invalid("years", "too many years"))?;
    let r = monthly_rate(input.annual_return);

    let fv = future_value(input.present_value, input.monthly_contribution, r, months)?;
    let total_contributions = input.monthly_contribution * Decimal::from(months);

    let mut year_by_year = Vec::with_capacity(input.years as usize);
    for year in 1..=input.years {
        let elapsed = year * 12;
        year_by_year.push(SavingsYear {
            year,
            contributions_to_date: input.monthly_contribution * Decimal::from(elapsed),
            balance: future_value(input.present_value, input.monthly_contribution, r, elapsed)?,
        });
    }

    let goal = match input.goal {
        Some(target) => {
            let required = if months > 0 {
                required_periodic_contribution(input.present_value, target, r, months)?
            } else {
                warnings.push("Zero-year plan: required contribution not defined".into());
                Decimal::ZERO
            };
            let months_to_goal =
                periods_to_goal(input.present_value, target, input.monthly_contribution, r)?;
            let on_track = fv >= target;
            if !on_track {
                warnings.push(format!("Plan falls short of the {target} goal by {}", target - fv));
            }
            Some(GoalAnalysis {
                target,
                required_monthly_contribution: required,
                months_to_goal,
                on_track,
            })
        }
        None => None,
    };

    let drawdown = match input.monthly_withdrawal {
        Some(withdrawal) => Some(DrawdownAnalysis {
            starting_balance: fv,
            monthly_withdrawal: withdrawal,
            months_to_exhaust: periods_to_exhaust(fv, withdrawal, r)?,
        }),
        None => None,
    };

    let output = SavingsOutput {
        future_value: fv,
        total_contributions,
        growth: fv - input.present_value - total_contributions,
        year_by_year,
        goal,
        drawdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annuity growth (end-of-month contributions, monthly compounding)",
        &serde_json::json!({
            "present_value": input.present_value.to_string(),
            "monthly_contribution": input.monthly_contribution.to_string(),
            "annual_return": input.annual_return.to_string(),
            "years": input.years,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_future_value_no_growth_no_contribution() {
        assert_eq!(future_value(dec!(1234.56), dec!(0), dec!(0), 360).unwrap(), dec!(1234.56));
    }

    #[test]
    fn test_future_value_contributions_only_at_zero_rate() {
        assert_eq!(future_value(dec!(0), dec!(250), dec!(0), 24).unwrap(), dec!(6000));
    }

    #[test]
    fn test_future_value_ten_years_monthly() {
        let fv = future_value(dec!(10000), dec!(500), dec!(0.005), 120).unwrap();
        assert!((fv - dec!(100133.64)).abs() < dec!(0.01));
    }

    #[test]
    fn test_future_value_overflow_is_an_error() {
        // 1.1^660 ≈ 2.1e27 fits; scaling it by 1000 does not
        let err = future_value(dec!(1000), Decimal::ZERO, dec!(0.1), 660).unwrap_err();
        assert!(matches!(err, HomeFinError::InvalidInput { .. }));
        assert!(future_value(Decimal::ZERO, dec!(1000), dec!(0.1), 660).is_err());
    }

    #[test]
    fn test_required_contribution_overflow_is_an_error() {
        let err = required_periodic_contribution(dec!(1000), dec!(5000), dec!(0.1), 660).unwrap_err();
        assert!(matches!(err, HomeFinError::InvalidInput { .. }));
    }

    #[test]
    fn test_required_contribution_inverts_future_value() {
        let pmt = required_periodic_contribution(dec!(10000), dec!(100000), dec!(0.005), 120).unwrap();
        assert!((pmt - dec!(499.18)).abs() < dec!(0.01));
        let fv = future_value(dec!(10000), pmt, dec!(0.005), 120).unwrap();
        assert!((fv - dec!(100000)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_required_contribution_negative_when_overshooting() {
        let pmt = required_periodic_contribution(dec!(100000), dec!(50000), dec!(0.005), 12).unwrap();
        assert!(pmt < Decimal::ZERO);
    }

    #[test]
    fn test_periods_to_exhaust_finite() {
        let h = periods_to_exhaust(dec!(500000), dec!(3000), dec!(0.04) / dec!(12)).unwrap();
        let n = h.periods().unwrap();
        assert!((n - dec!(243.684)).abs() < dec!(0.01));
    }

    #[test]
    fn test_periods_to_exhaust_lasts_forever() {
        // 0.25% of 1.2M = 3000 of earnings per month
        let h = periods_to_exhaust(dec!(1200000), dec!(3000), dec!(0.0025)).unwrap();
        assert_eq!(h, Horizon::Never);
        let h = periods_to_exhaust(dec!(1500000), dec!(3000), dec!(0.0025)).unwrap();
        assert_eq!(h, Horizon::Never);
    }

    #[test]
    fn test_periods_to_exhaust_zero_rate() {
        let h = periods_to_exhaust(dec!(12000), dec!(1000), dec!(0)).unwrap();
        assert_eq!(h, Horizon::Finite(dec!(12)));
    }

    #[test]
    fn test_periods_to_exhaust_rejects_zero_withdrawal() {
        assert!(periods_to_exhaust(dec!(12000), dec!(0), dec!(0.01)).is_err());
    }

    #[test]
    fn test_periods_to_goal_round_trip() {
        let h = periods_to_goal(dec!(10000), dec!(100133.6407435544554725418387), dec!(500), dec!(0.005)).unwrap();
        assert!((h.periods().unwrap() - dec!(120)).abs() < dec!(0.001));
    }

    #[test]
    fn test_periods_to_goal_unreachable() {
        let h = periods_to_goal(dec!(0), dec!(1000), dec!(0), dec!(0.01)).unwrap();
        assert_eq!(h, Horizon::Never);
        let h = periods_to_goal(dec!(100), dec!(1000), dec!(0), dec!(0)).unwrap();
        assert_eq!(h, Horizon::Never);
    }

    #[test]
    fn test_periods_to_goal_already_met() {
        let h = periods_to_goal(dec!(5000), dec!(1000), dec!(0), dec!(0.01)).unwrap();
        assert_eq!(h, Horizon::Finite(Decimal::ZERO));
    }

    #[test]
    fn test_project_savings_year_by_year() {
        let input = SavingsInput {
            present_value: dec!(10000),
            monthly_contribution: dec!(500),
            annual_return: dec!(0.06),
            years: 10,
            goal: Some(dec!(150000)),
            monthly_withdrawal: None,
        };
        let out = project_savings(&input).unwrap();
        let res = &out.result;
        assert_eq!(res.year_by_year.len(), 10);
        assert_eq!(res.year_by_year.last().unwrap().balance, res.future_value);
        assert_eq!(res.total_contributions, dec!(60000));
        let goal = res.goal.as_ref().unwrap();
        assert!(!goal.on_track);
        assert!(goal.required_monthly_contribution > dec!(500));
        assert_eq!(out.warnings.len(), 1);
    }
}
