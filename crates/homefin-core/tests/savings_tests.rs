use homefin_core::savings::annuity;
use homefin_core::Horizon;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Annuity growth tests
// ===========================================================================

#[test]
fn test_future_value_identities() {
    // No contribution, no growth: unchanged
    assert_eq!(annuity::future_value(dec!(5_000), Decimal::ZERO, Decimal::ZERO, 40).unwrap(), dec!(5_000));
    // Contributions only, no growth: PMT * n
    assert_eq!(annuity::future_value(Decimal::ZERO, dec!(125), Decimal::ZERO, 40).unwrap(), dec!(5_000));
}

#[test]
fn test_retirement_drawdown_runs_out() {
    let input = annuity::SavingsInput {
        present_value: dec!(500_000),
        monthly_contribution: Decimal::ZERO,
        annual_return: dec!(0.04),
        years: 0,
        goal: None,
        monthly_withdrawal: Some(dec!(3_000)),
    };
    let out = annuity::project_savings(&input).unwrap().result;
    assert_eq!(out.future_value, dec!(500_000));
    assert!(out.year_by_year.is_empty());

    let drawdown = out.drawdown.unwrap();
    let months = drawdown.months_to_exhaust.periods().unwrap();
    // ln(1 - 500000*(0.04/12)/3000) / ln(1/(1+0.04/12)) ≈ 243.68
    assert!((months - dec!(243.68)).abs() < dec!(0.01));
}

#[test]
fn test_drawdown_below_earnings_lasts_forever() {
    let input = annuity::SavingsInput {
        present_value: dec!(1_000_000),
        monthly_contribution: Decimal::ZERO,
        annual_return: dec!(0.06),
        years: 0,
        goal: None,
        monthly_withdrawal: Some(dec!(4_000)),
    };
    let out = annuity::project_savings(&input).unwrap().result;
    assert_eq!(out.drawdown.unwrap().months_to_exhaust, Horizon::Never);
}

#[test]
fn test_goal_reached_ahead_of_schedule() {
    let input = annuity::SavingsInput {
        present_value: dec!(10_000),
        monthly_contribution: dec!(500),
        annual_return: dec!(0.06),
        years: 10,
        goal: Some(dec!(80_000)),
        monthly_withdrawal: None,
    };
    let result = annuity::project_savings(&input).unwrap();
    let goal = result.result.goal.unwrap();
    assert!(goal.on_track);
    assert!(goal.required_monthly_contribution < dec!(500));
    let months = goal.months_to_goal.periods().unwrap();
    assert!(months < dec!(120));
    assert!(months > dec!(90));
    assert!(result.warnings.is_empty());
}

#[test]
fn test_savings_input_rejects_negative_return() {
    let input = annuity::SavingsInput {
        present_value: dec!(10_000),
        monthly_contribution: dec!(500),
        annual_return: dec!(-0.01),
        years: 10,
        goal: None,
        monthly_withdrawal: None,
    };
    assert!(annuity::project_savings(&input).is_err());
}
