use homefin_core::revolving::minimum_payment::{self, MinimumPaymentInput, PayoffOutcome};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn credit_card() -> MinimumPaymentInput {
    MinimumPaymentInput {
        balance: dec!(5_000),
        annual_rate: dec!(0.20),
        min_payment_pct: dec!(0.02),
        min_payment_floor: dec!(25),
        max_periods: 600,
        include_schedule: true,
    }
}

#[test]
fn test_minimum_payment_reference_trace() {
    let sim = minimum_payment::simulate(&credit_card()).unwrap();

    // Month 1: interest 5000 * 0.20/12 = 83.33, payment 2% of 5000 = 100
    let first = &sim.schedule[0];
    assert!((first.interest - dec!(83.333333)).abs() < dec!(0.000001));
    assert_eq!(first.payment, dec!(100));
    assert!((first.balance - dec!(4_983.333333)).abs() < dec!(0.000001));

    // Month 2: interest 4983.33 * 0.20/12 = 83.06, payment 2% of 4983.33 = 99.67
    let second = &sim.schedule[1];
    assert!((second.interest - dec!(83.055556)).abs() < dec!(0.000001));
    assert!((second.payment - dec!(99.666667)).abs() < dec!(0.000001));
    assert!((second.balance - dec!(4_966.722222)).abs() < dec!(0.000001));

    // Month 3
    let third = &sim.schedule[2];
    assert!((third.balance - dec!(4_950.166481)).abs() < dec!(0.000001));

    assert_eq!(sim.outcome, PayoffOutcome::PaidOff);
    assert_eq!(sim.periods, 524);
    assert!((sim.total_interest - dec!(20_209.99)).abs() < dec!(0.01));
    assert!((sim.total_paid - dec!(25_209.99)).abs() < dec!(0.01));
    assert!((sim.total_paid - sim.total_interest - dec!(5_000)).abs() < dec!(0.000001));

    // Second to last month sits on the floor, last month clears the remainder
    let n = sim.schedule.len();
    assert_eq!(sim.schedule[n - 2].payment, dec!(25));
    assert!((sim.schedule[n - 2].balance - dec!(14.611423)).abs() < dec!(0.000001));
    assert!((sim.schedule[n - 1].payment - dec!(14.854947)).abs() < dec!(0.000001));
    assert_eq!(sim.ending_balance, Decimal::ZERO);
}

#[test]
fn test_balance_never_negative() {
    let sim = minimum_payment::simulate(&credit_card()).unwrap();
    assert!(sim.schedule.iter().all(|row| row.balance >= Decimal::ZERO));
}

#[test]
fn test_payment_below_interest_hits_horizon() {
    // 1% minimum against 2.5% monthly interest: the balance grows
    let input = MinimumPaymentInput {
        annual_rate: dec!(0.30),
        min_payment_pct: dec!(0.01),
        min_payment_floor: Decimal::ZERO,
        include_schedule: false,
        ..credit_card()
    };
    let result = minimum_payment::analyze_minimum_payment(&input).unwrap();
    let sim = &result.result.minimum_payments;
    assert_eq!(sim.outcome, PayoffOutcome::HorizonExceeded);
    assert_eq!(sim.periods, 600);
    assert!(sim.ending_balance > dec!(5_000));
    assert!(sim.schedule.is_empty());
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_max_periods_defaults_from_json() {
    let json = r#"{
        "balance": "5000",
        "annual_rate": "0.20",
        "min_payment_pct": "0.02",
        "min_payment_floor": "25"
    }"#;
    let input: MinimumPaymentInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.max_periods, minimum_payment::DEFAULT_MAX_PERIODS);
}
