use homefin_core::loans::amortization;
use homefin_core::revolving::minimum_payment::{self, MinimumPaymentInput};
use homefin_core::savings::annuity;
use homefin_core::tax::brackets::{self, TaxBracketTable};
use proptest::prelude::{prop_assert, prop_assume, proptest};
use rust_decimal::Decimal;

fn ordinary_2024_single() -> TaxBracketTable {
    TaxBracketTable::from_json(include_str!("../../../config/us_2024_single_ordinary.json")).unwrap()
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn prop_total_paid_covers_principal(
        principal in 1_000i64..2_000_000,
        rate_bp in 1i64..9_999,
        periods in 1u32..480,
    ) {
        let p = Decimal::from(principal);
        let rate = Decimal::new(rate_bp, 4);
        let payment = amortization::monthly_payment(p, rate, periods).unwrap();
        prop_assert!(payment * Decimal::from(periods) >= p);
    }

    #[test]
    fn prop_payoff_round_trips_term(
        principal in 1_000i64..1_000_000,
        rate_bp in 100i64..3_000,
        periods in 1u32..480,
    ) {
        let p = Decimal::from(principal);
        let rate = Decimal::new(rate_bp, 4);
        let payment = amortization::monthly_payment(p, rate, periods).unwrap();
        let months = amortization::periods_to_payoff(p, rate, payment)
            .unwrap()
            .periods()
            .unwrap();
        prop_assert!((months - Decimal::from(periods)).abs() < Decimal::new(1, 2));
    }

    #[test]
    fn prop_tax_owed_is_monotonic(a in 0i64..2_000_000, b in 0i64..2_000_000) {
        prop_assume!(a <= b);
        let table = ordinary_2024_single();
        let lower = brackets::tax_owed(Decimal::from(a), &table).unwrap();
        let higher = brackets::tax_owed(Decimal::from(b), &table).unwrap();
        prop_assert!(lower >= Decimal::ZERO);
        prop_assert!(lower <= higher);
    }

    #[test]
    fn prop_zero_growth_future_value_is_linear(pv in 0i64..1_000_000, pmt in 0i64..10_000, n in 0u32..600) {
        let fv = annuity::future_value(Decimal::from(pv), Decimal::from(pmt), Decimal::ZERO, n).unwrap();
        prop_assert!(fv == Decimal::from(pv) + Decimal::from(pmt) * Decimal::from(n));
    }

    #[test]
    fn prop_minimum_payment_balance_never_negative(
        balance in 0i64..50_000,
        rate_bp in 0i64..3_500,
        pct_bp in 0i64..1_000,
        floor in 0i64..100,
    ) {
        prop_assume!(pct_bp > 0 || floor > 0);
        let input = MinimumPaymentInput {
            balance: Decimal::from(balance),
            annual_rate: Decimal::new(rate_bp, 4),
            min_payment_pct: Decimal::new(pct_bp, 4),
            min_payment_floor: Decimal::from(floor),
            max_periods: 600,
            include_schedule: true,
        };
        let sim = minimum_payment::simulate(&input).unwrap();
        prop_assert!(sim.periods <= 600);
        prop_assert!(sim.schedule.iter().all(|row| row.balance >= Decimal::ZERO));
    }
}
