use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::HomeFinError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Years};
use crate::HomeFinResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Convert a nominal annual rate to the monthly rate used by every
/// monthly-compounding calculation (simple division, not the effective rate).
pub fn monthly_rate(annual_rate: Rate) -> Rate {
    annual_rate / MONTHS_PER_YEAR
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
///
/// Overflow is reported as an input error instead of panicking.
pub fn compound(rate: Rate, n: u32) -> HomeFinResult<Decimal> {
    let factor = Decimal::ONE + rate;
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result
            .checked_mul(factor)
            .ok_or_else(|| HomeFinError::invalid("periods", format!("(1 + {rate})^{n} overflows")))?;
    }
    Ok(result)
}

/// Lift a `checked_*` result into an input error when the value leaves the
/// `Decimal` range.
pub(crate) fn checked(value: Option<Decimal>, field: &str) -> HomeFinResult<Decimal> {
    value.ok_or_else(|| HomeFinError::invalid(field, "result exceeds the decimal range"))
}

/// Natural log of a strictly positive value.
pub(crate) fn ln(value: Decimal, context: &str) -> HomeFinResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(HomeFinError::invalid(
            context,
            format!("logarithm of non-positive value {value}"),
        ));
    }
    value
        .checked_ln()
        .ok_or_else(|| HomeFinError::invalid(context, format!("logarithm of {value} is undefined")))
}

/// Compound annual growth rate: (end / begin)^(1 / years) - 1
pub fn cagr(begin_value: Money, end_value: Money, years: Years) -> HomeFinResult<Rate> {
    if begin_value <= Decimal::ZERO {
        return Err(HomeFinError::invalid("begin_value", "must be > 0"));
    }
    if end_value < Decimal::ZERO {
        return Err(HomeFinError::invalid("end_value", "must be >= 0"));
    }
    if years <= Decimal::ZERO {
        return Err(HomeFinError::invalid("years", "must be > 0"));
    }
    if end_value.is_zero() {
        return Ok(dec!(-1));
    }

    let ratio = end_value / begin_value;
    let growth = ratio
        .checked_powd(Decimal::ONE / years)
        .ok_or_else(|| HomeFinError::invalid("years", "growth factor overflows"))?;
    Ok(growth - Decimal::ONE)
}

/// Simple return on investment: (value - cost) / cost
pub fn roi(cost: Money, value: Money) -> HomeFinResult<Rate> {
    if cost <= Decimal::ZERO {
        return Err(HomeFinError::DivisionByZero {
            context: "ROI cost basis".into(),
        });
    }
    Ok((value - cost) / cost)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthInput {
    pub begin_value: Money,
    pub end_value: Money,
    pub years: Years,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthOutput {
    pub gain: Money,
    pub total_return: Rate,
    pub cagr: Rate,
}

/// Total and annualised return between two values.
pub fn compare_growth(input: &GrowthInput) -> HomeFinResult<ComputationOutput<GrowthOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let cagr = cagr(input.begin_value, input.end_value, input.years)?;
    let total_return = roi(input.begin_value, input.end_value)?;
    if input.years < Decimal::ONE {
        warnings.push("Holding period under one year; CAGR annualises a partial-year return".into());
    }

    let output = GrowthOutput {
        gain: input.end_value - input.begin_value,
        total_return,
        cagr,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Compound annual growth rate and simple return",
        &serde_json::json!({
            "begin_value": input.begin_value.to_string(),
            "end_value": input.end_value.to_string(),
            "years": input.years.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(0.06)), dec!(0.005));
    }

    #[test]
    fn test_compound_basic() {
        assert_eq!(compound(dec!(0.10), 2).unwrap(), dec!(1.21));
        assert_eq!(compound(dec!(0.10), 0).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_compound_overflow_is_an_error() {
        assert!(compound(dec!(100), 50).is_err());
    }

    #[test]
    fn test_cagr_doubling_over_ten_years() {
        let rate = cagr(dec!(1000), dec!(2000), dec!(10)).unwrap();
        // 2^(1/10) - 1 ≈ 7.177%
        assert!((rate - dec!(0.07177)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_cagr_total_loss() {
        assert_eq!(cagr(dec!(500), dec!(0), dec!(3)).unwrap(), dec!(-1));
    }

    #[test]
    fn test_cagr_rejects_zero_years() {
        assert!(cagr(dec!(500), dec!(600), dec!(0)).is_err());
    }

    #[test]
    fn test_roi() {
        assert_eq!(roi(dec!(200), dec!(250)).unwrap(), dec!(0.25));
        assert!(roi(dec!(0), dec!(250)).is_err());
    }

    #[test]
    fn test_compare_growth_envelope() {
        let out = compare_growth(&GrowthInput {
            begin_value: dec!(1000),
            end_value: dec!(2000),
            years: dec!(10),
        })
        .unwrap();
        assert_eq!(out.result.gain, dec!(1000));
        assert_eq!(out.result.total_return, dec!(1));
        assert!((out.result.cagr - dec!(0.07177)).abs() < dec!(0.0001));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_checked_maps_overflow_to_invalid_input() {
        assert_eq!(checked(dec!(2).checked_mul(dec!(3)), "x").unwrap(), dec!(6));
        let err = checked(Decimal::MAX.checked_mul(dec!(2)), "periods").unwrap_err();
        assert!(matches!(err, HomeFinError::InvalidInput { ref field, .. } if field == "periods"));
    }

    #[test]
    fn test_ln_rejects_non_positive() {
        assert!(ln(dec!(0), "x").is_err());
        assert!(ln(dec!(-1), "x").is_err());
        assert!(ln(dec!(1), "x").unwrap().abs() < dec!(0.0000001));
    }
}
