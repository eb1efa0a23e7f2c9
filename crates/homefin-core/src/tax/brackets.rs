use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::HomeFinError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::HomeFinResult;

// ---------------------------------------------------------------------------
// Bracket table
// ---------------------------------------------------------------------------

/// One marginal bracket. `upper_bound: None` marks the open-ended top bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub rate: Rate,
    #[serde(default)]
    pub upper_bound: Option<Money>,
}

/// A progressive schedule covering [0, ∞): contiguous brackets with strictly
/// ascending upper bounds and an unbounded final bracket.
///
/// Deserialising from a JSON array runs the same checks as [`TaxBracketTable::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct TaxBracketTable {
    brackets: Vec<TaxBracket>,
}

/// A bracket resolved to its [floor, ceiling) range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketSlice {
    pub floor: Money,
    pub ceiling: Option<Money>,
    pub rate: Rate,
}

impl TaxBracketTable {
    pub fn new(brackets: Vec<TaxBracket>) -> HomeFinResult<Self> {
        if brackets.is_empty() {
            return Err(HomeFinError::invalid("brackets", "table must not be empty"));
        }

        let last = brackets.len() - 1;
        let mut floor = Decimal::ZERO;
        for (i, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(HomeFinError::invalid(
                    "brackets",
                    format!("bracket {i} rate {} outside [0, 1]", bracket.rate),
                ));
            }
            match (bracket.upper_bound, i == last) {
                (Some(bound), false) => {
                    if bound <= floor {
                        return Err(HomeFinError::invalid(
                            "brackets",
                            format!("bracket {i} upper bound {bound} is not above {floor}"),
                        ));
                    }
                    floor = bound;
                }
                (None, false) => {
                    return Err(HomeFinError::invalid(
                        "brackets",
                        format!("only the final bracket may be unbounded (bracket {i})"),
                    ));
                }
                (Some(_), true) => {
                    return Err(HomeFinError::invalid(
                        "brackets",
                        "final bracket must be unbounded",
                    ));
                }
                (None, true) => {}
            }
        }

        Ok(TaxBracketTable { brackets })
    }

    pub fn from_json(json: &str) -> HomeFinResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn slices(&self) -> impl Iterator<Item = BracketSlice> + '_ {
        let mut floor = Decimal::ZERO;
        self.brackets.iter().map(move |b| {
            let slice = BracketSlice {
                floor,
                ceiling: b.upper_bound,
                rate: b.rate,
            };
            if let Some(c) = b.upper_bound {
                floor = c;
            }
            slice
        })
    }
}

impl TryFrom<Vec<TaxBracket>> for TaxBracketTable {
    type Error = HomeFinError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        TaxBracketTable::new(brackets)
    }
}

impl From<TaxBracketTable> for Vec<TaxBracket> {
    fn from(table: TaxBracketTable) -> Self {
        table.brackets
    }
}

// ---------------------------------------------------------------------------
// Core formulas
// ---------------------------------------------------------------------------

/// Length of [lo, hi) that falls inside `slice`.
fn slice_span(slice: &BracketSlice, lo: Money, hi: Money) -> Money {
    let start = lo.max(slice.floor);
    let end = match slice.ceiling {
        Some(c) => hi.min(c),
        None => hi,
    };
    (end - start).max(Decimal::ZERO)
}

fn slice_tax(slice: &BracketSlice, lo: Money, hi: Money) -> Money {
    slice_span(slice, lo, hi) * slice.rate
}

/// Progressive tax on `taxable_amount`. Never negative, non-decreasing in
/// the amount.
pub fn tax_owed(taxable_amount: Money, table: &TaxBracketTable) -> HomeFinResult<Money> {
    if taxable_amount < Decimal::ZERO {
        return Err(HomeFinError::invalid("taxable_amount", "must be >= 0"));
    }
    Ok(table
        .slices()
        .take_while(|s| s.floor < taxable_amount)
        .map(|s| slice_tax(&s, Decimal::ZERO, taxable_amount))
        .sum())
}

/// Tax on `gains` stacked on top of `ordinary_income`: the ordinary income
/// fills the lower brackets first, and each bracket only taxes the gains
/// above `max(ordinary_income, bracket_floor)`.
pub fn stacked_capital_gains_tax(
    gains: Money,
    ordinary_income: Money,
    table: &TaxBracketTable,
) -> HomeFinResult<Money> {
    if gains < Decimal::ZERO {
        return Err(HomeFinError::invalid("gains", "must be >= 0"));
    }
    if ordinary_income < Decimal::ZERO {
        return Err(HomeFinError::invalid("ordinary_income", "must be >= 0"));
    }
    let top = ordinary_income + gains;
    Ok(table
        .slices()
        .map(|s| slice_tax(&s, ordinary_income, top))
        .sum())
}

/// Rate applied to the next unit of income above `taxable_amount`.
pub fn marginal_rate(taxable_amount: Money, table: &TaxBracketTable) -> Rate {
    table
        .slices()
        .find(|s| s.ceiling.map_or(true, |c| taxable_amount < c))
        .map(|s| s.rate)
        .unwrap_or(Decimal::ZERO)
}

/// Average rate paid on `taxable_amount` (zero for a zero amount).
pub fn effective_rate(taxable_amount: Money, table: &TaxBracketTable) -> HomeFinResult<Rate> {
    if taxable_amount.is_zero() {
        return Ok(Decimal::ZERO);
    }
    Ok(tax_owed(taxable_amount, table)? / taxable_amount)
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeTaxInput {
    pub gross_income: Money,
    #[serde(default)]
    pub deduction: Money,
    pub brackets: TaxBracketTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketLine {
    pub rate: Rate,
    pub floor: Money,
    pub ceiling: Option<Money>,
    pub taxable_in_bracket: Money,
    pub tax: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeTaxOutput {
    pub taxable_income: Money,
    pub tax_owed: Money,
    pub marginal_rate: Rate,
    pub effective_rate: Rate,
    pub after_tax_income: Money,
    pub breakdown: Vec<BracketLine>,
}

/// Income tax on gross income less a deduction, with a per-bracket breakdown.
pub fn calculate_income_tax(input: &IncomeTaxInput) -> HomeFinResult<ComputationOutput<IncomeTaxOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.gross_income < Decimal::ZERO {
        return Err(HomeFinError::invalid("gross_income", "must be >= 0"));
    }
    if input.deduction < Decimal::ZERO {
        return Err(HomeFinError::invalid("deduction", "must be >= 0"));
    }

    let mut taxable_income = input.gross_income - input.deduction;
    if taxable_income < Decimal::ZERO {
        debug!(%taxable_income, "deduction exceeds income; taxable income clamped to zero");
        warnings.push("Deduction exceeds gross income; taxable income set to 0".into());
        taxable_income = Decimal::ZERO;
    }

    let breakdown: Vec<BracketLine> = input
        .brackets
        .slices()
        .take_while(|s| s.floor < taxable_income)
        .map(|s| {
            let span = slice_span(&s, Decimal::ZERO, taxable_income);
            BracketLine {
                rate: s.rate,
                floor: s.floor,
                ceiling: s.ceiling,
                taxable_in_bracket: span,
                tax: span * s.rate,
            }
        })
        .collect();

    let owed = tax_owed(taxable_income, &input.brackets)?;
    let output = IncomeTaxOutput {
        taxable_income,
        tax_owed: owed,
        marginal_rate: marginal_rate(taxable_income, &input.brackets),
        effective_rate: effective_rate(taxable_income, &input.brackets)?,
        after_tax_income: input.gross_income - owed,
        breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Progressive marginal-bracket income tax",
        &serde_json::json!({
            "gross_income": input.gross_income.to_string(),
            "deduction": input.deduction.to_string(),
            "brackets": input.brackets.brackets().len(),
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

    fn bracket(rate: Decimal, upper: Option<Decimal>) -> TaxBracket {
        TaxBracket { rate, upper_bound: upper }
    }

    fn simple_table() -> TaxBracketTable {
        TaxBracketTable::new(vec![
            bracket(dec!(0.10), Some(dec!(10000))),
            bracket(dec!(0.20), Some(dec!(50000))),
            bracket(dec!(0.30), None),
        ])
        .unwrap()
    }

    #[test]
    fn test_tax_owed_zero() {
        assert_eq!(tax_owed(Decimal::ZERO, &simple_table()).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_tax_owed_within_first_bracket() {
        assert_eq!(tax_owed(dec!(5000), &simple_table()).unwrap(), dec!(500));
    }

    #[test]
    fn test_tax_owed_spans_brackets() {
        // 1000 + 8000 + 15000
        assert_eq!(tax_owed(dec!(100000), &simple_table()).unwrap(), dec!(24000));
    }

    #[test]
    fn test_tax_owed_rejects_negative() {
        assert!(tax_owed(dec!(-1), &simple_table()).is_err());
    }

    #[test]
    fn test_stacked_gains_with_no_ordinary_income_matches_tax_owed() {
        let t = simple_table();
        assert_eq!(
            stacked_capital_gains_tax(dec!(60000), Decimal::ZERO, &t).unwrap(),
            tax_owed(dec!(60000), &t).unwrap()
        );
    }

    #[test]
    fn test_stacked_gains_above_ordinary_income() {
        // Ordinary income fills [0, 40000); gains occupy [40000, 70000)
        // 10000 @ 20% + 20000 @ 30%
        let tax = stacked_capital_gains_tax(dec!(30000), dec!(40000), &simple_table()).unwrap();
        assert_eq!(tax, dec!(8000));
    }

    #[test]
    fn test_marginal_rate_at_boundary_uses_next_bracket() {
        let t = simple_table();
        assert_eq!(marginal_rate(dec!(9999), &t), dec!(0.10));
        assert_eq!(marginal_rate(dec!(10000), &t), dec!(0.20));
        assert_eq!(marginal_rate(dec!(1000000), &t), dec!(0.30));
    }

    #[test]
    fn test_table_rejects_descending_bounds() {
        let err = TaxBracketTable::new(vec![
            bracket(dec!(0.10), Some(dec!(50000))),
            bracket(dec!(0.20), Some(dec!(10000))),
            bracket(dec!(0.30), None),
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn test_table_rejects_bounded_final_bracket() {
        assert!(TaxBracketTable::new(vec![bracket(dec!(0.10), Some(dec!(50000)))]).is_err());
    }

    #[test]
    fn test_table_rejects_unbounded_middle_bracket() {
        let err = TaxBracketTable::new(vec![
            bracket(dec!(0.10), None),
            bracket(dec!(0.20), None),
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn test_table_rejects_rate_above_one() {
        assert!(TaxBracketTable::new(vec![bracket(dec!(1.5), None)]).is_err());
    }

    #[test]
    fn test_table_rejects_empty() {
        assert!(TaxBracketTable::new(Vec::new()).is_err());
    }

    #[test]
    fn test_table_from_json_validates() {
        let ok = TaxBracketTable::from_json(
            r#"[{"rate": "0.1", "upper_bound": "100"}, {"rate": "0.2"}]"#,
        );
        assert!(ok.is_ok());
        let bad = TaxBracketTable::from_json(
            r#"[{"rate": "0.1", "upper_bound": "100"}, {"rate": "0.2", "upper_bound": "50"}]"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_income_tax_deduction_clamps() {
        let input = IncomeTaxInput {
            gross_income: dec!(8000),
            deduction: dec!(14600),
            brackets: simple_table(),
        };
        let out = calculate_income_tax(&input).unwrap();
        assert_eq!(out.result.taxable_income, Decimal::ZERO);
        assert_eq!(out.result.tax_owed, Decimal::ZERO);
        assert!(out.result.breakdown.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_income_tax_breakdown_sums_to_total() {
        let input = IncomeTaxInput {
            gross_income: dec!(100000),
            deduction: Decimal::ZERO,
            brackets: simple_table(),
        };
        let out = calculate_income_tax(&input).unwrap().result;
        assert_eq!(out.breakdown.len(), 3);
        let sum: Decimal = out.breakdown.iter().map(|l| l.tax).sum();
        assert_eq!(sum, out.tax_owed);
        assert_eq!(out.breakdown[1].taxable_in_bracket, dec!(40000));
        assert_eq!(out.effective_rate, dec!(0.24));
    }
}
