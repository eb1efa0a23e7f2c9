use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Solved period counts. May be fractional (e.g. 118.4 months).
pub type Periods = Decimal;

/// How long something takes to resolve: a loan to pay off, a balance to run
/// dry, a savings goal to be reached.
///
/// `Never` is a legitimate answer, not an error: a payment that only covers
/// interest never amortizes the loan, and a withdrawal below the balance's
/// earnings lasts indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "periods", rename_all = "snake_case")]
pub enum Horizon {
    Finite(Periods),
    Never,
}

impl Horizon {
    pub fn is_finite(&self) -> bool {
        matches!(self, Horizon::Finite(_))
    }

    /// The period count when finite.
    pub fn periods(&self) -> Option<Periods> {
        match self {
            Horizon::Finite(n) => Some(*n),
            Horizon::Never => None,
        }
    }

    /// Whole periods needed, rounding any partial final period up.
    pub fn whole_periods(&self) -> Option<u32> {
        self.periods().and_then(|n| n.ceil().to_u32())
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
