//! Household finance formulas shared by the calculator pages: loan
//! amortization, annuity growth, bracketed tax and revolving-balance payoff.
//!
//! Every function is pure. Outcomes that never resolve ("never pays off",
//! "lasts forever") are reported as [`Horizon::Never`] rather than as an
//! infinite number.

pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "loans")]
pub mod loans;

#[cfg(feature = "savings")]
pub mod savings;

#[cfg(feature = "tax")]
pub mod tax;

#[cfg(feature = "revolving")]
pub mod revolving;

pub use error::HomeFinError;
pub use types::*;

/// Standard result type for all homefin operations
pub type HomeFinResult<T> = Result<T, HomeFinError>;
