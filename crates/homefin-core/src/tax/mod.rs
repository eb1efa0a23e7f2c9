pub mod brackets;
pub mod capital_gains;
