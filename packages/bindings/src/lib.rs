use napi::Result as NapiResult;
use napi_derive::napi;
use serde::{de::DeserializeOwned, Serialize};

use homefin_core::HomeFinResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse the JSON input, run the calculation, serialise the envelope.
fn run_json<I, O>(input_json: &str, calc: impl FnOnce(&I) -> HomeFinResult<O>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = calc(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_loan(input_json: String) -> NapiResult<String> {
    run_json(&input_json, homefin_core::loans::amortization::analyze_loan)
}

#[napi]
pub fn compare_refinance(input_json: String) -> NapiResult<String> {
    run_json(&input_json, homefin_core::loans::refinance::compare_refinance)
}

// ---------------------------------------------------------------------------
// Savings
// ---------------------------------------------------------------------------

#[napi]
pub fn project_savings(input_json: String) -> NapiResult<String> {
    run_json(&input_json, homefin_core::savings::annuity::project_savings)
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_income_tax(input_json: String) -> NapiResult<String> {
    run_json(&input_json, homefin_core::tax::brackets::calculate_income_tax)
}

#[napi]
pub fn calculate_capital_gains_tax(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        homefin_core::tax::capital_gains::calculate_capital_gains_tax,
    )
}

// ---------------------------------------------------------------------------
// Revolving credit
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_minimum_payment(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        homefin_core::revolving::minimum_payment::analyze_minimum_payment,
    )
}

// ---------------------------------------------------------------------------
// Growth
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_growth(input_json: String) -> NapiResult<String> {
    run_json(&input_json, homefin_core::time_value::compare_growth)
}
