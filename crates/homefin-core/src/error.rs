use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeFinError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl HomeFinError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        HomeFinError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for HomeFinError {
    fn from(e: serde_json::Error) -> Self {
        HomeFinError::SerializationError(e.to_string())
    }
}
