use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeLoanError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error(
        "Insufficient equity: equity does not cover the acquisition costs ({acquisition_cost}), shortfall {shortfall}"
    )]
    InsufficientEquity {
        acquisition_cost: Decimal,
        shortfall: Decimal,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for HomeLoanError {
    fn from(e: serde_json::Error) -> Self {
        HomeLoanError::SerializationError(e.to_string())
    }
}
