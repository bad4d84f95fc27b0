use thiserror::Error;

use crate::domain::ParseCentsError;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// Negative balance or amount, insufficient funds, malformed input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Raised by a balance observer
    #[error("Balance observer failed: {0}")]
    Observer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl LedgerError {
    pub fn account_not_found(identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.to_string(),
        }
    }

    pub fn balance_overflow() -> Self {
        Self::InvalidArgument("Balance out of range".to_string())
    }

    pub fn insufficient_funds(balance: i64, required: i64) -> Self {
        Self::InvalidArgument(format!(
            "Insufficient balance: have {}, need {}",
            crate::domain::format_cents(balance),
            crate::domain::format_cents(required)
        ))
    }
}

impl From<ParseCentsError> for LedgerError {
    fn from(err: ParseCentsError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
