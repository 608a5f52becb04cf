//! Input checks shared by the add forms and the grid cell editors.
//!
//! Every numeric field in the application goes through the same two
//! parsers, so a value rejected in a form is also rejected in a grid cell.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    EmptyField { field: &'static str },

    #[error("invalid {field} '{value}': enter a non-negative whole number")]
    InvalidInteger { field: &'static str, value: String },

    #[error("invalid {field} '{value}': enter a non-negative number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} '{value}' is above the maximum of {max}")]
    TooLarge {
        field: &'static str,
        value: String,
        max: Decimal,
    },
}

impl ValidationError {
    /// The form or grid field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyField { field }
            | Self::InvalidInteger { field, .. }
            | Self::InvalidNumber { field, .. }
            | Self::TooLarge { field, .. } => field,
        }
    }
}

/// Returns the trimmed value, or [`ValidationError::EmptyField`] when nothing
/// but whitespace was entered.
pub fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyField { field })
    } else {
        Ok(trimmed)
    }
}

/// Parses a whole number that must not be negative.
pub fn parse_non_negative_int(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    let invalid = || ValidationError::InvalidInteger {
        field,
        value: value.to_string(),
    };
    match value.trim().parse::<i64>() {
        Ok(n) if n >= 0 => Ok(n),
        _ => {
            tracing::warn!(field, input = %value, "rejected non-negative integer");
            Err(invalid())
        }
    }
}

/// Largest amount [`parse_non_negative_decimal`] accepts. Amounts are stored
/// as REAL, and values near `Decimal::MAX` do not read back.
pub const MAX_DECIMAL: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Parses a decimal that must not be negative and not exceed
/// [`MAX_DECIMAL`].
///
/// Comma thousands separators are accepted (`"1,250.00"`).
pub fn parse_non_negative_decimal(
    field: &'static str,
    value: &str,
) -> Result<Decimal, ValidationError> {
    let normalized = value.trim().replace(',', "");
    match Decimal::from_str(&normalized) {
        Ok(d) if d > MAX_DECIMAL => {
            tracing::warn!(field, input = %value, "rejected decimal above maximum");
            Err(ValidationError::TooLarge {
                field,
                value: value.to_string(),
                max: MAX_DECIMAL,
            })
        }
        Ok(d) if d >= Decimal::ZERO => Ok(d),
        _ => {
            tracing::warn!(field, input = %value, "rejected non-negative decimal");
            Err(ValidationError::InvalidNumber {
                field,
                value: value.to_string(),
            })
        }
    }
}
