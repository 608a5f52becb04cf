use std::str::FromStr;

use menu_core::RepositoryError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::{Row, TypeInfo, ValueRef};

/// Get a price from a row, handling both INTEGER and REAL SQLite storage.
///
/// REAL values go through their shortest decimal rendering, so a stored
/// `12.5` reads back as exactly `12.5` rather than the nearest binary
/// expansion.
pub fn get_decimal(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    let type_info = value_ref.type_info();
    let type_name = type_info.name();

    match type_name {
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get INTEGER from '{}': {}", column, e))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::from_str(&val.to_string()).map_err(|e| {
                RepositoryError::Database(format!(
                    "Value {} in column '{}' is out of range for Decimal: {}",
                    val, column, e
                ))
            })
        }
        "NULL" => Ok(Decimal::ZERO),
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Convert a Decimal to f64 for SQLite storage, refusing values that
/// [`get_decimal`] could not read back.
pub fn storable_f64(d: Decimal) -> Result<f64, RepositoryError> {
    let unreadable = || RepositoryError::Database(format!("Price {} is too large to store", d));
    let val = d.to_f64().ok_or_else(unreadable)?;
    Decimal::from_str(&val.to_string()).map_err(|_| unreadable())?;
    Ok(val)
}
