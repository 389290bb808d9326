//! Column conversion helpers shared by the repositories.

use rust_decimal::Decimal;
use std::str::FromStr;

use autosave_core::errors::{DatabaseError, Error, Result};

/// Money and rates are stored as TEXT to keep full decimal precision.
pub(crate) fn decimal_column(value: &str, column: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e| {
        Error::Database(DatabaseError::Internal(format!(
            "Column '{}' holds '{}', which is not a decimal: {}",
            column, value, e
        )))
    })
}

/// Parses a TEXT column holding one of the domain enums.
pub(crate) fn enum_column<T>(value: &str, column: &str) -> Result<T>
where
    T: FromStr<Err = Error>,
{
    value.parse().map_err(|e: Error| {
        Error::Database(DatabaseError::Internal(format!(
            "Column '{}' holds an unknown value: {}",
            column, e
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use autosave_core::operations::MovementStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn decimal_column_keeps_precision() {
        assert_eq!(decimal_column("1234.56", "amount").unwrap(), dec!(1234.56));
        assert!(matches!(
            decimal_column("12,5", "amount"),
            Err(Error::Database(DatabaseError::Internal(_)))
        ));
    }

    #[test]
    fn enum_column_reports_corrupt_values_as_database_errors() {
        let status: MovementStatus = enum_column("failed", "status").unwrap();
        assert_eq!(status, MovementStatus::Failed);

        let err = enum_column::<MovementStatus>("done", "status").unwrap_err();
        assert!(matches!(err, Error::Database(DatabaseError::Internal(_))));
    }
}
