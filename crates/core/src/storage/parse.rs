//! Database value parsing utilities
//!
//! Provides error-safe parsing of stored values.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Error as SqlError, Row};

use crate::models::{FolderRegistration, User};

/// Parse a DateTime from an RFC3339 string
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, SqlError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SqlError::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// Map a `SELECT id, username, email, password_hash, created_at` row
pub fn user_from_row(row: &Row<'_>) -> Result<User, SqlError> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?)?,
    })
}

/// Map a `SELECT id, owner_id, folder_name, folder_path, created_at` row
pub fn folder_from_row(row: &Row<'_>) -> Result<FolderRegistration, SqlError> {
    Ok(FolderRegistration {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        folder_name: row.get(2)?,
        folder_path: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?)?,
    })
}

/// Extension trait for converting rusqlite Results to Option
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, SqlError>;
}

impl<T> OptionalExt<T> for Result<T, SqlError> {
    fn optional(self) -> Result<Option<T>, SqlError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(SqlError::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("2024-05-01T10:00:00Z").is_ok());
        assert!(matches!(
            parse_datetime("yesterday"),
            Err(SqlError::FromSqlConversionFailure(0, Type::Text, _))
        ));
    }

    #[test]
    fn test_optional_maps_no_rows_to_none() {
        let missing: Result<i64, SqlError> = Err(SqlError::QueryReturnedNoRows);
        assert_eq!(missing.optional().unwrap(), None);

        let found: Result<i64, SqlError> = Ok(7);
        assert_eq!(found.optional().unwrap(), Some(7));

        let failed: Result<i64, SqlError> = Err(SqlError::InvalidQuery);
        assert!(failed.optional().is_err());
    }
}
