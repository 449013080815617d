//! Row decoding helpers shared by the SQLite repositories.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};
use std::str::FromStr;

use crate::infrastructure::ports::RepoError;

/// Fixed-width RFC 3339 so text ordering matches time ordering.
pub(super) fn encode_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(super) fn decode_time(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(format!("bad timestamp '{}': {}", raw, e)))
}

pub(super) fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, RepoError> {
    serde_json::to_string(value).map_err(RepoError::serialization)
}

/// Extension trait for SQLite rows mapping decode failures to `RepoError`.
pub(super) trait RowExt {
    fn col<'r, T>(&'r self, name: &str) -> Result<T, RepoError>
    where
        T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>;

    fn count(&self, name: &str) -> Result<u32, RepoError>;

    fn time(&self, name: &str) -> Result<DateTime<Utc>, RepoError>;

    fn optional_time(&self, name: &str) -> Result<Option<DateTime<Utc>>, RepoError>;

    /// Parse a text column through `FromStr` (typed ids, enums).
    fn parsed<T>(&self, name: &str) -> Result<T, RepoError>
    where
        T: FromStr,
        T::Err: std::fmt::Display;

    fn json<T: DeserializeOwned>(&self, name: &str) -> Result<T, RepoError>;
}

impl RowExt for SqliteRow {
    fn col<'r, T>(&'r self, name: &str) -> Result<T, RepoError>
    where
        T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
    {
        self.try_get(name)
            .map_err(|e| RepoError::database("decode", format!("{}: {}", name, e)))
    }

    fn count(&self, name: &str) -> Result<u32, RepoError> {
        let raw: i64 = self.col(name)?;
        u32::try_from(raw)
            .map_err(|_| RepoError::serialization(format!("{} out of range: {}", name, raw)))
    }

    fn time(&self, name: &str) -> Result<DateTime<Utc>, RepoError> {
        let raw: String = self.col(name)?;
        decode_time(&raw)
    }

    fn optional_time(&self, name: &str) -> Result<Option<DateTime<Utc>>, RepoError> {
        let raw: Option<String> = self.col(name)?;
        raw.as_deref().map(decode_time).transpose()
    }

    fn parsed<T>(&self, name: &str) -> Result<T, RepoError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw: String = self.col(name)?;
        raw.parse()
            .map_err(|e: T::Err| RepoError::serialization(format!("{}: {}", name, e)))
    }

    fn json<T: DeserializeOwned>(&self, name: &str) -> Result<T, RepoError> {
        let raw: String = self.col(name)?;
        serde_json::from_str(&raw)
            .map_err(|e| RepoError::serialization(format!("{}: {}", name, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn encoded_times_sort_like_times() {
        let earlier = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let later = Utc.timestamp_opt(1_700_000_000, 500_000_000).unwrap();
        assert!(encode_time(earlier) < encode_time(later));
        assert_eq!(decode_time(&encode_time(later)).unwrap(), later);
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert!(matches!(
            decode_time("yesterday"),
            Err(RepoError::Serialization(_))
        ));
    }
}
