//! Column conversions shared by the SQLite repositories.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;

pub(crate) fn to_millis(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

pub(crate) fn opt_to_millis(value: Option<DateTime<Utc>>) -> Option<i64> {
    value.map(to_millis)
}

pub(crate) fn from_millis(idx: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        conversion_failure(idx, Type::Integer, format!("timestamp out of range: {millis}"))
    })
}

pub(crate) fn opt_from_millis(
    idx: usize,
    millis: Option<i64>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    millis.map(|ms| from_millis(idx, ms)).transpose()
}

/// Parse a text column through the type's `FromStr`.
pub(crate) fn parse_text<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>().map_err(|err| conversion_failure(idx, Type::Text, err))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn int_to_bool(value: i64) -> bool {
    value != 0
}

fn conversion_failure(idx: usize, ty: Type, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        ty,
        Box::<dyn std::error::Error + Send + Sync>::from(message),
    )
}
