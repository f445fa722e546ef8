//! Column encodings shared by the repositories

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;

/// Fixed-width RFC 3339 so that text order matches time order
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

/// Parse a text-backed enum column
pub(crate) fn parse_text<T>(idx: usize, value: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|err: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into()))
}
