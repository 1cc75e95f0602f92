//! Text rendering of result-set values for CSV export.
//!
//! NULL renders as an empty field and binary data as lowercase hex.
//! PostgreSQL columns are decoded by their declared type, so numerics keep
//! their scale and dates and timestamps render in ISO 8601. Types without a
//! dedicated rendering fall back to their text form.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgRow, Postgres};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Decode, Row, Type, TypeInfo};
use uuid::Uuid;

fn display<'r, T>(row: &'r PgRow, idx: usize) -> Result<String, sqlx::Error>
where
    T: Decode<'r, Postgres> + Type<Postgres> + ToString,
{
    Ok(row
        .try_get::<Option<T>, _>(idx)?
        .map(|v| v.to_string())
        .unwrap_or_default())
}

pub fn render_pg_value(row: &PgRow, idx: usize) -> Result<String, sqlx::Error> {
    let type_name = row.column(idx).type_info().name().to_string();

    match type_name.as_str() {
        "BOOL" => display::<bool>(row, idx),
        "INT2" => display::<i16>(row, idx),
        "INT4" => display::<i32>(row, idx),
        "INT8" => display::<i64>(row, idx),
        "OID" => Ok(row
            .try_get::<Option<sqlx::postgres::types::Oid>, _>(idx)?
            .map(|oid| oid.0.to_string())
            .unwrap_or_default()),
        "FLOAT4" => display::<f32>(row, idx),
        "FLOAT8" => display::<f64>(row, idx),
        "NUMERIC" => display::<Decimal>(row, idx),
        "DATE" => display::<NaiveDate>(row, idx),
        "TIME" => display::<NaiveTime>(row, idx),
        "TIMESTAMP" => Ok(row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            .unwrap_or_default()),
        "TIMESTAMPTZ" => Ok(row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_default()),
        "UUID" => display::<Uuid>(row, idx),
        "JSON" | "JSONB" => display::<serde_json::Value>(row, idx),
        "BYTEA" => Ok(row
            .try_get::<Option<Vec<u8>>, _>(idx)?
            .map(|bytes| to_hex(&bytes))
            .unwrap_or_default()),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" | "UNKNOWN" => display::<String>(row, idx),
        // Enums, domains and similar text-backed types
        _ => row
            .try_get_unchecked::<Option<String>, _>(idx)
            .map(Option::unwrap_or_default),
    }
}

/// SQLite values carry their storage class, so each kind is tried in turn
pub fn render_sqlite_value(row: &SqliteRow, idx: usize) -> Result<String, sqlx::Error> {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return Ok(v.map(|v| v.to_string()).unwrap_or_default());
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return Ok(v.map(|v| v.to_string()).unwrap_or_default());
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return Ok(v.unwrap_or_default());
    }
    row.try_get::<Option<Vec<u8>>, _>(idx)
        .map(|v| v.map(|bytes| to_hex(&bytes)).unwrap_or_default())
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}
