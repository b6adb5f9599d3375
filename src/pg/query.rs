use chrono::{DateTime, NaiveDateTime, Utc};
use postgres::Statement;
use serde_json::Value as JsonValue;

use crate::error::SqlGatewayError;
use crate::rows::Rows;
use crate::types::SqlValue;

/// Decode driver rows into gateway rows using statement column metadata.
///
/// Decode failures are carried per row, so one bad row does not discard the
/// rest of the result.
pub(crate) fn decode_rows(statement: &Statement, rows: &[postgres::Row]) -> Rows {
    let column_names: Vec<String> = statement
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = column_names.len();

    let decoded = rows.iter().map(|row| decode_row(row, column_count)).collect();
    Rows::new(column_names, decoded)
}

fn decode_row(
    row: &postgres::Row,
    column_count: usize,
) -> Result<Vec<SqlValue>, SqlGatewayError> {
    let mut values = Vec::with_capacity(column_count);
    for idx in 0..column_count {
        values.push(extract_value(row, idx)?);
    }
    Ok(values)
}

/// Extract one cell, mapping the column's declared type onto [`SqlValue`].
///
/// # Errors
/// Returns [`SqlGatewayError::PostgresError`] when the cell cannot be read
/// as the declared type, or [`SqlGatewayError::ConversionError`] for column
/// types the gateway does not model.
pub fn extract_value(row: &postgres::Row, idx: usize) -> Result<SqlValue, SqlGatewayError> {
    let type_name = row.columns()[idx].type_().name().to_owned();

    match type_name.as_str() {
        "int2" => {
            let val: Option<i16> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))))
        }
        "int4" => {
            let val: Option<i32> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))))
        }
        "int8" => {
            let val: Option<i64> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Int))
        }
        "float4" => {
            let val: Option<f32> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Float(f64::from(v))))
        }
        "float8" => {
            let val: Option<f64> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Float))
        }
        "bool" => {
            let val: Option<bool> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Bool))
        }
        "timestamp" => {
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Timestamp))
        }
        "timestamptz" => {
            let val: Option<DateTime<Utc>> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Timestamp(v.naive_utc())))
        }
        "json" | "jsonb" => {
            let val: Option<JsonValue> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Json))
        }
        "bytea" => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Bytes))
        }
        "text" | "varchar" | "char" | "bpchar" | "name" => {
            let val: Option<String> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Text))
        }
        other => {
            // Last resort: many scalar types read fine as text.
            match row.try_get::<_, Option<String>>(idx) {
                Ok(val) => Ok(val.map_or(SqlValue::Null, SqlValue::Text)),
                Err(_) => Err(SqlGatewayError::ConversionError(format!(
                    "unsupported column type `{other}` at index {idx}"
                ))),
            }
        }
    }
}
