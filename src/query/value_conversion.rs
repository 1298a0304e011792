//! Conversion from SeaQuery values to SQLite bind parameters.

use crate::executor::LifeError;
use rusqlite::types::Value as SqlValue;
use sea_query::{Value, Values};

/// Convert one `sea_query::Value` into a bindable SQLite value
pub(crate) fn to_sql_value(value: &Value) -> Result<SqlValue, LifeError> {
    let converted = match value {
        Value::Bool(None)
        | Value::TinyInt(None)
        | Value::SmallInt(None)
        | Value::Int(None)
        | Value::BigInt(None)
        | Value::TinyUnsigned(None)
        | Value::SmallUnsigned(None)
        | Value::Unsigned(None)
        | Value::BigUnsigned(None)
        | Value::Float(None)
        | Value::Double(None)
        | Value::String(None)
        | Value::Char(None)
        | Value::Bytes(None) => SqlValue::Null,

        Value::Bool(Some(b)) => SqlValue::Integer(i64::from(*b)),
        Value::TinyInt(Some(i)) => SqlValue::Integer(i64::from(*i)),
        Value::SmallInt(Some(i)) => SqlValue::Integer(i64::from(*i)),
        Value::Int(Some(i)) => SqlValue::Integer(i64::from(*i)),
        Value::BigInt(Some(i)) => SqlValue::Integer(*i),
        Value::TinyUnsigned(Some(u)) => SqlValue::Integer(i64::from(*u)),
        Value::SmallUnsigned(Some(u)) => SqlValue::Integer(i64::from(*u)),
        Value::Unsigned(Some(u)) => SqlValue::Integer(i64::from(*u)),
        Value::BigUnsigned(Some(u)) => SqlValue::Integer(i64::try_from(*u).map_err(|_| {
            LifeError::QueryError(format!("unsigned value {u} does not fit in an SQLite integer"))
        })?),

        Value::Float(Some(f)) => SqlValue::Real(f64::from(*f)),
        Value::Double(Some(d)) => SqlValue::Real(*d),

        Value::String(Some(s)) => SqlValue::Text(s.to_string()),
        Value::Char(Some(c)) => SqlValue::Text(c.to_string()),
        Value::Bytes(Some(b)) => SqlValue::Blob(b.to_vec()),

        #[allow(unreachable_patterns)]
        other => {
            return Err(LifeError::QueryError(format!(
                "unsupported parameter type for SQLite: {other:?}"
            )))
        }
    };
    Ok(converted)
}

/// Convert every bound value of a built statement
pub(crate) fn convert_values(values: &Values) -> Result<Vec<SqlValue>, LifeError> {
    values.iter().map(to_sql_value).collect()
}
