//! Column type inference and row coercion.
//!
//! SQLite uses per-value storage classes, so a "numeric" column can yield
//! text on some rows. The first row of a result decides each column's
//! [DataType]; every later row is reconciled against it with [coerce].
//!
//! The policy is lossy: a value that cannot be represented in the column's
//! type becomes [INT_SENTINEL] or `NaN`. Callers must read those as
//! "unrepresentable", not as "missing".

use crate::data_type::{DataType, StorageClass};
use crate::error::{Error, Result};
use crate::value::Value;

/// Stored in an integer column when the row held a real or text value.
pub const INT_SENTINEL: i64 = i64::MAX;

/// Outcome of reconciling one native value with its column type.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Int(i64),
    Float(f64),
    Text(String),
    /// No rule exists for this combination; building the result set fails.
    Reject(StorageClass),
}

/// Decides a column's type from the storage class of its first-row value.
pub fn infer(column: &str, class: StorageClass) -> Result<DataType> {
    match class {
        StorageClass::Integer => Ok(DataType::Int),
        StorageClass::Real => Ok(DataType::Float),
        StorageClass::Text => Ok(DataType::Text),
        StorageClass::Null | StorageClass::Blob => Err(Error::UnsupportedType {
            column: column.to_string(),
            class,
        }),
    }
}

/// Applies the coercion table for a value arriving in a column of type `target`.
pub fn coerce(target: DataType, value: Value) -> Coerced {
    match (target, value) {
        (DataType::Int, Value::Int(i)) => Coerced::Int(i),
        (DataType::Int, Value::Float(_) | Value::Text(_)) => Coerced::Int(INT_SENTINEL),

        (DataType::Text, Value::Int(i)) => Coerced::Text(i.to_string()),
        (DataType::Text, Value::Float(f)) => Coerced::Text(render_real(f)),
        (DataType::Text, Value::Text(s)) => Coerced::Text(s),

        (DataType::Float, Value::Float(f)) => Coerced::Float(f),
        (DataType::Float, Value::Int(i)) => Coerced::Float(i as f64),
        (DataType::Float, Value::Text(_)) => Coerced::Float(f64::NAN),

        (_, v @ (Value::Null | Value::Blob(_))) => Coerced::Reject(v.storage_class()),
    }
}

/// Renders a real the way SQLite's `CAST(x AS TEXT)` does (`%!.15g`):
/// 15 significant digits, exponent form below 1e-4 or from 1e15 up,
/// and a fraction part that is never empty (`3.0`, `1.0e+15`).
pub(crate) fn render_real(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }

    // Rounded to 15 significant digits first, so the exponent already
    // accounts for carries like 9.99..e14 -> 1.0e15.
    let sci = format!("{f:.14e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if !(-4..15).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exp.abs())
    } else {
        let decimals = (14 - exp) as usize;
        trim_fraction(&format!("{f:.decimals$}"))
    }
}

fn trim_fraction(digits: &str) -> String {
    match digits.split_once('.') {
        Some((int, frac)) => match frac.trim_end_matches('0') {
            "" => format!("{int}.0"),
            frac => format!("{int}.{frac}"),
        },
        None => format!("{digits}.0"),
    }
}
