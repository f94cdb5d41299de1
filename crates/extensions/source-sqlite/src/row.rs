//! Row to JSON conversion.

use std::fmt::Write;

use rusqlite::Row;
use rusqlite::types::ValueRef;
use serde_json::{Map, Number, Value};

/// Convert one row into an object keyed by `columns`.
pub(crate) fn row_to_document(row: &Row<'_>, columns: &[String]) -> rusqlite::Result<Value> {
    let mut object = Map::with_capacity(columns.len());
    for (idx, name) in columns.iter().enumerate() {
        object.insert(name.clone(), value_to_json(row.get_ref(idx)?));
    }
    Ok(Value::Object(object))
}

/// SQLite storage classes map to JSON directly; blobs become `{"$blob": "<hex>"}`.
pub(crate) fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2);
            for b in bytes {
                let _ = write!(hex, "{:02x}", b);
            }
            let mut object = Map::with_capacity(1);
            object.insert("$blob".to_string(), Value::String(hex));
            Value::Object(object)
        }
    }
}

/// Quote an identifier for interpolation into SQL.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
