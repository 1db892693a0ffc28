//! JSON record lists.
//!
//! Accepts either a top-level array of objects or an object wrapping such an
//! array (`{"items": [...]}` and similar). Columns appear in first-seen order.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use drugcat_model::RecordTable;

use crate::error::{IngestError, Result};

const WRAPPER_KEYS: &[&str] = &["items", "data", "rows", "records", "results"];

pub fn read_json_table(path: &Path) -> Result<RecordTable> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    read_json_bytes(name, &bytes)
}

pub fn read_json_bytes(source: &str, bytes: &[u8]) -> Result<RecordTable> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| IngestError::JsonParse {
        path: PathBuf::from(source),
        message: e.to_string(),
    })?;
    let shape_error = || IngestError::JsonShape {
        path: PathBuf::from(source),
    };
    let items = record_list(&value).ok_or_else(shape_error)?;

    let mut objects = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(map) => objects.push(map),
            Value::Null => {}
            _ => return Err(shape_error()),
        }
    }

    let mut headers: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }

    let mut table = RecordTable::new(source, headers.clone());
    for object in objects {
        let row = row_cells(&headers, object);
        if row.iter().all(String::is_empty) {
            continue;
        }
        table.push_row(row).map_err(|_| shape_error())?;
    }
    Ok(table)
}

fn record_list(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .or_else(|| map.values().find_map(Value::as_array)),
        _ => None,
    }
}

fn row_cells(headers: &[String], object: &Map<String, Value>) -> Vec<String> {
    headers
        .iter()
        .map(|header| object.get(header).map(cell_text).unwrap_or_default())
        .collect()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.trim().to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}
