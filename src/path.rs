//! Dotted attribute paths over search rows
//!
//! Supports:
//! - `name` (top-level field)
//! - `automatic.ipaddress` (nested objects)
//! - `run_list.0` (numeric component indexes an array)
//!
//! A missing key resolves to empty text. A key that exists but has the
//! wrong shape is a [`PathError`]:
//! - descending into a scalar → `NotObject` with the path consumed so far
//! - ending on an object or array → `IsObject` with the full path

use serde_json::Value;

use crate::error::PathError;

/// Successful outcome of a path lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Some component was absent (or null)
    Empty,
    /// Textual form of the scalar at the end of the path
    Value(String),
}

impl Resolved {
    pub fn into_text(self) -> String {
        match self {
            Resolved::Empty => String::new(),
            Resolved::Value(text) => text,
        }
    }
}

/// Resolve `path` against `item`
///
/// Examples:
/// - `"x.y"` on `{"x": {"y": "v"}}` → `Value("v")`
/// - `"x.y"` on `{"x": "scalar"}` → `NotObject { path: "x.y" }`
/// - `"x"` on `{"x": {"y": "v"}}` → `IsObject { path: "x" }`
/// - `"missing"` on `{"x": 1}` → `Empty`
pub fn resolve(item: &Value, path: &str) -> Result<Resolved, PathError> {
    let mut current = item;
    let mut consumed = 0;

    for component in path.split('.') {
        consumed += component.len();

        current = match current {
            Value::Null => return Ok(Resolved::Empty),
            Value::Object(map) => match map.get(component) {
                Some(child) => child,
                None => return Ok(Resolved::Empty),
            },
            Value::Array(items) => {
                match component.parse::<usize>().ok().and_then(|i| items.get(i)) {
                    Some(child) => child,
                    None => return Ok(Resolved::Empty),
                }
            }
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                return Err(PathError::NotObject {
                    path: path[..consumed].to_string(),
                });
            }
        };

        // account for the '.' that follows this component
        consumed += 1;
    }

    scalar_text(current, path)
}

fn scalar_text(value: &Value, path: &str) -> Result<Resolved, PathError> {
    match value {
        Value::Null => Ok(Resolved::Empty),
        Value::String(s) => Ok(Resolved::Value(s.clone())),
        Value::Number(n) => Ok(Resolved::Value(n.to_string())),
        Value::Bool(b) => Ok(Resolved::Value(b.to_string())),
        Value::Object(_) | Value::Array(_) => Err(PathError::IsObject {
            path: path.to_string(),
        }),
    }
}
