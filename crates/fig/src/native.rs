//! Conversion between values and host data
//!
//! [`Native`] is the plain-data view of a result handed back to config
//! callers. JSON is the argument format accepted from them.

use serde_json::{Map, Number};

use crate::value::{HashableValue, Object, Value};

/// A value reduced to plain host data.
#[derive(Debug, Clone, PartialEq)]
pub enum Native {
    /// A string
    String(String),
    /// A boolean
    Bool(bool),
    /// A number
    Number(f64),
    /// An error message
    Error(String),
    /// Object entries in insertion order
    Map(Vec<(Native, Native)>),
    /// Callables and scopes, passed through untouched
    Opaque(Value),
}

impl Native {
    /// Render as JSON.
    ///
    /// Maps become JSON objects keyed by each key's text (string keys as
    /// is, other keys by their source rendering). Errors become
    /// `{"error": message}`, non-finite numbers and opaque values their
    /// source rendering.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Native::String(s) => serde_json::Value::String(s.clone()),
            Native::Bool(b) => serde_json::Value::Bool(*b),
            Native::Number(n) => match Number::from_f64(*n) {
                Some(n) => serde_json::Value::Number(n),
                None => serde_json::Value::String(Value::Number(*n).code()),
            },
            Native::Error(message) => {
                let mut fields = Map::new();
                fields.insert("error".to_string(), message.clone().into());
                serde_json::Value::Object(fields)
            }
            Native::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.key_text(), value.to_json()))
                    .collect(),
            ),
            Native::Opaque(value) => serde_json::Value::String(value.code()),
        }
    }

    fn key_text(&self) -> String {
        match self {
            Native::String(s) => s.clone(),
            other => Value::from_native(other).code(),
        }
    }

    /// The error message, if this is an error.
    pub fn as_error(&self) -> Option<&str> {
        match self {
            Native::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl Value {
    /// Reduce to plain data. Objects convert recursively.
    pub fn to_native(&self) -> Native {
        match self {
            Value::String(s) => Native::String(s.to_string()),
            Value::Bool(b) => Native::Bool(*b),
            Value::Number(n) => Native::Number(*n),
            Value::Error(e) => Native::Error(e.message().to_string()),
            Value::Object(fields) => Native::Map(
                fields
                    .iter()
                    .map(|(key, value)| (key.0.to_native(), value.to_native()))
                    .collect(),
            ),
            other => Native::Opaque(other.clone()),
        }
    }

    /// Lift plain data back into a value.
    pub fn from_native(native: &Native) -> Value {
        match native {
            Native::String(s) => Value::from(s.as_str()),
            Native::Bool(b) => Value::Bool(*b),
            Native::Number(n) => Value::Number(*n),
            Native::Error(message) => Value::error(message.as_str()),
            Native::Map(entries) => {
                let fields: Object = entries
                    .iter()
                    .map(|(key, value)| {
                        (
                            HashableValue(Value::from_native(key)),
                            Value::from_native(value),
                        )
                    })
                    .collect();
                Value::from(fields)
            }
            Native::Opaque(value) => value.clone(),
        }
    }

    /// Lift a JSON argument.
    ///
    /// Arrays become objects keyed by index and `null` becomes an error,
    /// since the language has neither.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::error("null is not a value"),
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(n) => Value::Number(n),
                None => Value::error(format!("number out of range: {}", n)),
            },
            serde_json::Value::String(s) => Value::from(s.as_str()),
            serde_json::Value::Array(items) => Value::object(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (i as f64, Value::from_json(item))),
            ),
            serde_json::Value::Object(fields) => Value::object(
                fields
                    .iter()
                    .map(|(key, value)| (key.as_str(), Value::from_json(value))),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_native_scalars() {
        assert_eq!(Value::from("s").to_native(), Native::String("s".into()));
        assert_eq!(Value::from(1.5).to_native(), Native::Number(1.5));
        assert_eq!(Value::error("e").to_native(), Native::Error("e".into()));
    }

    #[test]
    fn test_callables_are_opaque() {
        let f = Value::function("f", |_| Value::from(true));
        assert_eq!(f.to_native(), Native::Opaque(f.clone()));
        assert_eq!(Value::from_native(&f.to_native()), f);
    }

    #[test]
    fn test_from_json() {
        let value = Value::from_json(&json!({"x": 1, "tags": ["a", "b"], "none": null}));
        let ctx = crate::EvalContext::new();
        assert_eq!(value.lookup(&ctx, &"x".into()).unwrap(), Value::from(1.0));
        let tags = value.lookup(&ctx, &"tags".into()).unwrap();
        assert_eq!(tags.lookup(&ctx, &Value::from(1.0)).unwrap(), Value::from("b"));
        assert!(value.lookup(&ctx, &"none".into()).unwrap().is_error());
    }

    #[test]
    fn test_to_json() {
        let value = Value::object([
            ("n", Value::from(2.0)),
            ("inf", Value::from(f64::INFINITY)),
            ("bad", Value::error("nope")),
        ]);
        assert_eq!(
            value.to_native().to_json(),
            json!({"n": 2.0, "inf": "math.Inf", "bad": {"error": "nope"}})
        );
        assert_eq!(
            Value::object([(1.0, Value::from(true))]).to_native().to_json(),
            json!({"1": true})
        );
    }
}
