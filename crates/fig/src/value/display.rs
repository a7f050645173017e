//! Source rendering for values

use std::fmt;

use crate::ast::{format_number, quote};

use super::{HashableValue, Value};

impl Value {
    /// Render as source text.
    ///
    /// Scalars, errors and objects of scalars render as expressions that
    /// evaluate back to an equal value against the globals.
    pub fn code(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => quote(s),
            Value::Error(e) => format!("error({})", quote(e.message())),
            Value::Object(fields) => {
                let rendered: Vec<String> = fields
                    .iter()
                    .map(|(key, value)| format!("{} = {}", key_code(key), value.code()))
                    .collect();
                format!("object({})", rendered.join(", "))
            }
            Value::Scope(_) => "<scope>".to_string(),
            Value::Function(f) => f.code.to_string(),
            Value::NativeFunction(f) => f.code.to_string(),
            Value::Closure(c) => format!("{{{}}}", c.body),
        }
    }
}

/// Identifier-like string keys render bare, everything else as code.
fn key_code(key: &HashableValue) -> String {
    match key.0.as_str() {
        Some(s) if is_identifier(s) => s.to_string(),
        _ => key.0.code(),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
        && !s.eq_ignore_ascii_case("true")
        && !s.eq_ignore_ascii_case("false")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", format_number(*n)),
            Value::String(s) => write!(f, "String({})", quote(s)),
            Value::Error(e) => write!(f, "Error({})", quote(e.message())),
            Value::Object(_) => write!(f, "Object({})", self.code()),
            Value::Scope(scope) => write!(f, "Scope(#{})", scope.id()),
            Value::Function(func) => write!(f, "Function({})", func.code),
            Value::NativeFunction(func) => write!(f, "NativeFunction({})", func.code),
            Value::Closure(c) => write!(f, "Closure({{{}}})", c.body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_code() {
        assert_eq!(Value::from(true).code(), "true");
        assert_eq!(Value::from(2.5).code(), "2.5");
        assert_eq!(Value::from(f64::INFINITY).code(), "math.Inf");
        assert_eq!(Value::from(r#"say "hi"\"#).code(), r#""say \"hi\"\\""#);
        assert_eq!(Value::error("bad").code(), r#"error("bad")"#);
    }

    #[test]
    fn test_object_code() {
        let o = Value::object([
            ("x", Value::from(1.0)),
            ("two words", Value::from("y")),
        ]);
        assert_eq!(o.code(), r#"object(x = 1, "two words" = "y")"#);
        assert_eq!(Value::object([(1.0, Value::from(true))]).code(), "object(1 = true)");
    }

    #[test]
    fn test_keyword_keys_are_quoted() {
        let o = Value::object([("true", Value::from(1.0))]);
        assert_eq!(o.code(), r#"object("true" = 1)"#);
    }
}
