//! Constructors, accessors and equality for Value

use std::sync::Arc;

use super::*;

// ═══════════════════════════════════════════════════════════════════════
// Constructors
// ═══════════════════════════════════════════════════════════════════════

impl Value {
    /// Create a string value.
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    /// Create an error value.
    pub fn error(message: impl Into<Arc<str>>) -> Self {
        Value::Error(ErrorValue::new(message))
    }

    /// Create an object from key/value pairs. Later keys replace earlier ones.
    pub fn object<K: Into<Value>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        let fields: Object = pairs
            .into_iter()
            .map(|(k, v)| (HashableValue(k.into()), v))
            .collect();
        Value::Object(Arc::new(fields))
    }

    /// Create a host function over evaluated arguments.
    pub fn function<F>(code: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Value::Function(FunctionValue::new(code, func))
    }

    /// Create a host function over unevaluated argument expressions.
    pub fn native<F>(code: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&crate::EvalContext, &[crate::Expr], &Scope) -> crate::Result<Value>
            + Send
            + Sync
            + 'static,
    {
        Value::NativeFunction(NativeFn::new(code, func))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type predicates
    // ═══════════════════════════════════════════════════════════════════

    /// Check if this is an error value
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Check if this value can be called
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Function(_) | Value::NativeFunction(_) | Value::Closure(_)
        )
    }

    /// Short kind name used in messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Error(_) => "error",
            Value::Object(_) => "object",
            Value::Scope(_) => "scope",
            Value::Function(_) | Value::NativeFunction(_) => "function",
            Value::Closure(_) => "closure",
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Coercions
    // ═══════════════════════════════════════════════════════════════════

    /// The number, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The text, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean, if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The error, if this is an error value.
    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    /// The fields, if this is an object.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<ErrorValue> for Value {
    fn from(e: ErrorValue) -> Self {
        Value::Error(e)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(Arc::new(o))
    }
}

impl From<Scope> for Value {
    fn from(s: Scope) -> Self {
        Value::Scope(s)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Equality
// ═══════════════════════════════════════════════════════════════════════

impl PartialEq for Value {
    /// Content equality for data, identity for closures and scopes, and
    /// rendered code for host functions. `NaN` is not equal to itself.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Scope(a), Value::Scope(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.code == b.code,
            (Value::NativeFunction(a), Value::NativeFunction(b)) => a.code == b.code,
            (Value::Closure(a), Value::Closure(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from(3.0).as_number(), Some(3.0));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(
            Value::error("boom").as_error().map(ErrorValue::message),
            Some("boom")
        );
        assert_eq!(Value::from("x").as_number(), None);
        assert_eq!(Value::from(1.0).as_error(), None);
    }

    #[test]
    fn test_equality() {
        assert_eq!(Value::from(1.0), Value::from(1.0));
        assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_ne!(Value::from(true), Value::from(1.0));
        assert_eq!(Value::error("a"), Value::error("a"));
        assert_ne!(Value::error("a"), Value::from("a"));
    }

    #[test]
    fn test_object_equality_ignores_order() {
        let a = Value::object([("x", Value::from(1.0)), ("y", Value::from(2.0))]);
        let b = Value::object([("y", Value::from(2.0)), ("x", Value::from(1.0))]);
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::from(1.0).type_name(), "number");
        assert_eq!(Value::function("f", |_| Value::from(1.0)).type_name(), "function");
        assert!(Value::function("f", |_| Value::from(1.0)).is_callable());
    }
}
