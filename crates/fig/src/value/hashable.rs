//! Hashable wrapper for Value to enable use as object keys

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::Value;

/// A wrapper for Value that implements Hash and Eq.
///
/// Hashing follows [`Value::eq`]: objects hash by content regardless of
/// field order, closures and scopes by identity, functions by code. A `NaN`
/// key never equals itself and so can be stored but not found again.
#[derive(Debug, Clone)]
pub struct HashableValue(pub Value);

impl Hash for HashableValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash the discriminant first
        std::mem::discriminant(&self.0).hash(state);

        match &self.0 {
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => {
                // 0.0 == -0.0, so they must hash alike
                let n = if *n == 0.0 { 0.0 } else { *n };
                n.to_bits().hash(state)
            }
            Value::String(s) => s.hash(state),
            Value::Error(e) => e.hash(state),
            Value::Object(fields) => {
                let combined = fields.iter().fold(0u64, |acc, (k, v)| {
                    let mut entry = DefaultHasher::new();
                    k.hash(&mut entry);
                    HashableValue(v.clone()).hash(&mut entry);
                    acc.wrapping_add(entry.finish())
                });
                fields.len().hash(state);
                combined.hash(state);
            }
            Value::Scope(scope) => scope.id().hash(state),
            Value::Function(f) => f.code.hash(state),
            Value::NativeFunction(f) => f.code.hash(state),
            Value::Closure(c) => (Arc::as_ptr(c) as usize).hash(state),
        }
    }
}

impl PartialEq for HashableValue {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for HashableValue {}

impl From<Value> for HashableValue {
    fn from(value: Value) -> Self {
        HashableValue(value)
    }
}

impl From<&str> for HashableValue {
    fn from(s: &str) -> Self {
        HashableValue(Value::from(s))
    }
}

impl Value {
    /// A content-derived hash consistent with equality.
    pub fn hash_code(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        HashableValue(self.clone()).hash(&mut hasher);
        hasher.finish()
    }
}
