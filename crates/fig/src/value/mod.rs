//! Value representation for runtime values

mod callable;
mod display;
mod hashable;
mod impls;

pub(crate) use callable::display_name;
pub use callable::{Closure, FunctionPtr, FunctionValue, NativeFn, NativeFnPtr, CLOSURE_ARGUMENT};
pub use hashable::HashableValue;

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::scope::Scope;

/// Field map of an object value, keyed by value.
pub type Object = IndexMap<HashableValue, Value>;

/// Runtime value.
///
/// Every variant supports the same contract: render to source
/// ([`code`](Value::code)), [`hash_code`](Value::hash_code),
/// [`call`](Value::call), [`lookup`](Value::lookup), equality, and the
/// `as_*` accessors, none of which panic.
#[derive(Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Scalars
    // ═══════════════════════════════════════════════════════════════════
    /// Boolean: `true` or `false`
    Bool(bool),

    /// IEEE double
    Number(f64),

    /// Immutable string
    String(Arc<str>),

    /// An evaluation failure carried as data
    Error(ErrorValue),

    // ═══════════════════════════════════════════════════════════════════
    // Compound
    // ═══════════════════════════════════════════════════════════════════
    /// Immutable mapping from value to value
    Object(Arc<Object>),

    /// A chain of lazily evaluated bindings
    Scope(Scope),

    // ═══════════════════════════════════════════════════════════════════
    // Callables
    // ═══════════════════════════════════════════════════════════════════
    /// Host function over evaluated arguments
    Function(FunctionValue),

    /// Host function over unevaluated argument expressions
    NativeFunction(NativeFn),

    /// Captured expression plus captured scope, called with `it`
    Closure(Arc<Closure>),
}

/// The payload of [`Value::Error`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
#[error("{message}")]
pub struct ErrorValue {
    message: Arc<str>,
}

impl ErrorValue {
    /// Create an error with the given message.
    pub fn new(message: impl Into<Arc<str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
