//! Lazy, memoized binding scopes
//!
//! A scope owns an ordered set of entries plus an optional parent. Each
//! entry moves through three states:
//!
//! ```text
//! Unevaluated(expr) ──lookup──► InProgress ──done──► Evaluated(value)
//!                                   │
//!                                   └── re-entered: "recursion detected"
//! ```
//!
//! An entry's expression is evaluated against the scope that owns it, so
//! sibling bindings can refer to one another. The entry lock is never held
//! while evaluating.

mod globals;

pub use globals::globals;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use tracing::trace;

use crate::ast::Expr;
use crate::context::EvalContext;
use crate::error::{DuplicateName, Result};
use crate::eval::eval;
use crate::value::{display_name, HashableValue, Value};

/// Per-entry evaluation state.
#[derive(Debug, Clone)]
enum EntryState {
    Unevaluated(Expr),
    InProgress,
    Evaluated(Value),
}

#[derive(Debug)]
struct Entry(Mutex<EntryState>);

impl Entry {
    fn new(state: EntryState) -> Self {
        Entry(Mutex::new(state))
    }

    fn lock(&self) -> MutexGuard<'_, EntryState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct ScopeInner {
    entries: IndexMap<HashableValue, Entry>,
    parent: Option<Scope>,
}

/// A chain of name bindings. Cloning is cheap and shares the entries.
#[derive(Clone)]
pub struct Scope(Arc<ScopeInner>);

impl Scope {
    /// A scope with no bindings and no parent.
    pub fn empty() -> Scope {
        ScopeBuilder::root().build()
    }

    /// A child of `parent` holding the given pre-evaluated values.
    pub fn with_values<'a>(
        parent: &Scope,
        values: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> std::result::Result<Scope, DuplicateName> {
        let mut builder = ScopeBuilder::new(parent);
        for (name, value) in values {
            builder.bind_value(name, value)?;
        }
        Ok(builder.build())
    }

    /// Look up a name, searching parents when it is not bound here.
    ///
    /// Unknown names, self-referential bindings and depth exhaustion produce
    /// error values. Only fatal errors are returned as `Err`.
    pub fn lookup(&self, ctx: &EvalContext, name: &Value) -> Result<Value> {
        let key = HashableValue(name.clone());
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(entry) = scope.0.entries.get(&key) {
                return scope.resolve(ctx, name, entry);
            }
            current = scope.0.parent.as_ref();
        }
        Ok(Value::error(format!("name not found: {}", display_name(name))))
    }

    /// Look up a name given as text.
    pub fn get(&self, ctx: &EvalContext, name: &str) -> Result<Value> {
        self.lookup(ctx, &Value::from(name))
    }

    fn resolve(&self, ctx: &EvalContext, name: &Value, entry: &Entry) -> Result<Value> {
        let expr = {
            let mut state = entry.lock();
            match &*state {
                EntryState::Evaluated(value) => return Ok(value.clone()),
                EntryState::InProgress => {
                    return Ok(Value::error(format!(
                        "recursion detected: {}",
                        display_name(name)
                    )))
                }
                EntryState::Unevaluated(expr) => {
                    let expr = expr.clone();
                    *state = EntryState::InProgress;
                    expr
                }
            }
        };

        let Some(_depth) = ctx.enter() else {
            *entry.lock() = EntryState::Unevaluated(expr);
            return Ok(Value::error("maximum call depth exceeded"));
        };

        if ctx.trace {
            trace!(name = %display_name(name), "evaluating binding");
        }
        match eval(ctx, &expr, self) {
            Ok(value) => {
                *entry.lock() = EntryState::Evaluated(value.clone());
                Ok(value)
            }
            Err(fatal) => {
                *entry.lock() = EntryState::Unevaluated(expr);
                Err(fatal)
            }
        }
    }

    /// Whether `name` is bound directly in this scope.
    pub fn contains(&self, name: &str) -> bool {
        self.0.entries.contains_key(&HashableValue::from(name))
    }

    /// Names bound directly in this scope, in binding order.
    pub fn names(&self) -> impl Iterator<Item = &Value> {
        self.0.entries.keys().map(|key| &key.0)
    }

    /// Number of entries bound directly in this scope.
    pub fn len(&self) -> usize {
        self.0.entries.len()
    }

    /// Whether this scope binds nothing itself.
    pub fn is_empty(&self) -> bool {
        self.0.entries.is_empty()
    }

    /// The enclosing scope.
    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    /// Identity of the underlying scope.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Whether both handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.names().map(display_name).collect();
        f.debug_struct("Scope")
            .field("id", &self.id())
            .field("names", &names)
            .field("parent", &self.parent().map(Scope::id))
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Building scopes
// ═══════════════════════════════════════════════════════════════════════

/// Collects bindings for a new scope. Scopes are immutable once built.
#[derive(Debug)]
pub struct ScopeBuilder {
    entries: IndexMap<HashableValue, Entry>,
    parent: Option<Scope>,
}

impl ScopeBuilder {
    /// Start a child scope of `parent`.
    pub fn new(parent: &Scope) -> Self {
        Self {
            entries: IndexMap::new(),
            parent: Some(parent.clone()),
        }
    }

    /// Start a scope with no parent.
    pub fn root() -> Self {
        Self {
            entries: IndexMap::new(),
            parent: None,
        }
    }

    /// Bind a pre-evaluated value.
    pub fn bind_value(
        &mut self,
        name: impl Into<Value>,
        value: Value,
    ) -> std::result::Result<&mut Self, DuplicateName> {
        self.insert(name.into(), EntryState::Evaluated(value))
    }

    /// Bind an expression, evaluated on first lookup.
    pub fn bind_expr(
        &mut self,
        name: impl Into<Value>,
        expr: Expr,
    ) -> std::result::Result<&mut Self, DuplicateName> {
        self.insert(name.into(), EntryState::Unevaluated(expr))
    }

    fn insert(
        &mut self,
        name: Value,
        state: EntryState,
    ) -> std::result::Result<&mut Self, DuplicateName> {
        let key = HashableValue(name);
        if self.entries.contains_key(&key) {
            return Err(DuplicateName(display_name(&key.0)));
        }
        self.entries.insert(key, Entry::new(state));
        Ok(self)
    }

    /// Whether `name` has already been bound.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&HashableValue::from(name))
    }

    /// Number of bindings so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been bound yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish the scope.
    pub fn build(self) -> Scope {
        Scope(Arc::new(ScopeInner {
            entries: self.entries,
            parent: self.parent,
        }))
    }
}
