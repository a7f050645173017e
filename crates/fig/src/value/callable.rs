//! Callable value types and the call/lookup half of the value contract

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::ast::Expr;
use crate::context::EvalContext;
use crate::error::Result;
use crate::eval::eval;
use crate::scope::{Scope, ScopeBuilder};

use super::{HashableValue, Value};

/// Name bound to a closure's single argument.
pub const CLOSURE_ARGUMENT: &str = "it";

/// Host function over evaluated arguments.
pub type FunctionPtr = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Host function over unevaluated argument expressions and the call scope.
pub type NativeFnPtr =
    Arc<dyn Fn(&EvalContext, &[Expr], &Scope) -> Result<Value> + Send + Sync>;

/// A host function called with evaluated values.
#[derive(Clone)]
pub struct FunctionValue {
    /// Source rendering
    pub code: Arc<str>,

    /// The function itself
    pub func: FunctionPtr,
}

impl FunctionValue {
    /// Wrap a host function.
    pub fn new<F>(code: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            code: code.into(),
            func: Arc::new(func),
        }
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionValue({})", self.code)
    }
}

/// A host function with lazy arguments, such as `if`.
///
/// It receives the raw argument expressions plus the call scope and decides
/// itself which of them to evaluate.
#[derive(Clone)]
pub struct NativeFn {
    /// Source rendering
    pub code: Arc<str>,

    /// The function itself
    pub func: NativeFnPtr,
}

impl NativeFn {
    /// Wrap a lazy host function.
    pub fn new<F>(code: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&EvalContext, &[Expr], &Scope) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            code: code.into(),
            func: Arc::new(func),
        }
    }

    /// Invoke with unevaluated arguments.
    pub fn call(&self, ctx: &EvalContext, args: &[Expr], scope: &Scope) -> Result<Value> {
        (self.func)(ctx, args, scope)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.code)
    }
}

/// A closure: one result expression evaluated in a captured scope.
///
/// The captured scope lives as long as the closure does.
#[derive(Debug, Clone)]
pub struct Closure {
    /// Result expression
    pub body: Expr,

    /// Scope captured at creation, including the closure's own bindings
    pub scope: Scope,
}

impl Closure {
    /// Create a closure value.
    pub fn new(body: Expr, scope: Scope) -> Self {
        Self { body, scope }
    }

    /// Evaluate the body with `it` bound to `arg`.
    pub fn invoke(&self, ctx: &EvalContext, arg: Value) -> Result<Value> {
        let Some(_depth) = ctx.enter() else {
            return Ok(Value::error("maximum call depth exceeded"));
        };
        let mut builder = ScopeBuilder::new(&self.scope);
        if builder.bind_value(CLOSURE_ARGUMENT, arg).is_err() {
            return Ok(Value::error("cannot define value for it"));
        }
        eval(ctx, &self.body, &builder.build())
    }
}

impl Value {
    /// Call with already evaluated arguments.
    ///
    /// Errors are returned unchanged, so calling through a failed lookup
    /// propagates the original failure.
    pub fn call(&self, ctx: &EvalContext, args: &[Value]) -> Result<Value> {
        ctx.check_interrupt()?;
        match self {
            Value::Function(f) => {
                if ctx.trace {
                    trace!(function = %f.code, args = args.len(), "call");
                }
                Ok((f.func)(args))
            }
            Value::Closure(c) => match args {
                [arg] => c.invoke(ctx, arg.clone()),
                _ => Ok(Value::error("closures always take one arg")),
            },
            Value::NativeFunction(f) => Ok(Value::error(format!(
                "{} takes unevaluated arguments and cannot be called with values",
                f.code
            ))),
            Value::Error(_) => Ok(self.clone()),
            other => Ok(Value::error(format!("cannot call a {}", other.type_name()))),
        }
    }

    /// Look up a field or key.
    pub fn lookup(&self, ctx: &EvalContext, field: &Value) -> Result<Value> {
        match self {
            Value::Object(fields) => Ok(fields
                .get(&HashableValue(field.clone()))
                .cloned()
                .unwrap_or_else(|| {
                    Value::error(format!("field not found: {}", display_name(field)))
                })),
            Value::Scope(scope) => scope.lookup(ctx, field),
            Value::Error(_) => Ok(self.clone()),
            other => Ok(Value::error(format!(
                "cannot lookup a {}",
                other.type_name()
            ))),
        }
    }
}

/// Names read better unquoted in messages.
pub(crate) fn display_name(name: &Value) -> String {
    match name.as_str() {
        Some(s) => s.to_string(),
        None => name.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_function() {
        let ctx = EvalContext::new();
        let double = Value::function("double", |args| match args {
            [Value::Number(n)] => Value::from(n * 2.0),
            _ => Value::error("bad args"),
        });
        assert_eq!(double.call(&ctx, &[Value::from(4.0)]).unwrap(), Value::from(8.0));
    }

    #[test]
    fn test_call_non_callable() {
        let ctx = EvalContext::new();
        assert_eq!(
            Value::from(1.0).call(&ctx, &[]).unwrap(),
            Value::error("cannot call a number")
        );
        let err = Value::error("earlier");
        assert_eq!(err.call(&ctx, &[]).unwrap(), err);
    }

    #[test]
    fn test_lookup() {
        let ctx = EvalContext::new();
        let o = Value::object([("five", Value::from(5.0))]);
        assert_eq!(o.lookup(&ctx, &"five".into()).unwrap(), Value::from(5.0));
        assert_eq!(
            o.lookup(&ctx, &"six".into()).unwrap(),
            Value::error("field not found: six")
        );
        assert_eq!(
            Value::from("s").lookup(&ctx, &"len".into()).unwrap(),
            Value::error("cannot lookup a string")
        );
    }
}
