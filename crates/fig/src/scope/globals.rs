//! The process-wide, read-only globals scope

use std::sync::OnceLock;

use crate::ast::Expr;
use crate::context::EvalContext;
use crate::error::Result;
use crate::eval::eval;
use crate::value::Value;

use super::{Scope, ScopeBuilder};

static GLOBALS: OnceLock<Scope> = OnceLock::new();

/// The built-in bindings shared by every evaluation.
///
/// Built once on first use. Every entry is pre-evaluated, so concurrent
/// lookups never touch an entry's evaluation state.
///
/// | name     | kind     | behaviour                                  |
/// |----------|----------|--------------------------------------------|
/// | `if`     | native   | `if(cond, then, else)`, lazy branches       |
/// | `error`  | function | `error("msg")` builds an error value       |
/// | `object` | function | identity, names an argument object         |
/// | `math`   | object   | `math.Inf`, `math.NaN`                     |
pub fn globals() -> &'static Scope {
    GLOBALS.get_or_init(build_globals)
}

fn build_globals() -> Scope {
    let mut builder = ScopeBuilder::root();
    let entries = [
        ("if", Value::native("if", builtin_if)),
        ("error", Value::function("error", builtin_error)),
        ("object", Value::function("object", builtin_object)),
        (
            "math",
            Value::object([
                ("Inf", Value::from(f64::INFINITY)),
                ("NaN", Value::from(f64::NAN)),
            ]),
        ),
    ];
    for (name, value) in entries {
        let bound = builder.bind_value(name, value).map(|_| ());
        debug_assert!(bound.is_ok(), "duplicate global {}", name);
    }
    builder.build()
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Function Implementations
// ═══════════════════════════════════════════════════════════════════════

fn builtin_if(ctx: &EvalContext, args: &[Expr], scope: &Scope) -> Result<Value> {
    let [cond, then, otherwise] = args else {
        return Ok(Value::error("if requires 3 unnamed args"));
    };
    if args.iter().any(Expr::is_assign) {
        return Ok(Value::error("if requires 3 unnamed args"));
    }

    match eval(ctx, cond, scope)? {
        Value::Bool(true) => eval(ctx, then, scope),
        Value::Bool(false) => eval(ctx, otherwise, scope),
        err @ Value::Error(_) => Ok(err),
        other => Ok(Value::error(format!(
            "if condition must be a bool, found {}",
            other.type_name()
        ))),
    }
}

fn builtin_error(args: &[Value]) -> Value {
    match args {
        [Value::String(message)] => Value::error(message.clone()),
        _ => Value::error("error() takes one string only"),
    }
}

fn builtin_object(args: &[Value]) -> Value {
    match args {
        [value] => value.clone(),
        _ => Value::error("object() takes one arg only"),
    }
}
