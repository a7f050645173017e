//! Call evaluation
//!
//! A call is evaluated in three steps:
//!
//! 1. Evaluate the callee. An error callee is returned as is.
//! 2. Pull `where(...)` clauses out of the arguments into a call scope
//!    layered over the caller's scope.
//! 3. Hand native callees the remaining raw arguments plus the call scope.
//!    Everything else receives exactly one value: a lone non-binding
//!    argument is evaluated directly, any other argument list becomes an
//!    object keyed by argument name.

use crate::ast::Expr;
use crate::error::Result;
use crate::scope::ScopeBuilder;
use crate::value::{HashableValue, Object};
use crate::{EvalContext, Scope, Value};

use super::bindings::{accumulate_assign, filter_args};
use super::eval;

pub(super) fn eval_call(
    callee: &Expr,
    args: &[Expr],
    ctx: &EvalContext,
    scope: &Scope,
) -> Result<Value> {
    let func = eval(ctx, callee, scope)?;
    if func.is_error() {
        return Ok(func);
    }

    let mut where_bindings = ScopeBuilder::new(scope);
    let rest = match filter_args(args, &mut where_bindings) {
        Ok(rest) => rest,
        Err(err) => return Ok(err),
    };
    let call_scope = where_bindings.build();

    if let Value::NativeFunction(native) = &func {
        return native.call(ctx, &rest, &call_scope);
    }

    let arg = match &rest[..] {
        [single] if !single.is_assign() => eval(ctx, single, &call_scope)?,
        _ => eval_argument(ctx, &rest, &call_scope)?,
    };
    if arg.is_error() {
        return Ok(arg);
    }
    func.call(ctx, &[arg])
}

/// Merge an argument list into one object.
///
/// Bare names take their value from the call scope (so they see
/// where-bindings); inline bindings are evaluated in a scope of their own
/// layered over the call scope. A name may only be supplied once across
/// bare names, inline bindings and where-bindings.
fn eval_argument(ctx: &EvalContext, args: &[Expr], scope: &Scope) -> Result<Value> {
    let mut fields = Object::new();
    let mut inline = ScopeBuilder::new(scope);

    for arg in args {
        if let Some(name) = arg.as_name() {
            let key = HashableValue::from(name);
            if fields.contains_key(&key) {
                return Ok(duplicate(name));
            }
            fields.insert(key, scope.get(ctx, name)?);
        } else if !arg.is_assign() {
            return Ok(Value::error(
                "arguments must be names or bindings when there is more than one",
            ));
        } else if let Err(err) = accumulate_assign(&mut inline, arg) {
            return Ok(err);
        }
    }

    let inline = inline.build();
    let names: Vec<Value> = inline.names().cloned().collect();
    for name in names {
        let key = HashableValue(name);
        let taken = fields.contains_key(&key)
            || key.0.as_str().is_some_and(|text| scope.contains(text));
        if taken {
            return Ok(duplicate(&crate::value::display_name(&key.0)));
        }
        let value = inline.lookup(ctx, &key.0)?;
        fields.insert(key, value);
    }
    Ok(Value::from(fields))
}

fn duplicate(name: &str) -> Value {
    Value::error(format!("duplicate name: {}", name))
}
