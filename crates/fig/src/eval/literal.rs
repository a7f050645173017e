//! Literal and name evaluation

use crate::ast::{Expr, Op};
use crate::error::Result;
use crate::{EvalContext, Scope, Value};

use super::malformed;

/// Wrap a `string`, `number` or `bool` leaf.
pub(super) fn eval_literal(leaf: &Expr) -> Result<Value> {
    match (leaf.op(), leaf.children()) {
        (Some(Op::String), [Expr::String(s)]) => Ok(Value::from(s.as_str())),
        (Some(Op::Number), [Expr::Number(n)]) => Ok(Value::Number(*n)),
        (Some(Op::Bool), [Expr::Bool(b)]) => Ok(Value::Bool(*b)),
        _ => Err(malformed(leaf)),
    }
}

/// Resolve a `name` leaf through the scope chain.
pub(super) fn eval_name(leaf: &Expr, ctx: &EvalContext, scope: &Scope) -> Result<Value> {
    let name = leaf.as_name().ok_or_else(|| malformed(leaf))?;
    scope.get(ctx, name)
}
