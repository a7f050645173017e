//! Binary operation evaluation

use crate::ast::{Expr, Op};
use crate::error::Result;
use crate::{EvalContext, Scope, Value};

use super::eval;

/// Evaluate arithmetic and comparison operators.
///
/// Both operands are evaluated left to right; an error on the left is
/// returned without evaluating the right.
pub(super) fn eval_binary(
    op: Op,
    left: &Expr,
    right: &Expr,
    ctx: &EvalContext,
    scope: &Scope,
) -> Result<Value> {
    let left = eval(ctx, left, scope)?;
    if left.is_error() {
        return Ok(left);
    }
    let right = eval(ctx, right, scope)?;
    if right.is_error() {
        return Ok(right);
    }

    Ok(match op {
        // Structural equality works on any kind
        Op::Eq => Value::Bool(left == right),
        Op::Ne => Value::Bool(left != right),
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => apply_numeric(op, a, b),
            _ => Value::error("not a number"),
        },
    })
}

fn apply_numeric(op: Op, a: f64, b: f64) -> Value {
    match op {
        // Arithmetic
        Op::Add => Value::Number(a + b),
        Op::Sub => Value::Number(a - b),
        Op::Mul => Value::Number(a * b),
        Op::Div => Value::Number(a / b),

        // Comparison
        Op::Lt => Value::Bool(a < b),
        Op::Le => Value::Bool(a <= b),
        Op::Gt => Value::Bool(a > b),
        Op::Ge => Value::Bool(a >= b),

        other => Value::error(format!("unsupported operator {}", other)),
    }
}

/// Evaluate `&` and `|` with short-circuiting.
///
/// The right operand is only evaluated when the left one does not decide
/// the result. Both operands must be bools.
pub(super) fn eval_logic(
    op: Op,
    left: &Expr,
    right: &Expr,
    ctx: &EvalContext,
    scope: &Scope,
) -> Result<Value> {
    match (op, eval(ctx, left, scope)?) {
        (_, err @ Value::Error(_)) => Ok(err),
        (Op::And, Value::Bool(false)) => Ok(Value::Bool(false)),
        (Op::Or, Value::Bool(true)) => Ok(Value::Bool(true)),
        (_, Value::Bool(_)) => match eval(ctx, right, scope)? {
            result @ (Value::Bool(_) | Value::Error(_)) => Ok(result),
            _ => Ok(Value::error("not a bool")),
        },
        _ => Ok(Value::error("not a bool")),
    }
}
