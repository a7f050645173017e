//! Unary operation evaluation

use crate::ast::{Expr, Op};
use crate::error::Result;
use crate::{EvalContext, Scope, Value};

use super::eval;

/// Evaluate `+x`, `-x` or `!x`.
pub(super) fn eval_unary(op: Op, operand: &Expr, ctx: &EvalContext, scope: &Scope) -> Result<Value> {
    let value = eval(ctx, operand, scope)?;
    if value.is_error() {
        return Ok(value);
    }
    Ok(match op {
        Op::Not => eval_not(value),
        Op::Sub => eval_neg(value),
        _ => eval_plus(value),
    })
}

/// Evaluate logical NOT (`!x`).
fn eval_not(operand: Value) -> Value {
    match operand {
        Value::Bool(b) => Value::Bool(!b),
        _ => Value::error("not a bool"),
    }
}

/// Evaluate unary negation (`-x`).
fn eval_neg(operand: Value) -> Value {
    match operand {
        Value::Number(n) => Value::Number(-n),
        _ => Value::error("not a number"),
    }
}

fn eval_plus(operand: Value) -> Value {
    match operand {
        Value::Number(_) => operand,
        _ => Value::error("not a number"),
    }
}
