//! Field access evaluation

use crate::ast::Expr;
use crate::error::Result;
use crate::{EvalContext, Scope, Value};

use super::eval;

/// Evaluate `left.key`: the key is evaluated (normally a string literal)
/// and looked up on the left value.
pub(super) fn eval_field(left: &Expr, key: &Expr, ctx: &EvalContext, scope: &Scope) -> Result<Value> {
    let target = eval(ctx, left, scope)?;
    if target.is_error() {
        return Ok(target);
    }
    let key = eval(ctx, key, scope)?;
    if key.is_error() {
        return Ok(key);
    }
    target.lookup(ctx, &key)
}
