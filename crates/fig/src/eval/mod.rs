//! Expression evaluation

mod binary;
mod bindings;
mod call;
mod closure;
mod field;
mod literal;
mod unary;

use tracing::{trace, warn};

use crate::ast::{Expr, Op};
use crate::error::{ConfigError, FatalError, Result};
use crate::parse::parse;
use crate::{EvalContext, Scope, Value};

/// Trait for evaluating canonical nodes to values.
///
/// User-level failures come back as `Ok(Value::Error(..))`; `Err` is
/// reserved for [`FatalError`]s.
pub trait Evaluate {
    /// Evaluate this node against `scope`.
    fn eval(&self, ctx: &EvalContext, scope: &Scope) -> Result<Value>;
}

// ═══════════════════════════════════════════════════════════════════════
// Main Expression Dispatcher
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for Expr {
    fn eval(&self, ctx: &EvalContext, scope: &Scope) -> Result<Value> {
        // Check for interruption before each node
        ctx.check_interrupt()?;
        let Some(_nesting) = ctx.nest() else {
            return Ok(Value::error("maximum nesting depth exceeded"));
        };

        let Some(tag) = self.tag() else {
            return Err(malformed(self));
        };
        if ctx.trace {
            trace!(node = %tag, depth = ctx.depth(), "eval");
        }

        let children = self.children();
        match (tag.op, children) {
            (Op::String | Op::Number | Op::Bool, _) => literal::eval_literal(self),
            (Op::Name, _) => literal::eval_name(self, ctx, scope),

            // Unary
            (Op::Add | Op::Sub | Op::Not, [operand]) => {
                unary::eval_unary(tag.op, operand, ctx, scope)
            }

            // Short-circuit
            (Op::And | Op::Or, [left, right]) => {
                binary::eval_logic(tag.op, left, right, ctx, scope)
            }

            // Arithmetic and comparison
            (
                Op::Add
                | Op::Sub
                | Op::Mul
                | Op::Div
                | Op::Lt
                | Op::Le
                | Op::Gt
                | Op::Ge
                | Op::Eq
                | Op::Ne,
                [left, right],
            ) => binary::eval_binary(tag.op, left, right, ctx, scope),

            (Op::Field, [left, right]) => field::eval_field(left, right, ctx, scope),
            (Op::Call, [callee, args @ ..]) => call::eval_call(callee, args, ctx, scope),
            (Op::Closure, items) => closure::eval_closure(items, scope),

            // `=` only exists inside argument lists and closure bodies
            _ => Err(malformed(self)),
        }
    }
}

/// Fatal error for a node shape the normalizer never produces.
pub(crate) fn malformed(expr: &Expr) -> FatalError {
    FatalError::MalformedNode {
        found: expr.to_tree_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Convenience Functions
// ═══════════════════════════════════════════════════════════════════════

/// Evaluate an expression (convenience wrapper).
pub fn eval(ctx: &EvalContext, expr: &Expr, scope: &Scope) -> Result<Value> {
    expr.eval(ctx, scope)
}

/// Parse and evaluate source text.
///
/// Source that has any parse error is not evaluated.
///
/// # Example
///
/// ```
/// use fig::{eval_source, globals, EvalContext, Value};
///
/// let ctx = EvalContext::new();
/// let value = eval_source(&ctx, "if(1 < 2, \"yes\", \"no\")", globals()).unwrap();
/// assert_eq!(value, Value::from("yes"));
/// ```
pub fn eval_source(
    ctx: &EvalContext,
    source: &str,
    scope: &Scope,
) -> std::result::Result<Value, ConfigError> {
    let expr = parse(source)?.into_result()?;
    eval(ctx, &expr, scope).map_err(|fatal| {
        warn!(%fatal, source, "evaluation aborted");
        ConfigError::from(fatal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Location;
    use crate::scope::globals;

    #[test]
    fn test_nil_is_fatal() {
        let ctx = EvalContext::new();
        let err = eval(&ctx, &Expr::Nil, globals()).unwrap_err();
        assert_eq!(
            err,
            FatalError::MalformedNode {
                found: "nil".to_string()
            }
        );
    }

    #[test]
    fn test_bare_assign_is_fatal() {
        let ctx = EvalContext::new();
        let loc = Location::default();
        let assign = Expr::node(
            Op::Assign,
            loc,
            [Expr::string(loc, "x"), Expr::number(loc, 1.0)],
        );
        assert!(matches!(
            eval(&ctx, &assign, globals()),
            Err(FatalError::MalformedNode { .. })
        ));
    }

    #[test]
    fn test_interrupted() {
        let ctx = EvalContext::new();
        ctx.interrupt();
        let expr = Expr::number(Location::default(), 1.0);
        assert_eq!(eval(&ctx, &expr, globals()), Err(FatalError::Interrupted));
    }

    #[test]
    fn test_nesting_limit() {
        let loc = Location::default();
        let mut expr = Expr::number(loc, 1.0);
        for _ in 0..10 {
            expr = Expr::node(Op::Sub, loc, [expr]);
        }
        let ctx = EvalContext::new().with_max_nesting(8);
        assert_eq!(
            eval(&ctx, &expr, globals()),
            Ok(Value::error("maximum nesting depth exceeded"))
        );
        let ctx = ctx.with_max_nesting(11);
        assert_eq!(eval(&ctx, &expr, globals()), Ok(Value::from(1.0)));
    }

    #[test]
    fn test_eval_source_rejects_parse_errors() {
        let ctx = EvalContext::new();
        let err = eval_source(&ctx, "1 +", globals()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert_eq!(err.to_string(), "invalid config expression: missing term at 3");
    }
}
