//! Closure literal evaluation

use std::sync::Arc;

use crate::ast::Expr;
use crate::error::Result;
use crate::scope::ScopeBuilder;
use crate::value::{Closure, CLOSURE_ARGUMENT};
use crate::{Scope, Value};

use super::bindings::{accumulate_assign, filter_args};

/// Evaluate `{ body, name = value, where(...) }`.
///
/// Exactly one item must be an expression; the rest are bindings captured
/// together with the current scope. Nothing is evaluated until the closure
/// is called.
pub(super) fn eval_closure(items: &[Expr], scope: &Scope) -> Result<Value> {
    let mut bindings = ScopeBuilder::new(scope);
    let rest = match filter_args(items, &mut bindings) {
        Ok(rest) => rest,
        Err(err) => return Ok(err),
    };

    let mut body = None;
    for item in rest.iter() {
        if !item.is_assign() {
            if body.is_some() {
                return Ok(Value::error("closures take exactly one expression"));
            }
            body = Some(item);
        } else if let Err(err) = accumulate_assign(&mut bindings, item) {
            return Ok(err);
        }
    }

    let Some(body) = body else {
        return Ok(Value::error("no expression provided"));
    };
    if bindings.contains(CLOSURE_ARGUMENT) {
        return Ok(Value::error("cannot define value for it"));
    }
    Ok(Value::Closure(Arc::new(Closure::new(
        body.clone(),
        bindings.build(),
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::eval;
    use crate::parse::parse;
    use crate::scope::globals;
    use crate::EvalContext;

    fn run(source: &str) -> Value {
        let ctx = EvalContext::new();
        let expr = parse(source).unwrap().into_result().unwrap();
        eval(&ctx, &expr, globals()).unwrap()
    }

    #[test]
    fn test_closure_call() {
        assert_eq!(run("{ it }(2)"), Value::from(2.0));
        assert_eq!(run("{ it * k, k = 3 }(2)"), Value::from(6.0));
        assert_eq!(run("{ it + k, where(k = 1) }(2)"), Value::from(3.0));
    }

    #[test]
    fn test_closure_shape_errors() {
        assert_eq!(run("{ x = 1 }"), Value::error("no expression provided"));
        assert_eq!(run("{ 1, 2 }"), Value::error("closures take exactly one expression"));
        assert_eq!(run("{ it, it = 1 }"), Value::error("cannot define value for it"));
    }

    #[test]
    fn test_closure_without_args() {
        assert_eq!(
            run("{ it }()"),
            Value::object(Vec::<(&str, Value)>::new())
        );
    }

    #[test]
    fn test_closure_renders_body() {
        assert_eq!(run("{ it + 1 }").code(), "{it + 1}");
    }
}
