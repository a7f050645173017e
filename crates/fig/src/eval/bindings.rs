//! Where-clauses and `name = value` bindings
//!
//! Call sites and closure bodies are destructured with the structural
//! matcher:
//!
//! ```text
//! where(x = 1, y = z = 4)   [call [name "where"] [= [string "x"] ...] ...]
//! y = z = 4                 [= [string "y"] [= [string "z"] [number 4]]]
//! ```

use std::borrow::Cow;
use std::cell::Cell;

use crate::ast::Expr;
use crate::matcher::{capture_list, capture_node, capture_str, list, list_first, text};
use crate::matcher::{Matcher, MatcherExt};
use crate::scope::ScopeBuilder;
use crate::Value;

/// Move every `where(...)` argument's bindings into `bindings` and return
/// the remaining arguments.
///
/// Borrows the arguments unchanged when there is no where-clause.
pub(super) fn filter_args<'a>(
    args: &'a [Expr],
    bindings: &mut ScopeBuilder,
) -> Result<Cow<'a, [Expr]>, Value> {
    if !args.iter().any(|arg| where_args(arg).is_some()) {
        return Ok(Cow::Borrowed(args));
    }

    let mut rest = Vec::with_capacity(args.len());
    for arg in args {
        match where_args(arg) {
            Some(clauses) => {
                for clause in clauses {
                    accumulate_assign(bindings, clause)?;
                }
            }
            None => rest.push(arg.clone()),
        }
    }
    Ok(Cow::Owned(rest))
}

/// The arguments of a `where(...)` call.
fn where_args(arg: &Expr) -> Option<&[Expr]> {
    let args: Cell<Option<&[Expr]>> = Cell::new(None);
    let pattern = list_first(
        text("call"),
        list_first(
            list(vec![text("name").boxed(), text("where").boxed()]),
            capture_list(&args),
        ),
    );
    pattern.matches(arg).ok()?;
    args.get()
}

/// `name = value`, as the bound name and the value expression.
fn destructure_assign(arg: &Expr) -> Option<(&str, &Expr)> {
    let name: Cell<Option<&str>> = Cell::new(None);
    let value: Cell<Option<&Expr>> = Cell::new(None);
    let pattern = list(vec![
        text("=").boxed(),
        list(vec![text("string").boxed(), capture_str(&name).boxed()]).boxed(),
        capture_node(&value).boxed(),
    ]);
    pattern.matches(arg).ok()?;
    Some((name.get()?, value.get()?))
}

/// Add a possibly chained binding to `bindings`.
///
/// In `y = z = 4` the first name gets the expression and each later name
/// refers to the one before it, so all of them share one memoized value.
pub(super) fn accumulate_assign(bindings: &mut ScopeBuilder, arg: &Expr) -> Result<(), Value> {
    let mut names = Vec::new();
    let mut value = arg;
    while let Some((name, next)) = destructure_assign(value) {
        names.push(name);
        value = next;
    }
    if names.is_empty() {
        return Err(Value::error("missing = in where"));
    }

    let location = arg.location().unwrap_or_default();
    for (i, name) in names.iter().enumerate() {
        let expr = match i {
            0 => value.clone(),
            _ => Expr::name(location, names[i - 1]),
        };
        bindings
            .bind_expr(*name, expr)
            .map_err(|dup| Value::error(dup.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::scope::globals;
    use crate::EvalContext;

    fn call_args(source: &str) -> Vec<Expr> {
        let expr = parse(source).unwrap().into_result().unwrap();
        expr.children()[1..].to_vec()
    }

    #[test]
    fn test_where_args_recognized() {
        let args = call_args("f(x, where(x = 1))");
        assert!(where_args(&args[0]).is_none());
        assert_eq!(where_args(&args[1]).map(<[Expr]>::len), Some(1));
    }

    #[test]
    fn test_filter_args_borrows_without_where() {
        let args = call_args("f(a, b = 2)");
        let mut bindings = ScopeBuilder::new(globals());
        let rest = filter_args(&args, &mut bindings).unwrap();
        assert!(matches!(rest, Cow::Borrowed(_)));
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_chained_binding_aliases() {
        let ctx = EvalContext::new();
        let args = call_args("f(where(y = z = 4))");
        let mut bindings = ScopeBuilder::new(globals());
        let rest = filter_args(&args, &mut bindings).unwrap();
        assert!(rest.is_empty());
        let scope = bindings.build();
        assert_eq!(scope.get(&ctx, "y").unwrap(), Value::from(4.0));
        assert_eq!(scope.get(&ctx, "z").unwrap(), Value::from(4.0));
    }

    #[test]
    fn test_duplicate_where_binding() {
        let args = call_args("f(where(x = 1, x = 2))");
        let mut bindings = ScopeBuilder::new(globals());
        assert_eq!(
            filter_args(&args, &mut bindings).unwrap_err(),
            Value::error("duplicate name: x")
        );
    }

    #[test]
    fn test_where_requires_bindings() {
        let args = call_args("f(where(1))");
        let mut bindings = ScopeBuilder::new(globals());
        assert_eq!(
            filter_args(&args, &mut bindings).unwrap_err(),
            Value::error("missing = in where")
        );
    }
}
