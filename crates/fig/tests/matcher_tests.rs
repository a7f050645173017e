//! Matcher tests over parsed expressions and JSON trees

use std::cell::Cell;

use fig::matcher::*;
use fig::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn parse_ok(source: &str) -> Expr {
    parse(source).unwrap().into_result().unwrap()
}

// ═══════════════════════════════════════════════════════════════════════
// Expression trees
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_destructure_binary() {
    let expr = parse_ok("x + 2");
    let name = Cell::new(None);
    let amount = Cell::new(None);
    let pattern = list(vec![
        text("+").boxed(),
        list(vec![text("name").boxed(), capture_str(&name).boxed()]).boxed(),
        list(vec![text("number").boxed(), capture_number(&amount).boxed()]).boxed(),
    ]);
    assert!(pattern.matches(&expr).is_ok());
    assert_eq!(name.get(), Some("x"));
    assert_eq!(amount.get(), Some(2.0));
}

#[test]
fn test_call_head_and_arguments() {
    let expr = parse_ok("f(a, b = 1)");
    let callee = Cell::new(None);
    let args = Cell::new(None);
    let pattern = list_first(text("call"), list_first(capture_node(&callee), capture_list(&args)));
    assert!(pattern.matches(&expr).is_ok());
    assert_eq!(callee.get().and_then(Expr::as_name), Some("f"));
    let args = args.get().unwrap();
    assert_eq!(args.len(), 2);
    assert!(args[1].is_assign());
}

#[test]
fn test_bool_leaf() {
    let expr = parse_ok("false");
    let flag = Cell::new(None);
    let pattern = list(vec![text("bool").boxed(), capture_bool(&flag).boxed()]);
    assert!(pattern.matches(&expr).is_ok());
    assert_eq!(flag.get(), Some(false));
}

#[test]
fn test_auto_spots_repeated_operands() {
    // parsed operands carry their own locations, so build `x * x` by hand
    let x = Expr::name(Location::new(0, 1), "x");
    let square = Expr::node(Op::Mul, Location::new(1, 2), [x.clone(), x]);
    let product = parse_ok("x * y");

    let seen = Cell::new(None);
    let same = auto(&seen);
    let pattern = list_first(text("*"), list(vec![same.boxed(), same.boxed()]));
    assert!(pattern.matches(&square).is_ok());

    let seen = Cell::new(None);
    let same = auto(&seen);
    let pattern = list_first(text("*"), list(vec![same.boxed(), same.boxed()]));
    assert!(pattern.matches(&product).is_err());
}

#[test]
fn test_last_argument() {
    let expr = parse_ok("f(1, 2, where(k = 3))");
    let plain = parse_ok("f(1, 2)");
    let pattern = list_last(
        list_first(
            text("call"),
            list_first(list(vec![text("name").boxed(), text("where").boxed()]), any()),
        ),
        any(),
    );
    assert!(pattern.matches(&expr).is_ok());
    assert!(pattern.matches(&plain).is_err());
}

// ═══════════════════════════════════════════════════════════════════════
// JSON trees
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_json_shapes() {
    let value = json!(["route", "/api/users", ["GET", "POST"]]);
    let path = Cell::new(None);
    let methods = Cell::new(None);
    let pattern = list(vec![
        text("route").boxed(),
        string_prefix("/api").and(capture_str(&path)).boxed(),
        capture_list(&methods).boxed(),
    ]);
    assert!(pattern.matches(&value).is_ok());
    assert_eq!(path.get(), Some("/api/users"));
    assert_eq!(methods.get().map(<[_]>::len), Some(2));
}

#[test]
fn test_json_mismatch_reasons() {
    let value = json!(["route", 5]);
    let pattern = list(vec![text("route").boxed(), is_string().boxed()]);
    assert_eq!(pattern.matches(&value), Err(Mismatch::NotString));

    let pattern = list(vec![text("route").boxed()]);
    assert_eq!(
        pattern.matches(&value),
        Err(Mismatch::LengthMismatch {
            expected: 1,
            got: 2
        })
    );

    assert_eq!(
        list_first::<serde_json::Value, _, _>(any(), any()).matches(&json!([])),
        Err(Mismatch::EmptyList)
    );
    assert_eq!(is_list().matches(&json!("x")), Err(Mismatch::NotList));
}

#[test]
fn test_custom_matcher() {
    let even = from_fn(|view: View<'_, serde_json::Value>| {
        match view.node().and_then(|n| n.as_f64()) {
            Some(n) if n % 2.0 == 0.0 => Ok(()),
            Some(_) => Err(Mismatch::NoMatch),
            None => Err(Mismatch::NotNumber),
        }
    });
    assert!(even.matches(&json!(4)).is_ok());
    assert_eq!(even.matches(&json!(3)), Err(Mismatch::NoMatch));
    assert!(even.or(nil()).matches(&json!(null)).is_ok());
}
