//! Parser integration tests: locations, rendering and error reporting

use fig::*;
use pretty_assertions::assert_eq;

fn parse_ok(source: &str) -> Expr {
    parse(source).unwrap().into_result().unwrap()
}

/// Every tagged node in pre-order, as `(op, source slice)`.
fn spans(source: &str) -> Vec<(String, String)> {
    let expr = parse_ok(source);
    let mut out = Vec::new();
    expr.walk(&mut |node| {
        if let Some(tag) = node.tag() {
            let text = tag.location.slice(source).unwrap_or("<out of range>");
            out.push((tag.op.to_string(), text.to_string()));
        }
    });
    out
}

// ═══════════════════════════════════════════════════════════════════════
// Locations
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_locations_slice_back_to_source() {
    let expected: Vec<(String, String)> = [
        ("call", ""),
        (".", "."),
        ("name", "f"),
        ("string", "g"),
        ("+", "+"),
        ("name", "x"),
        ("*", "*"),
        ("name", "y"),
        ("number", "3.2"),
    ]
    .into_iter()
    .map(|(op, text)| (op.to_string(), text.to_string()))
    .collect();
    assert_eq!(spans("f.g(x + y*3.2)"), expected);
}

#[test]
fn test_tree_string() {
    assert_eq!(
        parse_ok("f.g(x + y*3.2)").to_tree_string(),
        "[call:3:3 [.:1:2 [name:0:1 \"f\"] [string:2:3 \"g\"]] \
         [+:6:7 [name:4:5 \"x\"] [*:9:10 [name:8:9 \"y\"] [number:10:13 3.2]]]]"
    );
}

#[test]
fn test_leaf_locations_cover_strings() {
    let source = r#"x == "a \"b\"""#;
    let expr = parse_ok(source);
    let right = &expr.children()[1];
    assert_eq!(right.as_string_literal(), Some(r#"a "b""#));
    assert_eq!(
        right.location().and_then(|loc| loc.slice(source)),
        Some(r#""a \"b\"""#)
    );
}

#[test]
fn test_bool_leaves_are_case_insensitive() {
    assert_eq!(parse_ok("TRUE").to_tree_string(), "[bool:0:4 true]");
    assert_eq!(parse_ok("False").to_tree_string(), "[bool:0:5 false]");
}

// ═══════════════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_display_round_trips() {
    let sources = [
        "o.square(x, where(x = 1 + y, y = z = 4))",
        "{ it }(x = 5, y = 10).x",
        "-(1 + 2) * 3",
        "1 - (2 - 3)",
        "!(a & b) | c",
        r#"if(a <= 2, "x\"y", error("no"))"#,
    ];
    for source in sources {
        let rendered = parse_ok(source).to_string();
        let again = parse_ok(&rendered).to_string();
        assert_eq!(rendered, again, "source: {}", source);
    }
}

#[test]
fn test_display_canonical_form() {
    assert_eq!(parse_ok("f(a,b=2)").to_string(), "f(a, b = 2)");
    assert_eq!(parse_ok("{it*2}").to_string(), "{it * 2}");
    assert_eq!(parse_ok("(1+2)*3").to_string(), "(1 + 2) * 3");
    assert_eq!(parse_ok("1+2*3").to_string(), "1 + 2 * 3");
}

// ═══════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_errors_serialize_as_strings() {
    let parsed = parse("(1 + ").unwrap();
    let json = serde_json::to_value(&parsed.errors).unwrap();
    assert_eq!(
        json,
        serde_json::json!(["incomplete braces/parens at 0", "missing term at 5"])
    );
}

#[test]
fn test_error_list_keeps_going() {
    let parsed = parse("(a # b").unwrap();
    let kinds: Vec<ParseErrorKind> = parsed.errors.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ParseErrorKind::InvalidCharacter,
            ParseErrorKind::IncompleteBraces,
            ParseErrorKind::MissingOperator,
        ]
    );
}

#[test]
fn test_tokenize() {
    let (tokens, errors) = tokenize(r#"a<="b c""#);
    assert!(errors.is_empty());
    let shape: Vec<(&str, usize, usize)> = tokens
        .iter()
        .map(|t| (t.text.as_str(), t.start, t.end))
        .collect();
    assert_eq!(shape, vec![("a", 0, 1), ("<=", 1, 3), ("\"b c\"", 3, 8)]);
}

#[test]
fn test_fatal_errors_display() {
    assert_eq!(
        parse("a, b").unwrap_err().to_string(),
        "`,` is only valid inside an argument list (at 1)"
    );
    assert_eq!(
        parse("f(g() = 1)").unwrap_err(),
        FatalError::InvalidAssignTarget { offset: 6 }
    );
}
