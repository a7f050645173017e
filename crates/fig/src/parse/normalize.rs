//! Rewrites the raw infix tree into canonical call-form nodes

use crate::ast::{Expr, Location, Op};
use crate::error::{FatalError, ParseError, ParseErrorKind};

use super::frame::{Brace, Leaf, Raw, Symbol};

/// Normalize a raw tree, appending recoverable problems to `errors`.
///
/// Missing terms become [`Expr::Nil`] with a `MissingTerm` error. Stray
/// `,`/`=` and non-name assignment targets are fatal.
pub(crate) fn normalize(raw: Raw, errors: &mut Vec<ParseError>) -> Result<Expr, FatalError> {
    match raw {
        Raw::Missing(offset) => {
            errors.push(ParseError::new(ParseErrorKind::MissingTerm, offset));
            Ok(Expr::Nil)
        }
        // already reported by the parser
        Raw::Truncated(_) => Ok(Expr::Nil),
        Raw::Leaf(leaf, location) => Ok(leaf_expr(leaf, location)),
        Raw::Group {
            brace: Brace::Paren,
            inner,
            ..
        } => normalize(*inner, errors),
        Raw::Group {
            brace: Brace::Curly,
            location,
            inner,
        } => {
            let items = flatten(*inner, errors)?;
            Ok(Expr::node(Op::Closure, location, items))
        }
        Raw::Apply {
            location,
            callee,
            args,
        } => {
            let callee = normalize(*callee, errors)?;
            call(location, callee, *args, errors)
        }
        Raw::Binary {
            symbol,
            location,
            left,
            right,
        } => binary(symbol, location, *left, *right, errors),
    }
}

fn leaf_expr(leaf: Leaf, location: Location) -> Expr {
    match leaf {
        Leaf::String(s) => Expr::string(location, s),
        Leaf::Number(n) => Expr::number(location, n),
        Leaf::Bool(b) => Expr::boolean(location, b),
        Leaf::Name(name) => Expr::name(location, name),
    }
}

fn binary(
    symbol: Symbol,
    location: Location,
    left: Raw,
    right: Raw,
    errors: &mut Vec<ParseError>,
) -> Result<Expr, FatalError> {
    let op = match symbol {
        Symbol::Comma => {
            return Err(FatalError::MisplacedOperator {
                op: ",",
                offset: location.start,
            })
        }
        Symbol::Assign => {
            return Err(FatalError::MisplacedOperator {
                op: "=",
                offset: location.start,
            })
        }
        Symbol::Dot => {
            let left = normalize(left, errors)?;
            return field(location, left, right, errors);
        }
        Symbol::Open(_) | Symbol::Close(_) => {
            return Err(FatalError::MalformedNode {
                found: format!("bracket operator at {}", location),
            })
        }
        Symbol::Or => Op::Or,
        Symbol::And => Op::And,
        Symbol::Eq => Op::Eq,
        Symbol::Ne => Op::Ne,
        Symbol::Lt => Op::Lt,
        Symbol::Gt => Op::Gt,
        Symbol::Le => Op::Le,
        Symbol::Ge => Op::Ge,
        Symbol::Add => Op::Add,
        Symbol::Sub => Op::Sub,
        Symbol::Mul => Op::Mul,
        Symbol::Div => Op::Div,
        Symbol::Not => Op::Not,
    };

    let unary = matches!(left, Raw::Missing(_));
    if unary && matches!(op, Op::Add | Op::Sub | Op::Not) {
        let operand = normalize(right, errors)?;
        return Ok(Expr::node(op, location, [operand]));
    }
    if op == Op::Not {
        // `a ! b`: the `!` can only be a prefix
        errors.push(ParseError::new(
            ParseErrorKind::MissingOperator,
            location.start,
        ));
        return Ok(Expr::Nil);
    }

    let left = normalize(left, errors)?;
    let right = normalize(right, errors)?;
    Ok(Expr::node(op, location, [left, right]))
}

/// `left.right`, with name keys turned into string literals.
///
/// A call on the right (`o.f(x)` parses as `o . (f (x))`) is rotated so the
/// field access becomes the callee: `call(.(o, "f"), x)`.
fn field(
    location: Location,
    left: Expr,
    right: Raw,
    errors: &mut Vec<ParseError>,
) -> Result<Expr, FatalError> {
    match right {
        Raw::Apply {
            location: call_location,
            callee,
            args,
        } => {
            let callee = field(location, left, *callee, errors)?;
            call(call_location, callee, *args, errors)
        }
        Raw::Leaf(Leaf::Name(key), key_location) => Ok(Expr::node(
            Op::Field,
            location,
            [left, Expr::string(key_location, key)],
        )),
        other => {
            let key = normalize(other, errors)?;
            Ok(Expr::node(Op::Field, location, [left, key]))
        }
    }
}

fn call(
    location: Location,
    callee: Expr,
    args: Raw,
    errors: &mut Vec<ParseError>,
) -> Result<Expr, FatalError> {
    let Raw::Group {
        brace: Brace::Paren,
        inner,
        ..
    } = args
    else {
        errors.push(ParseError::new(
            ParseErrorKind::MissingOperator,
            location.end,
        ));
        return Ok(Expr::Nil);
    };

    let mut items = vec![callee];
    if !matches!(*inner, Raw::Missing(_)) {
        items.extend(flatten(*inner, errors)?);
    }
    Ok(Expr::node(Op::Call, location, items))
}

/// Flatten a left-nested comma chain into normalized arguments.
fn flatten(raw: Raw, errors: &mut Vec<ParseError>) -> Result<Vec<Expr>, FatalError> {
    let mut reversed = Vec::new();
    let mut current = raw;
    loop {
        match current {
            Raw::Binary {
                symbol: Symbol::Comma,
                left,
                right,
                ..
            } => {
                reversed.push(*right);
                current = *left;
            }
            other => {
                reversed.push(other);
                break;
            }
        }
    }

    reversed
        .into_iter()
        .rev()
        .map(|arg| normalize_arg(arg, errors))
        .collect()
}

/// Arguments may be `name = value` bindings (possibly chained).
fn normalize_arg(raw: Raw, errors: &mut Vec<ParseError>) -> Result<Expr, FatalError> {
    let Raw::Binary {
        symbol: Symbol::Assign,
        location,
        left,
        right,
    } = raw
    else {
        return normalize(raw, errors);
    };

    let name = match *left {
        Raw::Leaf(Leaf::Name(name), name_location) => Expr::string(name_location, name),
        Raw::Missing(offset) => {
            errors.push(ParseError::new(ParseErrorKind::MissingTerm, offset));
            Expr::Nil
        }
        _ => {
            return Err(FatalError::InvalidAssignTarget {
                offset: location.start,
            })
        }
    };
    let value = normalize_arg(*right, errors)?;
    Ok(Expr::node(Op::Assign, location, [name, value]))
}
