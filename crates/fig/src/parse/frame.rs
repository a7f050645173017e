//! Operator-priority parsing with one frame per open bracket
//!
//! Produces an infix-shaped raw tree. Juxtaposed terms (`f (x)`) become
//! [`Raw::Apply`] nodes which the normalizer turns into calls.

use crate::ast::Location;
use crate::error::{ParseError, ParseErrorKind};

// ═══════════════════════════════════════════════════════════════════════
// Symbols
// ═══════════════════════════════════════════════════════════════════════

/// Bracket kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Brace {
    Paren,
    Curly,
}

/// Every operator symbol the tokenizer recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Symbol {
    Open(Brace),
    Close(Brace),
    Comma,
    Assign,
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Not,
    Dot,
}

impl Symbol {
    pub(crate) fn from_text(text: &str) -> Option<Symbol> {
        let symbol = match text {
            "(" => Symbol::Open(Brace::Paren),
            ")" => Symbol::Close(Brace::Paren),
            "{" => Symbol::Open(Brace::Curly),
            "}" => Symbol::Close(Brace::Curly),
            "," => Symbol::Comma,
            "=" => Symbol::Assign,
            "|" => Symbol::Or,
            "&" => Symbol::And,
            "==" => Symbol::Eq,
            "!=" => Symbol::Ne,
            "<" => Symbol::Lt,
            ">" => Symbol::Gt,
            "<=" => Symbol::Le,
            ">=" => Symbol::Ge,
            "+" => Symbol::Add,
            "-" => Symbol::Sub,
            "*" => Symbol::Mul,
            "/" => Symbol::Div,
            "!" => Symbol::Not,
            "." => Symbol::Dot,
            _ => return None,
        };
        Some(symbol)
    }

    pub(crate) fn priority(self) -> u8 {
        match self {
            Symbol::Open(_) | Symbol::Close(_) => 0,
            Symbol::Comma => 1,
            Symbol::Assign => 2,
            Symbol::Or => 3,
            Symbol::And => 4,
            Symbol::Eq | Symbol::Ne => 5,
            Symbol::Lt | Symbol::Gt | Symbol::Le | Symbol::Ge => 7,
            Symbol::Add | Symbol::Sub => 10,
            Symbol::Mul | Symbol::Div => 20,
            Symbol::Not => 30,
            Symbol::Dot => 40,
        }
    }

    fn is_right_associative(self) -> bool {
        self == Symbol::Assign
    }

    fn is_prefix(self) -> bool {
        matches!(self, Symbol::Add | Symbol::Sub | Symbol::Not)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Raw tree
// ═══════════════════════════════════════════════════════════════════════

/// Deepest raw tree the parser builds, counting every operator,
/// application and bracket level.
///
/// A term that would grow past it is replaced by [`Raw::Truncated`], so
/// everything downstream of the parser can recurse over the tree.
pub(crate) const MAX_DEPTH: usize = 256;

/// Classified leaf payload.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Leaf {
    String(String),
    Number(f64),
    Bool(bool),
    Name(String),
}

/// Parser output before normalization.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Raw {
    /// An operand that was never supplied, at the given offset.
    Missing(usize),
    /// A subtree cut off at [`MAX_DEPTH`], at the given offset.
    Truncated(usize),
    Leaf(Leaf, Location),
    Binary {
        symbol: Symbol,
        location: Location,
        left: Box<Raw>,
        right: Box<Raw>,
    },
    /// Two adjacent terms with no operator in between.
    Apply {
        location: Location,
        callee: Box<Raw>,
        args: Box<Raw>,
    },
    Group {
        brace: Brace,
        location: Location,
        inner: Box<Raw>,
    },
}

/// Classify a token by shape: quoted, leading digit, true/false, else name.
pub(crate) fn leaf(text: &str, location: Location, errors: &mut Vec<ParseError>) -> Raw {
    if let Some(body) = text.strip_prefix('"') {
        let body = body.strip_suffix('"').unwrap_or(body);
        let mut decoded = String::with_capacity(body.len());
        let mut chars = body.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                if let Some(escaped) = chars.next() {
                    decoded.push(escaped);
                }
            } else {
                decoded.push(ch);
            }
        }
        return Raw::Leaf(Leaf::String(decoded), location);
    }

    if text.starts_with(|c: char| c.is_ascii_digit()) {
        return match text.parse::<f64>() {
            Ok(n) => Raw::Leaf(Leaf::Number(n), location),
            Err(_) => {
                errors.push(ParseError::new(
                    ParseErrorKind::InvalidCharacter,
                    location.start,
                ));
                Raw::Missing(location.start)
            }
        };
    }

    if text.eq_ignore_ascii_case("true") {
        return Raw::Leaf(Leaf::Bool(true), location);
    }
    if text.eq_ignore_ascii_case("false") {
        return Raw::Leaf(Leaf::Bool(false), location);
    }

    Raw::Leaf(Leaf::Name(text.to_string()), location)
}

// ═══════════════════════════════════════════════════════════════════════
// Frames
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
struct PendingOp {
    symbol: Symbol,
    location: Location,
    priority: u8,
}

/// State for one bracket nesting level.
#[derive(Debug, Default)]
pub(crate) struct Frame {
    last_was_term: bool,
    ops: Vec<PendingOp>,
    /// Terms with their tree depth
    terms: Vec<(Raw, usize)>,
    /// Offset of the first term cut off at [`MAX_DEPTH`]
    too_deep: Option<usize>,
}

/// A reduced frame.
#[derive(Debug)]
pub(crate) struct Finished {
    pub(crate) raw: Raw,
    pub(crate) depth: usize,
    pub(crate) too_deep: Option<usize>,
}

impl Frame {
    /// Push an operator, first unwinding pending operators that bind at
    /// least as tightly.
    ///
    /// `+`, `-` and `!` with no term before them are prefix operators: they
    /// bind tighter than any infix operator and leave pending operators in
    /// place, so `1 - -2` and `2 * -3` parse without errors.
    pub(crate) fn handle_op(&mut self, symbol: Symbol, location: Location) {
        if !self.last_was_term {
            self.terms.push((Raw::Missing(location.start), 1));
            if symbol.is_prefix() {
                self.ops.push(PendingOp {
                    symbol,
                    location,
                    priority: Symbol::Not.priority(),
                });
                return;
            }
        }

        let priority = symbol.priority();
        while let Some(top) = self.ops.last().copied() {
            if top.priority < priority {
                break;
            }
            if symbol.is_right_associative() && top.symbol == symbol {
                break;
            }
            self.ops.pop();
            self.reduce(top);
        }

        self.ops.push(PendingOp {
            symbol,
            location,
            priority,
        });
        self.last_was_term = false;
    }

    /// Push a term of the given depth; a term directly after another
    /// becomes an application.
    pub(crate) fn handle_term(&mut self, term: Raw, depth: usize, location: Location) {
        let previous = if self.last_was_term {
            self.terms.pop()
        } else {
            None
        };
        match previous {
            Some((callee, callee_depth)) => self.push(
                Raw::Apply {
                    location: Location::new(location.start, location.start),
                    callee: Box::new(callee),
                    args: Box::new(term),
                },
                callee_depth.max(depth) + 1,
                location.start,
            ),
            None => self.push(term, depth, location.start),
        }
        self.last_was_term = true;
    }

    /// Reduce all pending operators and return the frame's single term.
    pub(crate) fn finish(mut self, end: usize) -> Finished {
        if !self.last_was_term && !self.ops.is_empty() {
            self.terms.push((Raw::Missing(end), 1));
        }
        while let Some(top) = self.ops.pop() {
            self.reduce(top);
        }
        let (raw, depth) = self.pop_term(end);
        Finished {
            raw,
            depth,
            too_deep: self.too_deep,
        }
    }

    fn reduce(&mut self, op: PendingOp) {
        let (right, right_depth) = self.pop_term(op.location.end);
        let (left, left_depth) = self.pop_term(op.location.start);
        self.push(
            Raw::Binary {
                symbol: op.symbol,
                location: op.location,
                left: Box::new(left),
                right: Box::new(right),
            },
            left_depth.max(right_depth) + 1,
            op.location.start,
        );
    }

    fn push(&mut self, term: Raw, depth: usize, offset: usize) {
        if depth > MAX_DEPTH {
            self.too_deep.get_or_insert(offset);
            self.terms.push((Raw::Truncated(offset), 1));
        } else {
            self.terms.push((term, depth));
        }
    }

    fn pop_term(&mut self, offset: usize) -> (Raw, usize) {
        self.terms.pop().unwrap_or((Raw::Missing(offset), 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str, start: usize) -> Raw {
        Raw::Leaf(
            Leaf::Name(text.to_string()),
            Location::new(start, start + text.len()),
        )
    }

    #[test]
    fn test_precedence_climbing() {
        // a + b * c
        let mut frame = Frame::default();
        frame.handle_term(name("a", 0), 1, Location::new(0, 1));
        frame.handle_op(Symbol::Add, Location::new(2, 3));
        frame.handle_term(name("b", 4), 1, Location::new(4, 5));
        frame.handle_op(Symbol::Mul, Location::new(6, 7));
        frame.handle_term(name("c", 8), 1, Location::new(8, 9));
        let Raw::Binary { symbol, right, .. } = frame.finish(9).raw else {
            panic!("expected binary");
        };
        assert_eq!(symbol, Symbol::Add);
        assert!(matches!(*right, Raw::Binary { symbol: Symbol::Mul, .. }));
    }

    #[test]
    fn test_assign_is_right_associative() {
        // x = y = z
        let mut frame = Frame::default();
        frame.handle_term(name("x", 0), 1, Location::new(0, 1));
        frame.handle_op(Symbol::Assign, Location::new(2, 3));
        frame.handle_term(name("y", 4), 1, Location::new(4, 5));
        frame.handle_op(Symbol::Assign, Location::new(6, 7));
        frame.handle_term(name("z", 8), 1, Location::new(8, 9));
        let Raw::Binary { left, right, .. } = frame.finish(9).raw else {
            panic!("expected binary");
        };
        assert_eq!(*left, name("x", 0));
        assert!(matches!(*right, Raw::Binary { symbol: Symbol::Assign, .. }));
    }

    #[test]
    fn test_missing_left_operand() {
        let mut frame = Frame::default();
        frame.handle_op(Symbol::Sub, Location::new(0, 1));
        frame.handle_term(name("x", 1), 1, Location::new(1, 2));
        let Raw::Binary { left, .. } = frame.finish(2).raw else {
            panic!("expected binary");
        };
        assert_eq!(*left, Raw::Missing(0));
    }

    #[test]
    fn test_depth_is_capped() {
        // ((a + a) + a) + ... one level deeper per operator
        let mut frame = Frame::default();
        frame.handle_term(name("a", 0), 1, Location::new(0, 1));
        for i in 0..MAX_DEPTH + 10 {
            let at = 1 + 2 * i;
            frame.handle_op(Symbol::Add, Location::new(at, at + 1));
            frame.handle_term(name("a", at + 1), 1, Location::new(at + 1, at + 2));
        }
        let finished = frame.finish(2 * MAX_DEPTH + 21);
        assert_eq!(finished.too_deep, Some(2 * MAX_DEPTH - 1));
        assert!(finished.depth <= MAX_DEPTH);
    }

    #[test]
    fn test_leaf_classification() {
        let mut errors = Vec::new();
        let loc = Location::new(0, 4);
        assert_eq!(
            leaf(r#""a\"b""#, loc, &mut errors),
            Raw::Leaf(Leaf::String("a\"b".into()), loc)
        );
        assert_eq!(leaf("3.5", loc, &mut errors), Raw::Leaf(Leaf::Number(3.5), loc));
        assert_eq!(leaf("TRUE", loc, &mut errors), Raw::Leaf(Leaf::Bool(true), loc));
        assert_eq!(
            leaf("truth", loc, &mut errors),
            Raw::Leaf(Leaf::Name("truth".into()), loc)
        );
        assert!(errors.is_empty());
    }
}
