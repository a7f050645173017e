//! Tokenizer, parser and normalizer
//!
//! Parsing is error tolerant: [`parse`] always yields a best-effort tree plus
//! the list of problems found. Only front-end invariant violations (a stray
//! `,` or `=`, or a non-name assignment target) abort with [`FatalError`].
//!
//! ```text
//! source + " " ─► Tokenizer ─► Frame stack ─► Raw tree ─► normalize ─► Expr
//! ```

mod frame;
mod normalize;
mod token;

pub use token::{tokenize, Token};

use tracing::trace;

use crate::ast::{Expr, Location};
use crate::error::{FatalError, ParseError, ParseErrorKind, ParseErrors};

use frame::{Brace, Frame, Raw, Symbol};
use token::Tokenizer;

/// A parsed expression together with any recoverable errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    /// Best-effort canonical tree
    pub expr: Expr,

    /// Problems found, in source order of discovery
    pub errors: Vec<ParseError>,
}

impl Parsed {
    /// True when no errors were reported.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The tree if parsing was clean, otherwise the collected errors.
    pub fn into_result(self) -> Result<Expr, ParseErrors> {
        if self.errors.is_empty() {
            Ok(self.expr)
        } else {
            Err(ParseErrors(self.errors))
        }
    }
}

/// Parse source text into a canonical expression tree.
pub fn parse(source: &str) -> Result<Parsed, FatalError> {
    let mut errors = Vec::new();
    let raw = Parser::default().run(source, &mut errors);
    let expr = normalize::normalize(raw, &mut errors)?;
    if !errors.is_empty() {
        trace!(source, errors = errors.len(), "parsed with errors");
    }
    Ok(Parsed { expr, errors })
}

/// The frame stack: the root frame plus one frame per open bracket.
#[derive(Default)]
struct Parser {
    root: Frame,
    nested: Vec<(Brace, usize, Frame)>,
    /// Offset of the first subtree cut off for depth
    too_deep: Option<usize>,
}

impl Parser {
    fn run(mut self, source: &str, errors: &mut Vec<ParseError>) -> Raw {
        let mut tokenizer = Tokenizer::new();
        for (offset, ch, last) in token::padded(source) {
            let Some(token) = tokenizer.next(ch, offset, last, errors) else {
                continue;
            };
            if !self.feed(token, errors) {
                return self.finish(source.len(), None);
            }
        }
        self.finish(source.len(), Some(errors))
    }

    fn top(&mut self) -> &mut Frame {
        match self.nested.last_mut() {
            Some((_, _, frame)) => frame,
            None => &mut self.root,
        }
    }

    /// Returns false when parsing must stop.
    fn feed(&mut self, token: Token, errors: &mut Vec<ParseError>) -> bool {
        let location = Location::new(token.start, token.end);
        match Symbol::from_text(&token.text) {
            Some(Symbol::Open(brace)) => {
                self.nested.push((brace, token.start, Frame::default()));
            }
            Some(Symbol::Close(brace)) => {
                let Some((open, start, frame)) = self.nested.pop() else {
                    errors.push(ParseError::new(
                        ParseErrorKind::MismatchedBraces,
                        token.start,
                    ));
                    return false;
                };
                if open != brace {
                    self.nested.push((open, start, frame));
                    errors.push(ParseError::new(
                        ParseErrorKind::MismatchedBraces,
                        token.start,
                    ));
                    return false;
                }
                self.close(brace, Location::new(start, token.end), frame, token.start);
            }
            Some(symbol) => self.top().handle_op(symbol, location),
            None => {
                let term = frame::leaf(&token.text, location, errors);
                self.top().handle_term(term, 1, location);
            }
        }
        true
    }

    /// Reduce a bracket's frame into a group term of the enclosing frame.
    fn close(&mut self, brace: Brace, location: Location, frame: Frame, end: usize) {
        let inner = frame.finish(end);
        self.note_depth(inner.too_deep);
        self.top().handle_term(
            Raw::Group {
                brace,
                location,
                inner: Box::new(inner.raw),
            },
            inner.depth + 1,
            location,
        );
    }

    fn note_depth(&mut self, offset: Option<usize>) {
        if self.too_deep.is_none() {
            self.too_deep = offset;
        }
    }

    /// Force-close every open bracket and reduce the root frame.
    ///
    /// Unclosed brackets and depth cut-offs are reported when `errors` is
    /// given.
    fn finish(mut self, end: usize, mut errors: Option<&mut Vec<ParseError>>) -> Raw {
        while let Some((brace, start, frame)) = self.nested.pop() {
            if let Some(errors) = errors.as_deref_mut() {
                errors.push(ParseError::new(ParseErrorKind::IncompleteBraces, start));
            }
            self.close(brace, Location::new(start, end), frame, end);
        }
        let root = std::mem::take(&mut self.root).finish(end);
        self.note_depth(root.too_deep);
        if let (Some(errors), Some(offset)) = (errors, self.too_deep) {
            errors.push(ParseError::new(ParseErrorKind::TooDeep, offset));
        }
        root.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Op;

    fn tree(source: &str) -> String {
        let parsed = parse(source).unwrap();
        assert!(parsed.is_ok(), "errors: {:?}", parsed.errors);
        parsed.expr.to_tree_string()
    }

    fn error_kinds(source: &str) -> Vec<ParseErrorKind> {
        parse(source)
            .unwrap()
            .errors
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_binary_precedence() {
        assert_eq!(
            tree("1 + 2 * 3"),
            "[+:2:3 [number:0:1 1] [*:6:7 [number:4:5 2] [number:8:9 3]]]"
        );
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(tree("-x"), "[-:0:1 [name:1:2 \"x\"]]");
        assert_eq!(
            tree("4 + (-4)"),
            "[+:2:3 [number:0:1 4] [-:5:6 [number:6:7 4]]]"
        );
    }

    #[test]
    fn test_prefix_after_operator() {
        assert_eq!(
            tree("1 - -2"),
            "[-:2:3 [number:0:1 1] [-:4:5 [number:5:6 2]]]"
        );
        assert_eq!(tree("!!x"), "[!:0:1 [!:1:2 [name:2:3 \"x\"]]]");
        assert_eq!(
            tree("8 / -2 / 2"),
            "[/:7:8 [/:2:3 [number:0:1 8] [-:4:5 [number:5:6 2]]] [number:9:10 2]]"
        );
    }

    #[test]
    fn test_call_and_field_rotation() {
        assert_eq!(
            tree("o.square(5)"),
            "[call:8:8 [.:1:2 [name:0:1 \"o\"] [string:2:8 \"square\"]] [number:9:10 5]]"
        );
    }

    #[test]
    fn test_empty_call() {
        let parsed = parse("f()").unwrap();
        assert!(parsed.is_ok());
        assert_eq!(parsed.expr.op(), Some(Op::Call));
        assert_eq!(parsed.expr.children().len(), 1);
    }

    #[test]
    fn test_named_arguments() {
        assert_eq!(
            tree("f(x = y = 4)"),
            "[call:1:1 [name:0:1 \"f\"] [=:4:5 [string:2:3 \"x\"] [=:8:9 [string:6:7 \"y\"] [number:10:11 4]]]]"
        );
    }

    #[test]
    fn test_closure_literal() {
        assert_eq!(
            tree("{ it }(2)"),
            "[call:6:6 [{}:0:6 [name:2:4 \"it\"]] [number:7:8 2]]"
        );
    }

    #[test]
    fn test_missing_term() {
        assert_eq!(error_kinds("1 +"), vec![ParseErrorKind::MissingTerm]);
        assert_eq!(error_kinds("* 2"), vec![ParseErrorKind::MissingTerm]);
        assert_eq!(error_kinds(""), vec![ParseErrorKind::MissingTerm]);
    }

    #[test]
    fn test_missing_operator() {
        assert_eq!(error_kinds("x y"), vec![ParseErrorKind::MissingOperator]);
        assert_eq!(error_kinds("a ! b"), vec![ParseErrorKind::MissingOperator]);
    }

    #[test]
    fn test_brace_errors() {
        assert_eq!(error_kinds("(1 + 2}"), vec![ParseErrorKind::MismatchedBraces]);
        assert_eq!(error_kinds("1)"), vec![ParseErrorKind::MismatchedBraces]);
        let parsed = parse("f(1").unwrap();
        assert_eq!(
            parsed.errors,
            vec![ParseError::new(ParseErrorKind::IncompleteBraces, 1)]
        );
        assert_eq!(parsed.expr.op(), Some(Op::Call));
    }

    #[test]
    fn test_fatal_shapes() {
        assert_eq!(
            parse("a, b"),
            Err(FatalError::MisplacedOperator { op: ",", offset: 1 })
        );
        assert_eq!(
            parse("x = 1"),
            Err(FatalError::MisplacedOperator { op: "=", offset: 2 })
        );
        assert_eq!(
            parse("f(1 = 2)"),
            Err(FatalError::InvalidAssignTarget { offset: 4 })
        );
    }

    #[test]
    fn test_long_chains_are_cut_off() {
        let sum = vec!["1"; 10_000].join("+");
        let parsed = parse(&sum).unwrap();
        assert_eq!(
            parsed.errors,
            vec![ParseError::new(ParseErrorKind::TooDeep, 511)]
        );

        let nested = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        let kinds = error_kinds(&nested);
        assert_eq!(kinds, vec![ParseErrorKind::TooDeep]);
    }

    #[test]
    fn test_depth_limit_allows_long_config() {
        let sum = vec!["1"; 200].join(" + ");
        let parsed = parse(&sum).unwrap();
        assert!(parsed.is_ok());
        assert_eq!(parsed.expr.op(), Some(Op::Add));
    }

    #[test]
    fn test_into_result() {
        assert!(parse("1 + 1").unwrap().into_result().is_ok());
        let err = parse("\"abc").unwrap().into_result().unwrap_err();
        assert_eq!(err.to_string(), "unterminated string at 0");
    }
}
