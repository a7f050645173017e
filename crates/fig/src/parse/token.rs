//! Incremental tokenizer
//!
//! Characters are fed one at a time. A token is only emitted once the next
//! character shows that it cannot be extended, so the final character fed
//! must be whitespace for the last token to flush.

use crate::error::{ParseError, ParseErrorKind};

use super::frame::Symbol;

/// A token with its half-open byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Raw token text (strings keep their quotes and escapes)
    pub text: String,
    /// First byte
    pub start: usize,
    /// One past the last byte
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Quote { escaped: bool },
    Number,
    Operator,
    Name,
}

/// Buffered state between characters.
#[derive(Debug, Default)]
pub(crate) struct Tokenizer {
    seen: String,
    start: usize,
    class: Option<Class>,
}

impl Tokenizer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed one character.
    ///
    /// Returns a token when one is complete. `last` forces the buffer to
    /// flush; an unterminated string is closed with a synthesized quote and
    /// reported.
    pub(crate) fn next(
        &mut self,
        ch: char,
        offset: usize,
        last: bool,
        errors: &mut Vec<ParseError>,
    ) -> Option<Token> {
        let Some(class) = self.class else {
            self.begin(ch, offset, errors);
            return if last { self.flush(errors) } else { None };
        };

        match class {
            Class::Quote { escaped } => {
                if last && ch.is_whitespace() {
                    return self.flush(errors);
                }
                self.seen.push(ch);
                if ch == '"' && !escaped {
                    return self.emit();
                }
                self.class = Some(Class::Quote {
                    escaped: ch == '\\' && !escaped,
                });
            }
            Class::Number => {
                self.seen.push(ch);
                if self.seen.parse::<f64>().is_err() {
                    self.seen.pop();
                    return self.restart(ch, offset, errors);
                }
            }
            Class::Operator => {
                self.seen.push(ch);
                if Symbol::from_text(&self.seen).is_none() {
                    self.seen.pop();
                    return self.restart(ch, offset, errors);
                }
            }
            Class::Name => {
                if ch.is_whitespace() || ch == '"' || is_operator_start(ch) {
                    return self.restart(ch, offset, errors);
                }
                self.seen.push(ch);
            }
        }

        if last {
            self.flush(errors)
        } else {
            None
        }
    }

    /// Start a fresh token at `ch`.
    fn begin(&mut self, ch: char, offset: usize, errors: &mut Vec<ParseError>) {
        let class = if ch.is_whitespace() {
            return;
        } else if ch == '"' {
            Class::Quote { escaped: false }
        } else if ch.is_ascii_digit() {
            Class::Number
        } else if is_operator_start(ch) {
            Class::Operator
        } else if ch.is_alphabetic() {
            Class::Name
        } else {
            errors.push(ParseError::new(ParseErrorKind::InvalidCharacter, offset));
            return;
        };
        self.start = offset;
        self.seen.push(ch);
        self.class = Some(class);
    }

    /// Emit the buffered token and begin a new one at `ch`.
    fn restart(
        &mut self,
        ch: char,
        offset: usize,
        errors: &mut Vec<ParseError>,
    ) -> Option<Token> {
        let token = self.emit();
        self.begin(ch, offset, errors);
        token
    }

    fn flush(&mut self, errors: &mut Vec<ParseError>) -> Option<Token> {
        if let Some(Class::Quote { escaped }) = self.class {
            let closed = self.seen.len() > 1 && self.seen.ends_with('"') && !escaped;
            if !closed {
                errors.push(ParseError::new(ParseErrorKind::IncompleteString, self.start));
                if escaped {
                    self.seen.push('\\');
                }
                self.seen.push('"');
            }
        }
        self.emit()
    }

    fn emit(&mut self) -> Option<Token> {
        self.class = None;
        if self.seen.is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.seen);
        let start = self.start;
        Some(Token {
            end: start + text.len(),
            text,
            start,
        })
    }
}

fn is_operator_start(ch: char) -> bool {
    let mut buf = [0u8; 4];
    Symbol::from_text(ch.encode_utf8(&mut buf)).is_some()
}

/// Split source text into tokens.
///
/// Returns every token in order plus the lexical errors found on the way.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<ParseError>) {
    let mut errors = Vec::new();
    let mut tokens = Vec::new();
    let mut tokenizer = Tokenizer::new();
    for (offset, ch, last) in padded(source) {
        if let Some(token) = tokenizer.next(ch, offset, last, &mut errors) {
            tokens.push(token);
        }
    }
    (tokens, errors)
}

/// Characters of `source` followed by one trailing blank, with the `last`
/// flag set on that blank.
pub(crate) fn padded(source: &str) -> impl Iterator<Item = (usize, char, bool)> + '_ {
    source
        .char_indices()
        .map(|(offset, ch)| (offset, ch, false))
        .chain(std::iter::once((source.len(), ' ', true)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        tokenize(source).0.into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(texts("x + 10"), vec!["x", "+", "10"]);
        assert_eq!(texts("a<=b"), vec!["a", "<=", "b"]);
        assert_eq!(texts("f(x,y)"), vec!["f", "(", "x", ",", "y", ")"]);
    }

    #[test]
    fn test_token_offsets() {
        let (tokens, errors) = tokenize("ab + 3.25");
        assert!(errors.is_empty());
        assert_eq!(
            tokens,
            vec![
                Token { text: "ab".into(), start: 0, end: 2 },
                Token { text: "+".into(), start: 3, end: 4 },
                Token { text: "3.25".into(), start: 5, end: 9 },
            ]
        );
    }

    #[test]
    fn test_number_keeps_maximal_prefix() {
        assert_eq!(texts("3.2*y"), vec!["3.2", "*", "y"]);
        assert_eq!(texts("12.5.3"), vec!["12.5", ".", "3"]);
        assert_eq!(texts("12x"), vec!["12", "x"]);
    }

    #[test]
    fn test_operator_maximal_munch() {
        assert_eq!(texts("a==b"), vec!["a", "==", "b"]);
        assert_eq!(texts("a!=!b"), vec!["a", "!=", "!", "b"]);
        assert_eq!(texts("-(1)"), vec!["-", "(", "1", ")"]);
    }

    #[test]
    fn test_string_escapes() {
        let (tokens, errors) = tokenize(r#""hell\"o" x"#);
        assert!(errors.is_empty());
        assert_eq!(tokens[0].text, r#""hell\"o""#);
        assert_eq!(tokens[0].end, 9);
        assert_eq!(tokens[1].text, "x");
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = tokenize(r#"x "abc"#);
        assert_eq!(
            errors,
            vec![ParseError::new(ParseErrorKind::IncompleteString, 2)]
        );
        assert_eq!(tokens[1].text, r#""abc""#);

        let (tokens, _) = tokenize(r#""ab\"#);
        assert_eq!(tokens[0].text, r#""ab\\""#);
    }

    #[test]
    fn test_invalid_character_is_discarded() {
        let (tokens, errors) = tokenize("a # b");
        assert_eq!(
            errors,
            vec![ParseError::new(ParseErrorKind::InvalidCharacter, 2)]
        );
        assert_eq!(tokens.len(), 2);

        let (tokens, errors) = tokenize("a+#b");
        assert_eq!(
            errors,
            vec![ParseError::new(ParseErrorKind::InvalidCharacter, 2)]
        );
        assert_eq!(
            tokens.into_iter().map(|t| t.text).collect::<Vec<_>>(),
            vec!["a", "+", "b"]
        );
    }
}
