//! Canonical expression trees
//!
//! The normalizer produces prefix-shaped nodes: a node is a list whose first
//! element is a [`Tag`] (operator kind plus source location) followed by the
//! node's children. Leaves carry their payload as a plain child:
//!
//! ```text
//! o.five + 10   =>   [+:7:8 [.:1:2 [name:0:1 "o"] [string:2:6 "five"]] [number:9:11 10]]
//! ```

use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// Operators and locations
// ═══════════════════════════════════════════════════════════════════════

/// The closed set of canonical node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// String literal leaf
    String,
    /// Number literal leaf
    Number,
    /// Boolean literal leaf
    Bool,
    /// Variable reference leaf
    Name,
    /// `callee(args...)`
    Call,
    /// `left.key`
    Field,
    /// `+`, binary or unary
    Add,
    /// `-`, binary or unary
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `&`
    And,
    /// `|`
    Or,
    /// Unary `!`
    Not,
    /// `name = value` binding
    Assign,
    /// `{ ... }` closure literal
    Closure,
}

impl Op {
    /// The symbol used in tags.
    pub fn symbol(self) -> &'static str {
        match self {
            Op::String => "string",
            Op::Number => "number",
            Op::Bool => "bool",
            Op::Name => "name",
            Op::Call => "call",
            Op::Field => ".",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::And => "&",
            Op::Or => "|",
            Op::Not => "!",
            Op::Assign => "=",
            Op::Closure => "{}",
        }
    }

    /// Look up an operator by its tag symbol.
    pub fn from_symbol(symbol: &str) -> Option<Op> {
        let op = match symbol {
            "string" => Op::String,
            "number" => Op::Number,
            "bool" => Op::Bool,
            "name" => Op::Name,
            "call" => Op::Call,
            "." => Op::Field,
            "+" => Op::Add,
            "-" => Op::Sub,
            "*" => Op::Mul,
            "/" => Op::Div,
            "<" => Op::Lt,
            "<=" => Op::Le,
            ">" => Op::Gt,
            ">=" => Op::Ge,
            "==" => Op::Eq,
            "!=" => Op::Ne,
            "&" => Op::And,
            "|" => Op::Or,
            "!" => Op::Not,
            "=" => Op::Assign,
            "{}" => Op::Closure,
            _ => return None,
        };
        Some(op)
    }

    /// Whether this is a literal or name leaf.
    pub fn is_leaf(self) -> bool {
        matches!(self, Op::String | Op::Number | Op::Bool | Op::Name)
    }

    /// Binding strength when rendering infix source.
    fn precedence(self) -> u8 {
        match self {
            Op::Assign => 2,
            Op::Or => 3,
            Op::And => 4,
            Op::Eq | Op::Ne => 5,
            Op::Lt | Op::Le | Op::Gt | Op::Ge => 7,
            Op::Add | Op::Sub => 10,
            Op::Mul | Op::Div => 20,
            Op::Not => 30,
            _ => 40,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Half-open byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Location {
    /// First byte
    pub start: usize,
    /// One past the last byte
    pub end: usize,
}

impl Location {
    /// Create a location.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Slice the source text covered by this location.
    pub fn slice<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.start..self.end)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Operator kind plus location, the head of every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Node kind
    pub op: Op,
    /// Source span
    pub location: Location,
}

impl Tag {
    /// Create a tag.
    pub fn new(op: Op, location: Location) -> Self {
        Self { op, location }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.op, self.location)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Expression trees
// ═══════════════════════════════════════════════════════════════════════

/// A canonical expression tree.
///
/// `Nil` only appears in trees whose parse also reported errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Node head
    Tag(Tag),
    /// String payload
    String(String),
    /// Number payload
    Number(f64),
    /// Boolean payload
    Bool(bool),
    /// A node: tag followed by children
    List(Vec<Expr>),
    /// Placeholder for a missing term
    Nil,
}

impl Expr {
    /// Build a node from its operator, location and children.
    pub fn node(op: Op, location: Location, children: impl IntoIterator<Item = Expr>) -> Expr {
        let mut items = vec![Expr::Tag(Tag::new(op, location))];
        items.extend(children);
        Expr::List(items)
    }

    /// A string literal leaf.
    pub fn string(location: Location, value: impl Into<String>) -> Expr {
        Expr::node(Op::String, location, [Expr::String(value.into())])
    }

    /// A number literal leaf.
    pub fn number(location: Location, value: f64) -> Expr {
        Expr::node(Op::Number, location, [Expr::Number(value)])
    }

    /// A boolean literal leaf.
    pub fn boolean(location: Location, value: bool) -> Expr {
        Expr::node(Op::Bool, location, [Expr::Bool(value)])
    }

    /// A name reference leaf.
    pub fn name(location: Location, name: impl Into<String>) -> Expr {
        Expr::node(Op::Name, location, [Expr::String(name.into())])
    }

    /// The head tag, if this is a node.
    pub fn tag(&self) -> Option<&Tag> {
        match self {
            Expr::List(items) => match items.first() {
                Some(Expr::Tag(tag)) => Some(tag),
                _ => None,
            },
            _ => None,
        }
    }

    /// The node kind, if this is a node.
    pub fn op(&self) -> Option<Op> {
        self.tag().map(|tag| tag.op)
    }

    /// The node location, if this is a node.
    pub fn location(&self) -> Option<Location> {
        self.tag().map(|tag| tag.location)
    }

    /// Children following the tag (empty for non-nodes).
    pub fn children(&self) -> &[Expr] {
        match self {
            Expr::List(items) if self.tag().is_some() => &items[1..],
            _ => &[],
        }
    }

    /// The name text if this is a `name` leaf.
    pub fn as_name(&self) -> Option<&str> {
        match (self.op(), self.children()) {
            (Some(Op::Name), [Expr::String(name)]) => Some(name),
            _ => None,
        }
    }

    /// The key text if this is a `string` leaf.
    pub fn as_string_literal(&self) -> Option<&str> {
        match (self.op(), self.children()) {
            (Some(Op::String), [Expr::String(text)]) => Some(text),
            _ => None,
        }
    }

    /// Whether this is an `=` binding node.
    pub fn is_assign(&self) -> bool {
        self.op() == Some(Op::Assign)
    }

    /// Visit every node in depth-first, pre-order.
    pub fn walk(&self, visit: &mut dyn FnMut(&Expr)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Render as a tagged tree, e.g. `[+:2:3 [number:0:1 1] [number:4:5 2]]`.
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out);
        out
    }

    fn write_tree(&self, out: &mut String) {
        match self {
            Expr::Tag(tag) => out.push_str(&tag.to_string()),
            Expr::String(s) => out.push_str(&quote(s)),
            Expr::Number(n) => out.push_str(&format_number(*n)),
            Expr::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Expr::Nil => out.push_str("nil"),
            Expr::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    item.write_tree(out);
                }
                out.push(']');
            }
        }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, parent: Op) -> fmt::Result {
        match self.op() {
            Some(op)
                if !op.is_leaf()
                    && (op.precedence() < parent.precedence()
                        || (op.precedence() == parent.precedence()
                            && parent.precedence() < Op::Field.precedence())) =>
            {
                write!(f, "({})", self)
            }
            _ => write!(f, "{}", self),
        }
    }
}

/// Quote a string with `\"` and `\\` escapes.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Render a number the way the language spells it.
///
/// Infinities and NaN have no literal syntax and render as the named
/// constants from the `math` global.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "math.NaN".to_string()
    } else if n.is_infinite() && n > 0.0 {
        "math.Inf".to_string()
    } else if n.is_infinite() {
        "-math.Inf".to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Display for Expr {
    /// Renders source text that parses back to an equivalent tree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(op) = self.op() else {
            return match self {
                Expr::String(s) => f.write_str(&quote(s)),
                Expr::Number(n) => f.write_str(&format_number(*n)),
                Expr::Bool(b) => write!(f, "{}", b),
                Expr::Tag(tag) => write!(f, "{}", tag),
                Expr::List(_) | Expr::Nil => f.write_str("_"),
            };
        };

        let children = self.children();
        match (op, children) {
            (Op::String | Op::Number | Op::Bool, [payload]) => write!(f, "{}", payload),
            (Op::Name, [Expr::String(name)]) => f.write_str(name),
            (Op::Call, [callee, args @ ..]) => {
                callee.write_operand(f, Op::Call)?;
                f.write_str("(")?;
                write_joined(f, args)?;
                f.write_str(")")
            }
            (Op::Field, [left, right]) => {
                left.write_operand(f, Op::Field)?;
                f.write_str(".")?;
                match right.as_string_literal() {
                    Some(key) => f.write_str(key),
                    None => write!(f, "({})", right),
                }
            }
            (Op::Assign, [name, value]) => {
                match name.as_string_literal() {
                    Some(key) => f.write_str(key)?,
                    None => write!(f, "{}", name)?,
                }
                write!(f, " = {}", value)
            }
            (Op::Closure, items) => {
                f.write_str("{")?;
                write_joined(f, items)?;
                f.write_str("}")
            }
            (_, [operand]) => {
                f.write_str(op.symbol())?;
                operand.write_operand(f, op)
            }
            (_, [left, right]) => {
                left.write_operand(f, op)?;
                write!(f, " {} ", op)?;
                right.write_operand(f, op)
            }
            _ => f.write_str("_"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
