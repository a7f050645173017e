//! Structural matching over dynamically shaped trees
//!
//! A [`Matcher`] checks a [`View`] of a tree and either succeeds or reports a
//! [`Mismatch`]. Matchers compose with [`and`](MatcherExt::and),
//! [`or`](MatcherExt::or) and [`not`](MatcherExt::not), and capturing
//! matchers copy the matched part into a [`Cell`](std::cell::Cell) owned by
//! the caller:
//!
//! ```
//! use std::cell::Cell;
//! use fig::matcher::{capture_list, list_first, text, Matcher};
//! use serde_json::json;
//!
//! let value = json!(["call", 1, 2]);
//! let rest = Cell::new(None);
//! list_first(text("call"), capture_list(&rest)).matches(&value).unwrap();
//! assert_eq!(rest.get().map(|r| r.len()), Some(2));
//! ```
//!
//! The matcher works on anything implementing [`Tree`]; both the canonical
//! [`Expr`] and `serde_json::Value` do.

mod capture;
mod list;

pub use capture::{
    auto, capture, capture_bool, capture_list, capture_node, capture_number, capture_str,
};
pub use list::{list, list_first, list_last};

use thiserror::Error;

use crate::ast::Expr;

// ═══════════════════════════════════════════════════════════════════════
// Trees and views
// ═══════════════════════════════════════════════════════════════════════

/// A dynamically typed tree: leaves are strings, numbers or booleans and
/// inner nodes are lists.
pub trait Tree: Sized + 'static {
    /// The string payload, if this is a string-like leaf.
    fn as_str(&self) -> Option<&str>;

    /// The number payload, if any.
    fn as_number(&self) -> Option<f64>;

    /// The boolean payload, if any.
    fn as_bool(&self) -> Option<bool>;

    /// The elements, if this is a list.
    fn as_list(&self) -> Option<&[Self]>;

    /// Whether this is the empty value.
    fn is_nil(&self) -> bool;
}

impl Tree for Expr {
    /// Node tags read as their operator symbol.
    fn as_str(&self) -> Option<&str> {
        match self {
            Expr::String(s) => Some(s),
            Expr::Tag(tag) => Some(tag.op.symbol()),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Expr::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn as_list(&self) -> Option<&[Self]> {
        match self {
            Expr::List(items) => Some(items),
            _ => None,
        }
    }

    fn is_nil(&self) -> bool {
        matches!(self, Expr::Nil)
    }
}

impl Tree for serde_json::Value {
    fn as_str(&self) -> Option<&str> {
        serde_json::Value::as_str(self)
    }

    fn as_number(&self) -> Option<f64> {
        self.as_f64()
    }

    fn as_bool(&self) -> Option<bool> {
        serde_json::Value::as_bool(self)
    }

    fn as_list(&self) -> Option<&[Self]> {
        self.as_array().map(Vec::as_slice)
    }

    fn is_nil(&self) -> bool {
        self.is_null()
    }
}

/// What a matcher looks at: one node, or the remaining elements of a list.
pub enum View<'t, T> {
    /// A single tree node
    Node(&'t T),
    /// A slice of list elements
    Seq(&'t [T]),
}

impl<T> Clone for View<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for View<'_, T> {}

impl<T: std::fmt::Debug> std::fmt::Debug for View<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Node(node) => f.debug_tuple("Node").field(node).finish(),
            View::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
        }
    }
}

impl<T: PartialEq> PartialEq for View<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (View::Node(a), View::Node(b)) => a == b,
            (View::Seq(a), View::Seq(b)) => a == b,
            _ => false,
        }
    }
}

impl<'t, T: Tree> View<'t, T> {
    /// The node, if this view is a single node.
    pub fn node(self) -> Option<&'t T> {
        match self {
            View::Node(node) => Some(node),
            View::Seq(_) => None,
        }
    }

    /// The elements, whether this is a list node or a slice.
    pub fn list(self) -> Option<&'t [T]> {
        match self {
            View::Node(node) => node.as_list(),
            View::Seq(items) => Some(items),
        }
    }

    fn str(self) -> Option<&'t str> {
        self.node().and_then(Tree::as_str)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Matcher trait
// ═══════════════════════════════════════════════════════════════════════

/// Why a match failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The value did not satisfy the matcher
    #[error("no match")]
    NoMatch,
    /// Expected a list
    #[error("not a list")]
    NotList,
    /// Expected a non-empty list
    #[error("empty list")]
    EmptyList,
    /// Expected a string
    #[error("not a string")]
    NotString,
    /// Expected a number
    #[error("not a number")]
    NotNumber,
    /// Expected a boolean
    #[error("not a bool")]
    NotBool,
    /// A list had the wrong number of elements
    #[error("expected {expected} elements, got {got}")]
    LengthMismatch {
        /// Number of element matchers
        expected: usize,
        /// Number of elements present
        got: usize,
    },
}

/// A structural check over views of `T` borrowed for `'t`.
///
/// Matchers without captures implement this for every `'t`, so one matcher
/// can be checked against any number of unrelated trees. A capturing
/// matcher stores borrows of the matched tree, so it is tied to the
/// lifetime of the `Cell` it writes into, and so is any [`list`] holding
/// boxed matchers.
pub trait Matcher<'t, T: Tree> {
    /// Check a view.
    fn check(&self, view: View<'t, T>) -> Result<(), Mismatch>;

    /// Check a single node.
    fn matches(&self, value: &'t T) -> Result<(), Mismatch> {
        self.check(View::Node(value))
    }
}

/// Chaining helpers available on every matcher.
pub trait MatcherExt<'t, T: Tree>: Matcher<'t, T> + Sized {
    /// Succeeds when both succeed; `other` only runs if `self` matched.
    fn and<M: Matcher<'t, T>>(self, other: M) -> And<Self, M> {
        And(self, other)
    }

    /// Succeeds when either succeeds; `other` only runs if `self` failed.
    fn or<M: Matcher<'t, T>>(self, other: M) -> Or<Self, M> {
        Or(self, other)
    }

    /// Inverts the result.
    fn not(self) -> Not<Self> {
        Not(self)
    }

    /// Erase the matcher type, for heterogeneous lists.
    fn boxed<'m>(self) -> Box<dyn Matcher<'t, T> + 'm>
    where
        Self: 'm,
    {
        Box::new(self)
    }
}

impl<'t, T: Tree, M: Matcher<'t, T>> MatcherExt<'t, T> for M {}

/// See [`MatcherExt::and`].
#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(A, B);

impl<'t, T: Tree, A: Matcher<'t, T>, B: Matcher<'t, T>> Matcher<'t, T> for And<A, B> {
    fn check(&self, view: View<'t, T>) -> Result<(), Mismatch> {
        self.0.check(view)?;
        self.1.check(view)
    }
}

/// See [`MatcherExt::or`].
#[derive(Debug, Clone, Copy)]
pub struct Or<A, B>(A, B);

impl<'t, T: Tree, A: Matcher<'t, T>, B: Matcher<'t, T>> Matcher<'t, T> for Or<A, B> {
    fn check(&self, view: View<'t, T>) -> Result<(), Mismatch> {
        self.0.check(view).or_else(|_| self.1.check(view))
    }
}

/// See [`MatcherExt::not`].
#[derive(Debug, Clone, Copy)]
pub struct Not<A>(A);

impl<'t, T: Tree, A: Matcher<'t, T>> Matcher<'t, T> for Not<A> {
    fn check(&self, view: View<'t, T>) -> Result<(), Mismatch> {
        match self.0.check(view) {
            Ok(()) => Err(Mismatch::NoMatch),
            Err(_) => Ok(()),
        }
    }
}

/// See [`from_fn`].
#[derive(Clone, Copy)]
pub struct FromFn<F>(F);

impl<'t, T, F> Matcher<'t, T> for FromFn<F>
where
    T: Tree,
    F: Fn(View<'t, T>) -> Result<(), Mismatch>,
{
    fn check(&self, view: View<'t, T>) -> Result<(), Mismatch> {
        (self.0)(view)
    }
}

/// Use a closure as a matcher.
///
/// A closure whose parameter is annotated `View<'_, T>` accepts views of
/// any lifetime, so the matcher is reusable across trees:
///
/// ```
/// use fig::matcher::{from_fn, Matcher, Mismatch, View};
/// use serde_json::json;
///
/// let even = from_fn(|view: View<'_, serde_json::Value>| {
///     match view.node().and_then(|n| n.as_f64()) {
///         Some(n) if n % 2.0 == 0.0 => Ok(()),
///         _ => Err(Mismatch::NoMatch),
///     }
/// });
/// assert!(even.matches(&json!(2)).is_ok());
/// assert!(even.matches(&json!(3)).is_err());
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F> {
    FromFn(f)
}

// ═══════════════════════════════════════════════════════════════════════
// Primitive matchers
// ═══════════════════════════════════════════════════════════════════════

fn ensure(ok: bool, otherwise: Mismatch) -> Result<(), Mismatch> {
    if ok {
        Ok(())
    } else {
        Err(otherwise)
    }
}

/// See [`any`].
#[derive(Debug, Clone, Copy)]
pub struct Any;

impl<'t, T: Tree> Matcher<'t, T> for Any {
    fn check(&self, _: View<'t, T>) -> Result<(), Mismatch> {
        Ok(())
    }
}

/// Matches anything.
pub fn any() -> Any {
    Any
}

/// See [`nothing`].
#[derive(Debug, Clone, Copy)]
pub struct Nothing;

impl<'t, T: Tree> Matcher<'t, T> for Nothing {
    fn check(&self, _: View<'t, T>) -> Result<(), Mismatch> {
        Err(Mismatch::NoMatch)
    }
}

/// Matches nothing.
pub fn nothing() -> Nothing {
    Nothing
}

/// See [`nil`].
#[derive(Debug, Clone, Copy)]
pub struct Nil;

impl<'t, T: Tree> Matcher<'t, T> for Nil {
    fn check(&self, view: View<'t, T>) -> Result<(), Mismatch> {
        ensure(view.node().is_some_and(Tree::is_nil), Mismatch::NoMatch)
    }
}

/// Matches the empty value.
pub fn nil() -> Nil {
    Nil
}

/// See [`equals`].
#[derive(Debug)]
pub struct Equals<'a, T>(&'a T);

impl<T> Clone for Equals<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Equals<'_, T> {}

impl<'t, T: Tree + PartialEq> Matcher<'t, T> for Equals<'_, T> {
    fn check(&self, view: View<'t, T>) -> Result<(), Mismatch> {
        ensure(
            matches!(view.node(), Some(node) if node == self.0),
            Mismatch::NoMatch,
        )
    }
}

/// Matches a node equal to `expected`.
pub fn equals<T: Tree + PartialEq>(expected: &T) -> Equals<'_, T> {
    Equals(expected)
}

/// See [`text`].
#[derive(Debug, Clone, Copy)]
pub struct Text<'a>(&'a str);

impl<'t, T: Tree> Matcher<'t, T> for Text<'_> {
    fn check(&self, view: View<'t, T>) -> Result<(), Mismatch> {
        match view.str() {
            Some(s) => ensure(s == self.0, Mismatch::NoMatch),
            None => Err(Mismatch::NotString),
        }
    }
}

/// Matches a string-like leaf with exactly this text.
pub fn text(expected: &str) -> Text<'_> {
    Text(expected)
}

/// See [`string_prefix`].
#[derive(Debug, Clone, Copy)]
pub struct StringPrefix<'a>(&'a str);

impl<'t, T: Tree> Matcher<'t, T> for StringPrefix<'_> {
    fn check(&self, view: View<'t, T>) -> Result<(), Mismatch> {
        match view.str() {
            Some(s) => ensure(s.starts_with(self.0), Mismatch::NoMatch),
            None => Err(Mismatch::NotString),
        }
    }
}

/// Matches a string-like leaf starting with `prefix`.
pub fn string_prefix(prefix: &str) -> StringPrefix<'_> {
    StringPrefix(prefix)
}

/// Leaf and list kinds, see [`is_string`] and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Any string-like leaf
    String,
    /// Any number leaf
    Number,
    /// Any boolean leaf
    Bool,
    /// Any list, including list remainders
    List,
}

impl<'t, T: Tree> Matcher<'t, T> for Kind {
    fn check(&self, view: View<'t, T>) -> Result<(), Mismatch> {
        match self {
            Kind::String => ensure(view.str().is_some(), Mismatch::NotString),
            Kind::Number => ensure(
                view.node().and_then(Tree::as_number).is_some(),
                Mismatch::NotNumber,
            ),
            Kind::Bool => ensure(
                view.node().and_then(Tree::as_bool).is_some(),
                Mismatch::NotBool,
            ),
            Kind::List => ensure(view.list().is_some(), Mismatch::NotList),
        }
    }
}

/// Matches any string-like leaf.
pub fn is_string() -> Kind {
    Kind::String
}

/// Matches any number leaf.
pub fn is_number() -> Kind {
    Kind::Number
}

/// Matches any boolean leaf.
pub fn is_bool() -> Kind {
    Kind::Bool
}

/// Matches any list, including list remainders.
pub fn is_list() -> Kind {
    Kind::List
}
