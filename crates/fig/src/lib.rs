//! # Fig
//!
//! Dynamic configuration where every setting is a small expression that is
//! evaluated per request against caller-supplied arguments.
//!
//! The same expression language gates access: a basic-auth policy is just
//! another stored setting that must evaluate to `true`.
//!
//! ## Architecture
//!
//! ```text
//! source ─► [Tokenizer] ─► [Parser] ─► [Normalizer] ─► Expr ─► [Evaluator] ─► Value
//!                                                                 ▲
//!                                           [Matcher] ────────────┘
//! ```
//!
//! - **Parse**: incremental tokenizer, operator-priority parser with one frame
//!   per open bracket, and a normalizer producing canonical call-form nodes.
//! - **Match**: structural matcher combinators over dynamically shaped trees.
//! - **Eval**: tree-walking evaluator with lazy, memoized, cycle-detected
//!   scopes, closures, and first-class error values.
//! - **Service**: versioned store interface, refresh cache, config getter and
//! basic-auth policy built on top of the evaluator.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod context;
pub mod error;
pub mod eval;
pub mod matcher;
pub mod native;
pub mod parse;
pub mod scope;
pub mod service;
pub mod value;

// Re-export main types
pub use ast::{Expr, Location, Op, Tag};
pub use context::EvalContext;
pub use error::{
    ConfigError, DuplicateName, FatalError, ParseError, ParseErrorKind, ParseErrors, Result,
};
pub use eval::{eval, eval_source, Evaluate};
pub use native::Native;
pub use parse::{parse, tokenize, Parsed, Token};
pub use scope::{globals, Scope, ScopeBuilder};
pub use service::{
    api_name, set_basic_auth, BasicAuth, CachedStore, ConfigGetter, MemoryStore, Settings, Store,
};
pub use value::{ErrorValue, FunctionValue, HashableValue, NativeFn, Object, Value};

/// Fig version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
