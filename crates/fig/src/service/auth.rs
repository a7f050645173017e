//! Basic-auth policies stored as config
//!
//! The policy for `user` lives under `auth:basic:<user>` and is evaluated
//! with `key` (the user name), `secret` (the presented password) and `api`
//! (derived from the request path) bound. Only a `true` result authorizes.

use tracing::{debug, info};

use crate::ast::quote;
use crate::eval::eval;
use crate::parse::parse;
use crate::scope::{globals, Scope};
use crate::value::Value;

use super::{Settings, Store};

/// Default store key prefix for basic-auth policies.
pub const DEFAULT_AUTH_PREFIX: &str = "auth:basic:";

/// Checks credentials against stored policies.
pub struct BasicAuth<S> {
    store: S,
    settings: Settings,
}

impl<S: Store> BasicAuth<S> {
    /// Create a checker with default settings.
    pub fn new(store: S) -> Self {
        Self::with_settings(store, Settings::default())
    }

    /// Create a checker with explicit settings.
    pub fn with_settings(store: S, settings: Settings) -> Self {
        Self { store, settings }
    }

    /// Whether `user` may call `api` with `password`.
    ///
    /// Missing or unparsable policies, fatal errors and any result other
    /// than `true` all deny.
    pub fn authorize(&self, user: &str, password: &str, api: &str) -> bool {
        let key = format!("{}{}", self.settings.auth_prefix, user);
        let (_, config) = self.store.get_since(0);
        let Some(source) = config.get(&key) else {
            debug!(user, "no basic auth policy");
            return false;
        };

        let expr = match parse(source).map(|parsed| parsed.into_result()) {
            Ok(Ok(expr)) => expr,
            _ => {
                debug!(user, "basic auth policy does not parse");
                return false;
            }
        };

        let bindings = [
            ("key", Value::from(user)),
            ("secret", Value::from(password)),
            ("api", Value::from(api)),
        ];
        let Ok(scope) = Scope::with_values(globals(), bindings) else {
            return false;
        };

        let ctx = self.settings.context();
        let allowed = matches!(eval(&ctx, &expr, &scope), Ok(Value::Bool(true)));
        info!(user, api, allowed, "basic auth");
        allowed
    }

    /// Store the standard policy for `user` under the configured prefix.
    pub fn set_password(&self, user: &str, password: &str) {
        store_policy(&self.store, &self.settings.auth_prefix, user, password)
    }
}

/// Store the standard policy `secret == "<password>"` for `user`.
pub fn set_basic_auth<S: Store + ?Sized>(store: &S, user: &str, password: &str) {
    store_policy(store, DEFAULT_AUTH_PREFIX, user, password)
}

fn store_policy<S: Store + ?Sized>(store: &S, prefix: &str, user: &str, password: &str) {
    let policy = format!("secret == {}", quote(password));
    store.set(&format!("{}{}", prefix, user), &policy);
}

/// The API name of a request path: its first non-empty segment.
///
/// ```
/// assert_eq!(fig::api_name("/config/get?x=1"), "config");
/// assert_eq!(fig::api_name("/"), "");
/// ```
pub fn api_name(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').find(|segment| !segment.is_empty()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MemoryStore;

    #[test]
    fn test_standard_policy() {
        let store = MemoryStore::new();
        set_basic_auth(&store, "alice", r#"pa"ss\word"#);
        let auth = BasicAuth::new(store);
        assert!(auth.authorize("alice", r#"pa"ss\word"#, "config"));
        assert!(!auth.authorize("alice", "wrong", "config"));
        assert!(!auth.authorize("bob", r#"pa"ss\word"#, "config"));
    }

    #[test]
    fn test_custom_policy() {
        let store = MemoryStore::from_entries([(
            "auth:basic:ci",
            r#"secret == "token" & api == "history""#,
        )]);
        let auth = BasicAuth::new(store);
        assert!(auth.authorize("ci", "token", "history"));
        assert!(!auth.authorize("ci", "token", "set"));
    }

    #[test]
    fn test_non_bool_and_broken_policies_deny() {
        let store = MemoryStore::from_entries([
            ("auth:basic:num", "1"),
            ("auth:basic:broken", "secret =="),
            ("auth:basic:error", "nope"),
        ]);
        let auth = BasicAuth::new(store);
        assert!(!auth.authorize("num", "", ""));
        assert!(!auth.authorize("broken", "", ""));
        assert!(!auth.authorize("error", "", ""));
    }

    #[test]
    fn test_api_name() {
        assert_eq!(api_name("/history/key"), "history");
        assert_eq!(api_name("//set"), "set");
        assert_eq!(api_name(""), "");
    }
}
