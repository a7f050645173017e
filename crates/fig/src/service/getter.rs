//! Config evaluation

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::eval::eval;
use crate::native::Native;
use crate::parse::parse;
use crate::scope::{globals, ScopeBuilder};
use crate::value::Value;

use super::{Settings, Store};

/// Evaluates stored config expressions against a caller argument.
pub struct ConfigGetter<S> {
    store: S,
    settings: Settings,
}

impl<S: Store> ConfigGetter<S> {
    /// Create a getter with default settings.
    pub fn new(store: S) -> Self {
        Self::with_settings(store, Settings::default())
    }

    /// Create a getter with explicit settings.
    pub fn with_settings(store: S, settings: Settings) -> Self {
        Self { store, settings }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Evaluate the entry for `key` with the JSON argument bound to the
    /// argument name (`it` by default).
    ///
    /// An error value result is reported as [`ConfigError::Evaluation`].
    pub fn get(&self, key: &str, arg: &serde_json::Value) -> Result<Native, ConfigError> {
        match self.get_value(key, Value::from_json(arg))?.to_native() {
            Native::Error(message) => Err(ConfigError::Evaluation(message)),
            native => Ok(native),
        }
    }

    /// Evaluate the entry for `key` with an arbitrary argument value.
    ///
    /// Error values are returned as values.
    pub fn get_value(&self, key: &str, arg: Value) -> Result<Value, ConfigError> {
        let (_, config) = self.store.get_since(0);
        let source = config
            .get(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;

        let expr = parse(source)?.into_result().map_err(|errors| {
            debug!(key, %errors, "stored expression does not parse");
            ConfigError::from(errors)
        })?;

        let mut builder = ScopeBuilder::new(globals());
        builder
            .bind_value(self.settings.argument_name.as_str(), arg)
            .map_err(|dup| ConfigError::Settings(dup.to_string()))?;
        let scope = builder.build();

        let ctx = self.settings.context();
        eval(&ctx, &expr, &scope).map_err(|fatal| {
            warn!(key, %fatal, "evaluation aborted");
            ConfigError::from(fatal)
        })
    }
}
