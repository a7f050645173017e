//! Service settings

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::context::{EvalContext, DEFAULT_MAX_CALL_DEPTH};
use crate::error::ConfigError;

use super::auth::DEFAULT_AUTH_PREFIX;

/// Settings for the config service, read from JSON.
///
/// Every field is optional in the file.
///
/// ```
/// use fig::Settings;
///
/// let settings = Settings::from_json(r#"{"refresh_ms": 250}"#).unwrap();
/// assert_eq!(settings.refresh_ms, 250);
/// assert_eq!(settings.argument_name, "it");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Cache refresh interval in milliseconds
    pub refresh_ms: u64,

    /// Nesting limit for closure calls and lazy bindings
    pub max_call_depth: usize,

    /// Store key prefix of basic-auth policies
    pub auth_prefix: String,

    /// Name the config argument is bound to
    pub argument_name: String,

    /// Trace every evaluated node
    pub trace: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_ms: 1000,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            auth_prefix: DEFAULT_AUTH_PREFIX.to_string(),
            argument_name: "it".to_string(),
            trace: false,
        }
    }
}

impl Settings {
    /// Decode settings from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|err| ConfigError::Settings(err.to_string()))
    }

    /// Read settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Settings(format!("{}: {}", path.display(), err)))?;
        Self::from_json(&text)
    }

    /// The cache refresh interval.
    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    /// A fresh evaluation context for one request.
    pub fn context(&self) -> EvalContext {
        EvalContext::with_max_call_depth(self.max_call_depth).with_trace(self.trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.refresh(), Duration::from_secs(1));
        assert_eq!(settings.auth_prefix, "auth:basic:");
        assert_eq!(settings.context().max_call_depth, 128);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Settings::from_json(r#"{"refresh": 1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Settings(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::from_file("/nonexistent/fig.json").unwrap_err();
        assert!(err.to_string().starts_with("invalid settings: /nonexistent/fig.json"));
    }
}
