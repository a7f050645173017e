//! Config service built on the evaluator
//!
//! ```text
//! Store ─► CachedStore ─► ConfigGetter::get(key, arg)    "it" = arg
//!                     └─► BasicAuth::authorize(user, ..)  key, secret, api
//! ```

mod auth;
mod cache;
mod getter;
mod settings;
mod store;

pub use auth::{api_name, set_basic_auth, BasicAuth, DEFAULT_AUTH_PREFIX};
pub use cache::{CachedStore, Clock};
pub use getter::ConfigGetter;
pub use settings::Settings;
pub use store::{MemoryStore, Store};
