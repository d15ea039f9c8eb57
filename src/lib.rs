//! Trie-based HTTP request router.
//!
//! Routes are `/`-delimited patterns with static segments, `:name` parameters
//! and a trailing `*name` wildcard, kept in one segment trie per HTTP method.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::EngineConfig;
pub use http::{Context, Engine};
pub use lifecycle::Shutdown;
pub use routing::{Params, RouteError, RouteMatch, Router, SharedRouter};
