//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (method, pattern, handler):
//!     → pattern.rs (validate, split into segments)
//!     → node.rs (insert into the method's trie)
//!     → router.rs (store handler under "METHOD-pattern")
//!
//! Lookup (method, path):
//!     → pattern.rs (split path into segments)
//!     → node.rs (backtracking search, static > param > catch-all)
//!     → pattern.rs (bind params from the matched pattern)
//!     → Return: handler + params, or NotFound
//! ```
//!
//! # Design Decisions
//! - One trie per method, built at startup
//! - Deterministic: lookup order does not depend on registration order
//! - `shared.rs` swaps whole snapshots so readers never take a lock

pub mod error;
mod node;
pub mod params;
pub mod pattern;
pub mod router;
pub mod shared;

pub use error::{RouteError, RouteResult};
pub use params::Params;
pub use pattern::{parse_pattern, split_path, Pattern, Segment};
pub use router::{Route, RouteMatch, Router};
pub use shared::SharedRouter;
