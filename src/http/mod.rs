//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (axum::serve)
//!     → request.rs (assign request ID)
//!     → server.rs (dispatch: resolve method + path in the route table)
//!     → context.rs (method, path, params, query, form, body)
//!     → handler
//!     → response.rs helpers (text, JSON, HTML, bytes, 404)
//!     → Send to client
//! ```

pub mod context;
pub mod request;
pub mod response;
pub mod server;

pub use context::Context;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{serve, AppState, Engine, Handler};
