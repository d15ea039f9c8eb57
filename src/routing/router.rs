//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Keep one trie root per HTTP method
//! - Store handlers under `method-pattern` keys
//! - Resolve a request to its handler and captured parameters
//!
//! # Design Decisions
//! - Method strings are used verbatim (no validation, case-sensitive)
//! - The handler is fetched by the matched pattern, not the request path
//! - Explicit `NotFound` rather than a silent default

use std::collections::HashMap;

use crate::observability::metrics;
use crate::routing::error::RouteError;
use crate::routing::node::Node;
use crate::routing::params::Params;
use crate::routing::pattern::{split_path, Pattern};

/// A registered route.
#[derive(Debug, Clone)]
pub struct Route<H> {
    pub method: String,
    pub pattern: Pattern,
    pub handler: H,
}

/// Successful resolution.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub handler: &'a H,
    /// The pattern the request matched, as registered.
    pub pattern: &'a str,
    pub params: Params,
}

/// Method-partitioned route table.
#[derive(Debug, Clone)]
pub struct Router<H> {
    roots: HashMap<String, Node>,
    routes: HashMap<String, Route<H>>,
}

fn route_key(method: &str, pattern: &str) -> String {
    format!("{}-{}", method, pattern)
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self {
            roots: HashMap::new(),
            routes: HashMap::new(),
        }
    }
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` and `pattern`.
    ///
    /// Registering the same pair again replaces the handler. A different pattern
    /// that ends on an occupied trie position (`/a/:x` then `/a/:y`) is rejected
    /// and leaves the table untouched.
    pub fn register(&mut self, method: &str, pattern: &str, handler: H) -> Result<(), RouteError> {
        let pattern = Pattern::parse(pattern)?;

        let root = self.roots.entry(method.to_string()).or_default();
        if let Some(existing) = root.terminal_for(&pattern) {
            if existing != &pattern {
                return Err(RouteError::Conflict {
                    method: method.to_string(),
                    existing: existing.as_str().to_string(),
                    pattern: pattern.as_str().to_string(),
                });
            }
        }
        root.insert(&pattern, 0);

        tracing::info!(method = %method, pattern = %pattern, "Route registered");

        let key = route_key(method, pattern.as_str());
        self.routes.insert(
            key,
            Route {
                method: method.to_string(),
                pattern,
                handler,
            },
        );
        metrics::record_routes(self.routes.len());
        Ok(())
    }

    /// Resolve `path` under `method`.
    pub fn resolve(&self, method: &str, path: &str) -> Result<RouteMatch<'_, H>, RouteError> {
        let root = self
            .roots
            .get(method)
            .ok_or_else(|| RouteError::not_found(method, path))?;

        let segments = split_path(path);
        let pattern = root
            .search(&segments, 0)
            .ok_or_else(|| RouteError::not_found(method, path))?;

        let route = self
            .routes
            .get(&route_key(method, pattern.as_str()))
            .ok_or_else(|| RouteError::not_found(method, path))?;

        tracing::trace!(method = %method, path = %path, pattern = %pattern, "Route matched");

        Ok(RouteMatch {
            handler: &route.handler,
            pattern: route.pattern.as_str(),
            params: pattern.extract(&segments),
        })
    }

    /// Every registered route, in no particular order.
    pub fn routes(&self) -> impl Iterator<Item = &Route<H>> {
        self.routes.values()
    }

    /// Methods with at least one registered route.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Trie size for `method`, root included. Zero for unknown methods.
    pub fn node_count(&self, method: &str) -> usize {
        self.roots.get(method).map_or(0, Node::count)
    }
}
