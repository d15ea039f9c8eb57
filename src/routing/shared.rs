//! Route table shared between the server and late registrations.
//!
//! Readers take a snapshot and never block. Writers copy the current table,
//! register into the copy and swap it in, one writer at a time.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::routing::error::RouteError;
use crate::routing::router::Router;

/// Snapshot-swapped [`Router`].
#[derive(Debug)]
pub struct SharedRouter<H> {
    current: ArcSwap<Router<H>>,
    writer: Mutex<()>,
}

impl<H: Clone> SharedRouter<H> {
    pub fn new(router: Router<H>) -> Self {
        Self {
            current: ArcSwap::from_pointee(router),
            writer: Mutex::new(()),
        }
    }

    /// The table as of now. Later registrations do not affect it.
    pub fn snapshot(&self) -> Arc<Router<H>> {
        self.current.load_full()
    }

    /// Register into a copy of the table and publish it.
    pub fn register(&self, method: &str, pattern: &str, handler: H) -> Result<(), RouteError> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = Router::clone(&self.current.load());
        next.register(method, pattern, handler)?;
        self.current.store(Arc::new(next));
        Ok(())
    }
}

impl<H: Clone> From<Router<H>> for SharedRouter<H> {
    fn from(router: Router<H>) -> Self {
        Self::new(router)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_isolation() {
        let mut router = Router::new();
        router.register("GET", "/a", 1).unwrap();
        let shared = SharedRouter::new(router);

        let before = shared.snapshot();
        shared.register("GET", "/b", 2).unwrap();

        assert!(before.resolve("GET", "/b").is_err());
        assert_eq!(*shared.snapshot().resolve("GET", "/b").unwrap().handler, 2);
        assert_eq!(*shared.snapshot().resolve("GET", "/a").unwrap().handler, 1);
    }

    #[test]
    fn test_failed_registration_publishes_nothing() {
        let shared = SharedRouter::new(Router::new());
        shared.register("GET", "/a/:x", 1).unwrap();
        let before = shared.snapshot();

        assert!(shared.register("GET", "/a/:y", 2).is_err());
        assert!(Arc::ptr_eq(&before, &shared.snapshot()));
    }

    #[test]
    fn test_concurrent_registration() {
        let shared = Arc::new(SharedRouter::new(Router::new()));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    shared
                        .register("GET", &format!("/item{}/:id", i), i)
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let router = shared.snapshot();
        assert_eq!(router.len(), 8);
        let found = router.resolve("GET", "/item3/42").unwrap();
        assert_eq!(*found.handler, 3);
        assert_eq!(found.params.get("id"), Some("42"));
    }
}
