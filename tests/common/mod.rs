//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use trie_router::http::{serve, Handler};
use trie_router::{Engine, SharedRouter, Shutdown};

/// A served engine on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub routes: Arc<SharedRouter<Handler>>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .unwrap()
            .unwrap();
    }
}

/// Serve `engine` on 127.0.0.1 with an OS-assigned port.
pub async fn start(engine: Engine) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let (app, routes) = engine.into_app();

    let handle = tokio::spawn(serve(listener, app, shutdown.clone()));

    TestServer {
        addr,
        routes,
        shutdown,
        handle,
    }
}

/// A client that never reuses connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
