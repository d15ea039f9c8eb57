//! trie-router demo server.
//!
//! Registers a handful of routes exercising static, parameter and wildcard
//! patterns, then serves them until Ctrl+C.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::StatusCode;
use clap::Parser;
use tokio::net::TcpListener;

use trie_router::config::{load_config, validation::validate_config, EngineConfig};
use trie_router::http::response;
use trie_router::lifecycle::signals::shutdown_on_ctrl_c;
use trie_router::observability::{logging, metrics};
use trie_router::{Context, Engine, RouteError, Shutdown};

#[derive(Parser)]
#[command(name = "trie-router")]
#[command(about = "Serve a demo route table", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

fn register_routes(engine: &mut Engine) -> Result<(), RouteError> {
    engine.get("/", |_: Context| response::html(StatusCode::OK, "<h1>Hello trie-router</h1>"))?;
    engine.get("/hello", |c: Context| {
        let name = c.query("name").unwrap_or_default();
        response::text(StatusCode::OK, format!("hello {}, you're at {}\n", name, c.path()))
    })?;
    engine.get("/hello/:name", |c: Context| {
        let name = c.param("name").unwrap_or_default();
        response::text(StatusCode::OK, format!("hello {}, you're at {}\n", name, c.path()))
    })?;
    engine.post("/login", |c: Context| {
        let mut body = HashMap::new();
        body.insert("username", c.post_form("username").unwrap_or_default());
        body.insert("password", c.post_form("password").unwrap_or_default());
        response::json(StatusCode::OK, &body)
    })?;
    engine.get("/assets/*filepath", |c: Context| response::json(StatusCode::OK, c.params()))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(|errors| {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })?;
    }

    logging::init(&config.observability);
    tracing::info!("trie-router v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let mut engine = Engine::new(config.clone());
    register_routes(&mut engine)?;
    tracing::info!(routes = engine.router().len(), "Route table built");

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_ctrl_c(shutdown.clone()));

    engine.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
