//! route-server binary.
//!
//! Loads a TOML configuration, binds the routes it declares to the built-in
//! handlers, and serves them until Ctrl+C.
//!
//! ```text
//! route-server --config route-server.toml --port 8080
//! ```

use std::path::PathBuf;

use clap::Parser;
use serde_json::{json, Value};

use route_server::config::{load_config, ServerConfig};
use route_server::observability::{logging::init_logging, metrics::init_metrics};
use route_server::{HandlerRegistry, Responder, RouteDescriptor, RouteHandler, RouteServer};

#[derive(Parser)]
#[command(name = "route-server")]
#[command(about = "Serve declared REST routes with the built-in handlers", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the configured server name.
    #[arg(short, long)]
    name: Option<String>,
}

/// Handlers that configuration files can refer to by name.
fn builtin_handlers(server_name: &str) -> HandlerRegistry {
    let name = server_name.to_string();
    let mut registry = HandlerRegistry::new();
    registry
        .register("ping", RouteHandler::new(|_, respond: Responder| respond.ok(json!({"ok": true}))))
        .register("echo", RouteHandler::new(|input: Value, respond: Responder| respond.ok(input)))
        .register(
            "status",
            RouteHandler::new(move |_, respond: Responder| {
                respond.ok(json!({
                    "name": name,
                    "version": env!("CARGO_PKG_VERSION"),
                    "status": "operational",
                }))
            }),
        );
    registry
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(name) = cli.name {
        config.name = name;
    }

    init_logging(&config.observability.log_level);
    tracing::info!("route-server v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.bind_address(),
        https = config.is_https(),
        declared_routes = config.declared_routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        match addr.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %addr, "Failed to parse metrics address"),
        }
    }

    let registry = builtin_handlers(&config.name);
    let routes = if config.declared_routes.is_empty() {
        let ping = registry.get("ping").cloned().into_iter();
        ping.map(|handler| RouteDescriptor::new("GET", "/ping", handler)).collect()
    } else {
        registry.resolve(&config.declared_routes)
    };
    config.routes = Some(routes);

    let server = RouteServer::new(config)?;
    tracing::info!(routes = server.route_count(), "Routes registered");
    server.start().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
