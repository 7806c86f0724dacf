//! # Lurker Console Server
//!
//! The web front and capture ingest process for the lurker sniffer. This
//! binary composes two independent flows on a single runtime:
//!
//! - **Web front:** a small Axum application serving the index page, the
//!   user list, a liveness probe, and the static assets under `public/`.
//! - **Capture ingest:** a ZeroMQ subscriber receiving MessagePack encoded
//!   capture events from the sniffer daemon and persisting each one into
//!   the document store.
//!
//! The flows share nothing but the process lifetime: the front never reads
//! the captured data and the ingestor never touches HTTP state.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::response::{Html, Json};
use axum::routing::get;
use axum::Router;
use clap::Parser;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use lib_common::connections::db_mongo::MongoStore;
use lib_common::ingestors::lurker_mq::{LurkerMqConfig, LurkerMqIngestor};

/// Title rendered on the index page.
const PAGE_TITLE: &str = "Lurker";

/// # Application Configuration
///
/// Parsed from command-line arguments and environment variables using `clap`.
/// Defaults match the deployment next to a locally running sniffer daemon.
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Web front and capture ingest for the lurker sniffer."
)]
struct AppConfig {
    /// HTTP listener port. `--port` argument or `PORT` environment variable.
    #[clap(long, env = "PORT", default_value_t = 4000)]
    port: u16,

    /// ZeroMQ endpoint the sniffer publishes capture events on.
    #[clap(long, env = "MQ_ENDPOINT", default_value = "tcp://localhost:3000")]
    mq_endpoint: String,

    /// MongoDB connection string.
    #[clap(long, env = "MONGODB_URL", default_value = "mongodb://localhost:27017")]
    db_url: String,

    /// Directory served verbatim for static assets.
    #[clap(long, env = "STATIC_DIR", default_value = "public")]
    static_dir: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- Phase 1: Configuration Loading ---
    // A .env file next to the binary is honored but not required.
    dotenvy::dotenv().ok();
    let config = AppConfig::parse();

    // --- Phase 2: Logging Setup ---
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // --- Phase 3: Capture Ingest ---
    // The store client connects lazily; an unreachable server is reported
    // but never blocks startup. The ingest loop owns reconnection.
    let store = Arc::new(MongoStore::connect(&config.db_url).await?);
    if let Err(e) = store.ping().await {
        warn!("Document store not reachable yet: {}", e);
    }

    let ingest_config = LurkerMqConfig {
        endpoint: config.mq_endpoint.clone(),
        ..Default::default()
    };
    let ingestor = LurkerMqIngestor::new(ingest_config, store);
    let ingest_task = tokio::spawn(async move { ingestor.run().await });

    // --- Phase 4: Router Construction ---
    // Unmatched paths fall through to the static asset directory.
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/users", get(users_handler))
        .route("/health", get(health_handler))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http());

    // --- Phase 5: Server Binding and Signal Handling ---
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Console server listening on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The ingest loop never returns on its own; stop it with the server.
    warn!("Shutdown signal received. Stopping capture ingest...");
    ingest_task.abort();

    Ok(())
}

/// # Index Handler
///
/// Renders the index view with no dynamic parameters.
async fn index_handler() -> Html<String> {
    Html(render_index(PAGE_TITLE))
}

/// Renders the index page markup. The stylesheet is resolved against the
/// static asset directory served by the fallback.
fn render_index(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <title>{title}</title>\n    \
         <link rel=\"stylesheet\" href=\"/stylesheets/style.css\">\n  </head>\n  \
         <body>\n    <h1>{title}</h1>\n    <p>Welcome to {title}</p>\n  </body>\n</html>\n"
    )
}

/// # User List Handler
///
/// Returns the user list payload. The console has no user store, so the
/// list is a static empty array.
async fn users_handler() -> Json<Vec<serde_json::Value>> {
    Json(Vec::new())
}

/// # Health Check Endpoint
///
/// A simple HTTP GET endpoint that returns "OK". Used by monitoring
/// services to verify that the process is running and responsive.
async fn health_handler() -> &'static str {
    "OK"
}

/// # Graceful Shutdown Signal Handler
///
/// Listens for `CTRL+C` (interrupt) and `SIGTERM` (terminate) signals to
/// initiate a graceful shutdown of the server. On non-UNIX systems only
/// `CTRL+C` is handled.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_renders_title_and_stylesheet() {
        let html = render_index(PAGE_TITLE);
        assert!(html.contains("<h1>Lurker</h1>"));
        assert!(html.contains("Welcome to Lurker"));
        assert!(html.contains("/stylesheets/style.css"));
    }

    #[tokio::test]
    async fn users_payload_is_an_empty_list() {
        let Json(users) = users_handler().await;
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        assert_eq!(health_handler().await, "OK");
    }

    #[test]
    fn config_defaults_match_the_deployment() {
        let config = AppConfig::parse_from(["server_console"]);
        assert_eq!(config.port, 4000);
        assert_eq!(config.mq_endpoint, "tcp://localhost:3000");
        assert_eq!(config.db_url, "mongodb://localhost:27017");
        assert_eq!(config.static_dir, "public");
    }
}
