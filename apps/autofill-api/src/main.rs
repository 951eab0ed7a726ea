//! Compliance autofill API server
//!
//! A thin backend for a compliance review UI:
//!
//! - `/autofill` and `/autofill-from-pdf` forward advisor notes or uploaded
//!   PDFs to a hosted extraction model and return normalized field/value/
//!   explanation mappings
//! - `/api/review/*` drive in-memory, save-gated review sessions over an
//!   extraction result
//! - `/docs/reload` re-reads the policy chunk index without a restart
//!
//! Nothing is persisted; sessions and the chunk corpus live in process
//! memory only.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod error;
mod extraction;
mod handlers;
mod llm;
mod models;
mod pdf;
mod prompt;
mod recovery;
mod retrieval;
mod review;
mod state;
#[cfg(test)]
mod tests;

use state::AppState;

/// Origins the review frontend is served from during development
const ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:3000",
];

/// Command-line arguments for the autofill API server
#[derive(Parser, Debug)]
#[command(name = "autofill-api")]
#[command(about = "Compliance autofill backend")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let origins = ALLOWED_ORIGINS
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        // Basic endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/health/model", post(handlers::model_health))
        // Extraction
        .route("/autofill", post(handlers::autofill))
        .route("/autofill-from-pdf", post(handlers::autofill_from_pdf))
        .route("/docs/reload", post(handlers::reload_docs))
        // Review sessions
        .route("/api/review", post(review::create_review))
        .route("/api/review/:id", get(review::get_review))
        .route("/api/review/:id/edit", post(review::edit_review))
        .route("/api/review/:id/clear", post(review::clear_review))
        .route("/api/review/:id/save", post(review::save_review))
        .route("/api/review/:id/next", post(review::next_review))
        .route("/api/review/:id/back", post(review::back_review))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load .env file if present
    dotenvy::dotenv().ok();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Initializing autofill API...");
    let state = Arc::new(AppState::from_env()?);
    let app = router(state)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
