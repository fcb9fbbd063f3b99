use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use petwatch_api::retry::RetryPolicy;
use petwatch_api::routes;
use petwatch_api::{CompanionService, ServiceConfig};
use petwatch_sim::SimConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "petwatch=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("PETWATCH_DB_PATH").unwrap_or_else(|_| "petwatch.db".into());
    let host = std::env::var("PETWATCH_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PETWATCH_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    let sim = match std::env::var("PETWATCH_CONFIG") {
        Ok(path) => {
            info!("Loading simulation config from {}", path);
            SimConfig::load(&PathBuf::from(path))?
        }
        Err(_) => SimConfig::default(),
    };
    sim.validate()?;

    let mut retry = RetryPolicy::default();
    if let Ok(raw) = std::env::var("PETWATCH_STORE_RETRIES") {
        retry.max_attempts = raw.parse()?;
    }
    if let Ok(raw) = std::env::var("PETWATCH_STORE_TIMEOUT_MS") {
        retry.timeout_ms = raw.parse()?;
    }
    let service_config = ServiceConfig {
        retry,
        ..ServiceConfig::default()
    };

    // Init database
    let db = Arc::new(petwatch_db::Database::open(&PathBuf::from(&db_path))?);

    let service = Arc::new(CompanionService::new(db, sim).with_config(service_config));

    let app = Router::new()
        .merge(routes::router(service))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Petwatch server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
