//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, HttpTextProvider, MemoryStore},
    config::Config,
    error::ApiError,
    web::{build_router, ApiDoc, AppState},
};
use axum::Router;
use scripture_core::ports::{AnnotationStore, ReferenceStore, SessionStore, UserStore};
use scripture_core::service::BibleService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Storage ---
    let mut db_adapter = None;
    let (reference, annotations, users, sessions) = match &config.database_url {
        Some(url) => {
            info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(url)
                .await?;
            let db = Arc::new(DbAdapter::new(pool));
            info!("Running database migrations...");
            db.run_migrations().await?;
            db.seed_reference_data().await?;
            info!("Database ready.");
            db_adapter = Some(db.clone());
            split_ports(db)
        }
        None => {
            warn!("DATABASE_URL is not set; using a volatile in-memory store");
            split_ports(Arc::new(MemoryStore::with_canon()))
        }
    };

    // --- 3. Build the Core Service ---
    let text_provider = Arc::new(HttpTextProvider::new(
        config.text_provider_url.clone(),
        config.request_timeout,
    )?);
    let bible = BibleService::new(reference, annotations, users).with_text_provider(text_provider);

    let app_state = Arc::new(AppState {
        bible,
        sessions,
        config: config.clone(),
    });

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .merge(build_router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db_adapter {
        db.close().await;
    }
    info!("Server stopped.");
    Ok(())
}

type Ports = (
    Arc<dyn ReferenceStore>,
    Arc<dyn AnnotationStore>,
    Arc<dyn UserStore>,
    Arc<dyn SessionStore>,
);

/// Hands out one store behind each of the port traits it implements.
fn split_ports<S>(store: Arc<S>) -> Ports
where
    S: ReferenceStore + AnnotationStore + UserStore + SessionStore + 'static,
{
    (store.clone(), store.clone(), store.clone(), store)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
