use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trip_backend::{
    config::ServerConfig,
    create_router,
    database::{Database, HistoryStore},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "trip_backend=debug,tower_http=info,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    config.planner.warn_missing_keys();

    let planner = config.planner.build_planner()?;
    let history = connect_history(config.database_url.as_deref()).await;

    let mut state = AppState::new(planner, history);
    state.history_limit = config.history_limit;
    let app = create_router(state);

    let addr = config.bind_addr;
    tracing::info!("Starting trip planner on http://{addr}");
    tracing::info!("  POST /plan_viagem - Plan a trip");
    tracing::info!("  GET /historico - List previous trips");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// The store is optional: any failure here leaves the server stateless.
async fn connect_history(database_url: Option<&str>) -> Option<Arc<dyn HistoryStore>> {
    let db = match Database::new(database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::warn!("PostgreSQL not available: {}", e);
            tracing::warn!("Trip history disabled; GET /historico will answer 503.");
            return None;
        }
    };

    if let Err(e) = db.migrate().await {
        tracing::error!("Failed to run migrations: {}", e);
        tracing::warn!("Trip history disabled; GET /historico will answer 503.");
        return None;
    }

    tracing::info!("PostgreSQL connected, trip history enabled");
    Some(Arc::new(db))
}
