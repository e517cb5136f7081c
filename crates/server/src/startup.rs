use std::net::SocketAddr;

use axum::Router;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::AppConfig;
use models::db::{connect_with_config, DatabaseConfig};
use service::seed::DataInitializer;

use crate::auth::ServerState;
use crate::errors::StartupError;
use crate::routes;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {}", e)))
}

/// Router over an already-migrated database.
pub fn build_app(db: DatabaseConnection, cfg: &AppConfig) -> Router {
    let state = ServerState::new(db, cfg.jwt.clone(), cfg.server.secure_cookies);
    routes::build_router(state, build_cors())
}

/// Connect, migrate, seed the default super admin, then serve until the
/// listener fails.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = connect_with_config(&DatabaseConfig::from_app_config(&cfg.database)).await?;

    migration::Migrator::up(&db, None).await?;
    info!(service = "server", event = "migrations_applied", "database schema up to date");

    let seeded = DataInitializer::new(db.clone(), cfg.admin.clone()).ensure_seeded().await?;
    info!(service = "server", event = "seed_checked", outcome = ?seeded, "default super admin checked");

    let app = build_app(db, &cfg);

    let addr = bind_addr(&cfg)?;
    info!(service = "server", event = "listening", %addr, "starting http server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
