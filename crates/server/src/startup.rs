use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use migration::{Migrator, MigratorTrait};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use configs::AppConfig;
use service::catalog::{repo::seaorm::SeaOrmCatalogRepository, CatalogService};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// `config.toml` first, then `SERVER_HOST`/`SERVER_PORT`/`DATABASE_URL`.
fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            warn!(error = %e, "config.toml unavailable, falling back to environment");
            AppConfig::from_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
        }
    }
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e: std::net::AddrParseError| StartupError::InvalidConfig(e.to_string()))
}

/// Wire repositories into the service and the service into the router.
pub fn build_app(catalog: CatalogService, cfg: &AppConfig) -> Router {
    let state = AppState::new(catalog);
    routes::build_router(state, build_cors(), Duration::from_secs(cfg.server.request_timeout_secs))
}

/// Public entry: connect, migrate, and serve until the listener fails.
pub async fn run() -> anyhow::Result<()> {
    let cfg = load_config()?;

    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    Migrator::up(&db, None).await.map_err(|e| StartupError::Database(e.to_string()))?;
    info!(event = "migrations_applied", "database schema up to date");

    let repo = Arc::new(SeaOrmCatalogRepository { db });
    let catalog = CatalogService::new(repo.clone(), repo.clone(), repo);
    let app = build_app(catalog, &cfg);

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting catalog server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
