#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DATABASE_URL};
use configs::DatabaseConfig;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

fn test_config() -> DatabaseConfig {
    DatabaseConfig {
        url: DATABASE_URL.clone(),
        max_connections: 20,
        min_connections: 1,
        acquire_timeout_secs: 10,
        ..Default::default()
    }
}

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = test_config();
    MIGRATED
        .get_or_try_init(|| async {
            let db = connect_with_config(&cfg).await?;
            migration::Migrator::up(&db, None).await?;
            Ok::<(), anyhow::Error>(())
        })
        .await?;

    // Fresh connection for the current test's runtime
    connect_with_config(&cfg).await
}
