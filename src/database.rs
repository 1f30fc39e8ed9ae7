use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, sqlx::SqlitePool};
use tracing::info;

/// Opens the database and brings the schema up to date.
pub async fn connect(db_url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(db_url);
    options.sqlx_logging(false);
    if db_url.contains(":memory:") {
        // Every in-memory connection would otherwise see its own empty database.
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    info!("Database migrations applied");

    Ok(db)
}

/// The sea-orm connection plus the raw pool underneath it, which the session
/// store shares.
pub async fn setup_database(db_url: &str) -> anyhow::Result<(DatabaseConnection, SqlitePool)> {
    let db = connect(db_url).await?;
    let pool = db.get_sqlite_connection_pool().clone();

    Ok((db, pool))
}
