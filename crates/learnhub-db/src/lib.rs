//! Relational storage for courses, modules, quizzes and learner progress

pub mod entities;
pub mod migrator;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

/// Open a connection pool for `url` (postgres or sqlite).
///
/// In-memory SQLite databases are private to a single connection, so the pool
/// is pinned to one connection for them.
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url.to_owned());
    if url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }
    options.sqlx_logging(false);

    debug!("Opening database connection");
    Database::connect(options).await
}

/// Apply all pending migrations
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await?;
    info!("Database migrations applied");
    Ok(())
}
