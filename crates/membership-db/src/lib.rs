//! Relational storage for the membership-management API
//!
//! SeaORM entities for the Team and User resources plus the migrations that
//! create their schema. The database owns the canonical stored state of both
//! entities; in-memory models handed to the services are transient working
//! copies for the duration of one request.

pub mod entities;
pub mod migrator;

use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::debug;

/// Open a connection to the given database URL.
///
/// Supports the same backends as the server flags: PostgreSQL
/// (`postgres://...`), file SQLite (`sqlite://./membership.db?mode=rwc`) and
/// in-memory SQLite (`sqlite::memory:`).
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    debug!("Connecting to database: {}", url);
    Database::connect(url).await
}

/// Bring the schema up to date by applying all pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    debug!("Running database migrations");
    migrator::Migrator::up(db, None).await
}
