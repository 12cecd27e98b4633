//! Test utilities for database testing.
//!
//! Sets up in-memory SQLite databases with migrations applied.

use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Inserts a provider row directly, bypassing API validation.
#[allow(dead_code)]
pub async fn insert_provider_row(
    db: &DatabaseConnection,
    name: &str,
    wait_time: i64,
) -> Result<()> {
    use sea_orm::Value;
    let stmt = Statement::from_sql_and_values(
        db.get_database_backend(),
        "INSERT INTO providers (name, wait_time, visible, show_wait_time) VALUES (?, ?, 1, 1)",
        vec![
            Value::String(Some(Box::new(name.to_string()))),
            Value::BigInt(Some(wait_time)),
        ],
    );
    db.execute(stmt).await?;
    Ok(())
}
