//! Database migrations for the waiting-room API.
//!
//! The schema is a single table; the migrator is run on every startup and is
//! idempotent.

pub use sea_orm_migration::prelude::*;

mod m2026_10_19_000001_create_providers;

pub use m2026_10_19_000001_create_providers::NAME_MAX_LEN;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m2026_10_19_000001_create_providers::Migration)]
    }
}
