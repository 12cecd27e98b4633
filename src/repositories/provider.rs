//! Provider repository for database operations
//!
//! Each method issues one parameterized statement (plus a re-fetch where the
//! caller needs the stored row back). Nothing spans a transaction; concurrent
//! writes to the same id are settled by the storage engine.

use chrono::Utc;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};

use crate::models::provider::{self, Entity as Provider};

/// Validated provider fields, ready to be written.
///
/// Used for both inserts and full replacements; defaults have already been
/// applied by the time one of these exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProvider {
    pub name: String,
    pub wait_time: i16,
    pub visible: bool,
    pub show_wait_time: bool,
}

/// Repository for provider database operations
pub struct ProviderRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ProviderRepository<'a> {
    /// Create a new ProviderRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists every provider in storage order
    pub async fn list_all(&self) -> Result<Vec<provider::Model>, DbErr> {
        Provider::find().all(self.db).await
    }

    /// Finds a provider by id
    pub async fn find_by_id(&self, id: i32) -> Result<Option<provider::Model>, DbErr> {
        Provider::find_by_id(id).one(self.db).await
    }

    /// Inserts a provider and returns the stored row, including the
    /// server-assigned id and timestamps.
    pub async fn create(&self, input: NewProvider) -> Result<provider::Model, DbErr> {
        let now = Utc::now();
        let active_model = provider::ActiveModel {
            id: NotSet,
            name: Set(input.name),
            wait_time: Set(input.wait_time),
            visible: Set(input.visible),
            show_wait_time: Set(input.show_wait_time),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let id = Provider::insert(active_model)
            .exec(self.db)
            .await?
            .last_insert_id;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbErr::Custom(format!("provider {} not persisted", id)))
    }

    /// Replaces every mutable field of the provider with `id`.
    ///
    /// Returns `Ok(None)` when no such provider exists. The row is re-fetched
    /// rather than trusting the affected-row count, which MySQL reports as zero
    /// when the new values equal the old ones.
    pub async fn replace(
        &self,
        id: i32,
        input: NewProvider,
    ) -> Result<Option<provider::Model>, DbErr> {
        Provider::update_many()
            .col_expr(provider::Column::Name, Expr::value(input.name))
            .col_expr(provider::Column::WaitTime, Expr::value(input.wait_time))
            .col_expr(provider::Column::Visible, Expr::value(input.visible))
            .col_expr(
                provider::Column::ShowWaitTime,
                Expr::value(input.show_wait_time),
            )
            .col_expr(provider::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(provider::Column::Id.eq(id))
            .exec(self.db)
            .await?;

        self.find_by_id(id).await
    }

    /// Deletes the provider with `id`.
    ///
    /// Returns `false` when no row matched.
    pub async fn delete(&self, id: i32) -> Result<bool, DbErr> {
        let result = Provider::delete_by_id(id).exec(self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
