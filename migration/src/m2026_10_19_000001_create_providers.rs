//! Migration to create the providers table.
//!
//! Creates the waiting-room `providers` table if it is not already present.
//! Running it against a database that already has the table is a no-op.

use sea_orm_migration::prelude::*;

/// Longest name the `name` column can hold.
pub const NAME_MAX_LEN: u32 = 255;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Providers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Providers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Providers::Name)
                            .string_len(NAME_MAX_LEN)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Providers::WaitTime)
                            .small_integer()
                            .not_null()
                            .check(Expr::col(Providers::WaitTime).between(0, 480)),
                    )
                    .col(
                        ColumnDef::new(Providers::Visible)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Providers::ShowWaitTime)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Providers::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Providers::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Providers::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Providers {
    Table,
    Id,
    Name,
    WaitTime,
    Visible,
    ShowWaitTime,
    CreatedAt,
    UpdatedAt,
}
