//! Provider entity model
//!
//! SeaORM entity for the `providers` table: a clinic or service provider with
//! the wait time shown to people in the waiting room.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;

/// Smallest accepted wait time, in minutes.
pub const MIN_WAIT_TIME: i16 = 0;

/// Largest accepted wait time, in minutes (half a day).
pub const MAX_WAIT_TIME: i16 = 480;

/// Provider entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "providers")]
pub struct Model {
    /// Server-assigned identifier, never reused for another provider
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Display name of the provider
    pub name: String,

    /// Expected wait in minutes, within `MIN_WAIT_TIME..=MAX_WAIT_TIME`
    pub wait_time: i16,

    /// Whether the provider is shown to end users at all
    pub visible: bool,

    /// Whether the wait-time figure is displayed
    pub show_wait_time: bool,

    /// Timestamp when the provider was created
    pub created_at: DateTimeUtc,

    /// Timestamp when the provider was last updated
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
