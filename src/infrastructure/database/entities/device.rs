//! IoT device entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "devices")]
pub struct Model {
    /// Identifier reported by the device
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Hardware description, e.g. "Raspberry Pi 5"
    pub specification: String,

    pub is_working: bool,
    pub registered_at: DateTime<Utc>,

    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
