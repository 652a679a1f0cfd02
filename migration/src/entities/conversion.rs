//! Conversion entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "conversions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub contact_id: String,
    /// Attributed tracking code, None when no clicked link matched
    pub tracking_id: Option<String>,
    pub conversion_type: String,
    pub created_at: DateTimeUtc,
    /// Serialized JSON metadata (appointment id + raw webhook payload)
    #[sea_orm(column_type = "Text", nullable)]
    pub metadata: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
