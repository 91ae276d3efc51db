use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Enum representing the lifecycle states of a Request for Quotation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RfqStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "ISSUED")]
    Issued,
    #[sea_orm(string_value = "CLOSED")]
    Closed,
    #[sea_orm(string_value = "AWARDED")]
    Awarded,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// The `rfqs` table. `awarded_vendor_id` and `awarded_bid_id` are set only by
/// the award operation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rfqs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub store_id: i32,
    pub created_by: i32,
    pub status: RfqStatus,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    #[sea_orm(column_type = "Text", nullable)]
    pub special_instructions: Option<String>,
    pub awarded_vendor_id: Option<i32>,
    pub awarded_bid_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stores::Entity",
        from = "Column::StoreId",
        to = "super::stores::Column::Id"
    )]
    Store,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(
        belongs_to = "super::vendors::Entity",
        from = "Column::AwardedVendorId",
        to = "super::vendors::Column::Id"
    )]
    AwardedVendor,
    #[sea_orm(has_many = "super::rfq_items::Entity")]
    Items,
    #[sea_orm(has_many = "super::bids::Entity")]
    Bids,
}

impl Related<super::stores::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Store.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::rfq_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
