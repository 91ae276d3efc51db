use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The `stores` table. Manager and pharmacist assignments are unique and
/// one-time: a staff member holds at most one store per role, enforced by
/// unique indexes and a Conflict on reassignment.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stores")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub store_name: String,
    pub location: String,
    #[sea_orm(unique)]
    pub manager_user_id: Option<i32>,
    #[sea_orm(unique)]
    pub pharmacist_user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rfqs::Entity")]
    Rfqs,
    #[sea_orm(has_one = "super::inventories::Entity")]
    Inventory,
    #[sea_orm(has_many = "super::stock_requests::Entity")]
    StockRequests,
}

impl Related<super::rfqs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rfqs.def()
    }
}

impl Related<super::inventories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
    }
}

impl Related<super::stock_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
