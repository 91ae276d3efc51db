use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The `rfq_items` table. Items are exclusively owned by their RFQ and
/// replaced wholesale on update.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rfq_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub rfq_id: i32,
    pub medicine_name: String,
    pub quantity_needed: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rfqs::Entity",
        from = "Column::RfqId",
        to = "super::rfqs::Column::Id",
        on_delete = "Cascade"
    )]
    Rfq,
}

impl Related<super::rfqs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rfq.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
