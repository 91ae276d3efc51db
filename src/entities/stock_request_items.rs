use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_request_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub stock_request_id: i32,
    pub medicine_name: String,
    pub required_quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_requests::Entity",
        from = "Column::StockRequestId",
        to = "super::stock_requests::Column::Id",
        on_delete = "Cascade"
    )]
    StockRequest,
}

impl Related<super::stock_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
