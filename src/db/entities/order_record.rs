//! Order record entity (orders table)

use sea_orm::entity::prelude::*;

/// A customer order. `standard` orders reference a catalog record through
/// `product_id`; `custom` orders carry a free-text description instead.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub order_type: String,
    pub product_id: Option<i32>,
    pub custom_description: Option<String>,
    pub quantity: i32,
    pub total_price: i64,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::catalog_record::Entity",
        from = "Column::ProductId",
        to = "super::catalog_record::Column::Id"
    )]
    Product,
}

impl Related<super::catalog_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
