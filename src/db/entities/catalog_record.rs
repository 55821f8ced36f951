//! Catalog record entity (products table)

use sea_orm::entity::prelude::*;

/// A sellable catalog item. `image_url` is either a `/uploads/<name>`
/// reference into the local asset store, an external absolute URL, or null.
/// `features` holds a JSON array of strings.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub category: String,
    pub image_url: Option<String>,
    pub features: String,
    pub rating: f64,
    pub reviews_count: i32,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_record::Entity")]
    Orders,
}

impl Related<super::order_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
