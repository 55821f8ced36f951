//! Order intake and administration.
//!
//! A `standard` order references an active catalog record at creation time
//! and derives its total from the record's price; a `custom` order carries a
//! free-text description and is priced after consultation. Status moves
//! through an enforced state machine; terminal states accept no further
//! transitions.

use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::db::entities::{catalog_record, order_record};
use crate::db::now_secs;
use crate::error::{FieldError, Result, ServiceError};
use crate::fields;

/// Base estimate per unit for custom work, in minor currency units. The
/// final price is set by an administrator after design consultation.
pub const CUSTOM_BASE_PRICE: i64 = 150_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderKind {
    Standard,
    Custom,
}

impl OrderKind {
    pub const ALL: &'static [&'static str] = &["standard", "custom"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Standard => "standard",
            OrderKind::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(OrderKind::Standard),
            "custom" => Some(OrderKind::Custom),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: &'static [&'static str] =
        &["pending", "confirmed", "processing", "completed", "cancelled"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "processing" => Some(OrderStatus::Processing),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Legal successor states. Empty for terminal states.
    pub fn successors(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
            OrderStatus::Confirmed => &[OrderStatus::Processing, OrderStatus::Cancelled],
            OrderStatus::Processing => &[OrderStatus::Completed, OrderStatus::Cancelled],
            OrderStatus::Completed | OrderStatus::Cancelled => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.successors().contains(&next)
    }
}

/// Display order number, e.g. `BW000042`.
pub fn order_number(id: i32) -> String {
    format!("BW{:06}", id)
}

/// Validated input for order creation.
#[derive(Clone, Debug)]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub kind: OrderKind,
    pub product_id: Option<i32>,
    pub custom_description: Option<String>,
    pub quantity: i32,
    pub notes: Option<String>,
}

impl OrderDraft {
    pub fn from_raw(raw: &Map<String, Value>) -> Result<Self> {
        let mut errors = Vec::new();

        let customer_name = match fields::coerce_text("customer_name", raw.get("customer_name")) {
            Ok(Some(v)) => Some(v),
            Ok(None) => {
                errors.push(FieldError::new("customer_name", "(absent)", "non-empty string"));
                None
            }
            Err(e) => {
                errors.push(e);
                None
            }
        };
        let customer_phone =
            match fields::coerce_text("customer_phone", raw.get("customer_phone")) {
                Ok(Some(v)) => Some(v),
                Ok(None) => {
                    errors.push(FieldError::new(
                        "customer_phone",
                        "(absent)",
                        "non-empty string",
                    ));
                    None
                }
                Err(e) => {
                    errors.push(e);
                    None
                }
            };
        let customer_email = match fields::coerce_text("customer_email", raw.get("customer_email"))
        {
            Ok(Some(v)) if !v.contains('@') => {
                errors.push(FieldError::new(
                    "customer_email",
                    format!("\"{}\"", v),
                    "email address",
                ));
                None
            }
            Ok(v) => v,
            Err(e) => {
                errors.push(e);
                None
            }
        };
        let customer_address = fields::coerce_text("customer_address", raw.get("customer_address"))
            .unwrap_or_else(|e| {
                errors.push(e);
                None
            });
        let kind = match fields::coerce_enum("order_type", raw.get("order_type"), OrderKind::ALL) {
            Ok(Some(s)) => OrderKind::parse(&s),
            Ok(None) => {
                errors.push(FieldError::new(
                    "order_type",
                    "(absent)",
                    format!("one of {}", OrderKind::ALL.join(", ")),
                ));
                None
            }
            Err(e) => {
                errors.push(e);
                None
            }
        };
        let product_id = fields::coerce_int("product_id", raw.get("product_id"), 1)
            .unwrap_or_else(|e| {
                errors.push(e);
                None
            })
            .map(|v| v as i32);
        let custom_description =
            fields::coerce_text("custom_description", raw.get("custom_description"))
                .unwrap_or_else(|e| {
                    errors.push(e);
                    None
                });
        let quantity = fields::coerce_int("quantity", raw.get("quantity"), 1)
            .unwrap_or_else(|e| {
                errors.push(e);
                None
            })
            .map(|v| v as i32)
            .unwrap_or(1);
        let notes = fields::coerce_text("notes", raw.get("notes")).unwrap_or_else(|e| {
            errors.push(e);
            None
        });

        // Cross-field requirements per order kind. Skip when the field
        // already failed coercion; one detail per field is enough.
        match kind {
            Some(OrderKind::Standard)
                if product_id.is_none() && errors.iter().all(|e| e.field != "product_id") =>
            {
                errors.push(FieldError::new(
                    "product_id",
                    "(absent)",
                    "catalog record id for standard orders",
                ));
            }
            Some(OrderKind::Custom)
                if custom_description.is_none()
                    && errors.iter().all(|e| e.field != "custom_description") =>
            {
                errors.push(FieldError::new(
                    "custom_description",
                    "(absent)",
                    "description for custom orders",
                ));
            }
            _ => {}
        }

        match (customer_name, customer_phone, kind) {
            (Some(customer_name), Some(customer_phone), Some(kind)) if errors.is_empty() => {
                Ok(Self {
                    customer_name,
                    customer_phone,
                    customer_email,
                    customer_address,
                    kind,
                    product_id,
                    custom_description,
                    quantity,
                    notes,
                })
            }
            _ => Err(ServiceError::Validation(errors)),
        }
    }
}

/// Sparse field assignments for an order update, same compilation contract
/// as the catalog patch.
#[derive(Clone, Debug, Default)]
pub struct OrderPatch {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub quantity: Option<i32>,
    pub total_price: Option<i64>,
    pub notes: Option<String>,
}

impl OrderPatch {
    pub fn from_raw(raw: &Map<String, Value>) -> Result<Self> {
        let mut errors = Vec::new();
        let mut patch = Self::default();

        match fields::coerce_text("customer_name", raw.get("customer_name")) {
            Ok(v) => patch.customer_name = v,
            Err(e) => errors.push(e),
        }
        match fields::coerce_text("customer_phone", raw.get("customer_phone")) {
            Ok(v) => patch.customer_phone = v,
            Err(e) => errors.push(e),
        }
        match fields::coerce_text("customer_email", raw.get("customer_email")) {
            Ok(Some(v)) if !v.contains('@') => errors.push(FieldError::new(
                "customer_email",
                format!("\"{}\"", v),
                "email address",
            )),
            Ok(v) => patch.customer_email = v,
            Err(e) => errors.push(e),
        }
        match fields::coerce_text("customer_address", raw.get("customer_address")) {
            Ok(v) => patch.customer_address = v,
            Err(e) => errors.push(e),
        }
        match fields::coerce_int("quantity", raw.get("quantity"), 1) {
            Ok(v) => patch.quantity = v.map(|q| q as i32),
            Err(e) => errors.push(e),
        }
        match fields::coerce_int("total_price", raw.get("total_price"), 0) {
            Ok(v) => patch.total_price = v,
            Err(e) => errors.push(e),
        }
        match fields::coerce_text("notes", raw.get("notes")) {
            Ok(v) => patch.notes = v,
            Err(e) => errors.push(e),
        }

        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none()
            && self.customer_phone.is_none()
            && self.customer_email.is_none()
            && self.customer_address.is_none()
            && self.quantity.is_none()
            && self.total_price.is_none()
            && self.notes.is_none()
    }

    fn compile(&self, now: i64) -> Result<(order_record::ActiveModel, Vec<&'static str>)> {
        if self.is_empty() {
            return Err(ServiceError::NothingToUpdate);
        }

        let mut model = <order_record::ActiveModel as sea_orm::ActiveModelTrait>::default();
        let mut columns = Vec::new();

        if let Some(v) = &self.customer_name {
            model.customer_name = Set(v.clone());
            columns.push("customer_name");
        }
        if let Some(v) = &self.customer_phone {
            model.customer_phone = Set(v.clone());
            columns.push("customer_phone");
        }
        if let Some(v) = &self.customer_email {
            model.customer_email = Set(Some(v.clone()));
            columns.push("customer_email");
        }
        if let Some(v) = &self.customer_address {
            model.customer_address = Set(Some(v.clone()));
            columns.push("customer_address");
        }
        if let Some(v) = self.quantity {
            model.quantity = Set(v);
            columns.push("quantity");
        }
        if let Some(v) = self.total_price {
            model.total_price = Set(v);
            columns.push("total_price");
        }
        if let Some(v) = &self.notes {
            model.notes = Set(Some(v.clone()));
            columns.push("notes");
        }

        model.updated_at = Set(now);
        Ok((model, columns))
    }
}

/// Caller-visible view of an order row.
#[derive(Clone, Debug, Serialize)]
pub struct OrderView {
    pub id: i32,
    pub order_number: String,
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

impl From<order_record::Model> for OrderView {
    fn from(model: order_record::Model) -> Self {
        Self {
            order_number: order_number(model.id),
            id: model.id,
            customer_name: model.customer_name,
            customer_phone: model.customer_phone,
            customer_email: model.customer_email,
            customer_address: model.customer_address,
            order_type: model.order_type,
            product_id: model.product_id,
            custom_description: model.custom_description,
            quantity: model.quantity,
            total_price: model.total_price,
            status: model.status,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Price quote for a prospective order; computing one has no side effects.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Quote {
    Standard {
        product_name: String,
        unit_price: i64,
        quantity: i32,
        total_price: i64,
        savings: i64,
    },
    Custom {
        description: Option<String>,
        quantity: i32,
        estimated_price: i64,
        note: &'static str,
    },
}

/// Input for a quote; a subset of the order draft.
#[derive(Clone, Debug)]
pub struct QuoteRequest {
    pub kind: OrderKind,
    pub product_id: Option<i32>,
    pub custom_description: Option<String>,
    pub quantity: i32,
}

pub struct OrderService {
    db: DatabaseConnection,
}

impl OrderService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: i32) -> Result<OrderView> {
        let model = order_record::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound("order"))?;
        Ok(model.into())
    }

    /// Create an order. A standard order's product reference must resolve to
    /// an active catalog record now; the total is derived from its price.
    pub async fn create(&self, draft: OrderDraft) -> Result<OrderView> {
        let total_price = match draft.kind {
            OrderKind::Standard => {
                let product = self
                    .resolve_active_product(draft.product_id)
                    .await?;
                product.price * draft.quantity as i64
            }
            OrderKind::Custom => 0,
        };

        let now = now_secs();
        let model = order_record::ActiveModel {
            customer_name: Set(draft.customer_name),
            customer_phone: Set(draft.customer_phone),
            customer_email: Set(draft.customer_email),
            customer_address: Set(draft.customer_address),
            order_type: Set(draft.kind.as_str().to_string()),
            product_id: Set(match draft.kind {
                OrderKind::Standard => draft.product_id,
                OrderKind::Custom => None,
            }),
            custom_description: Set(draft.custom_description),
            quantity: Set(draft.quantity),
            total_price: Set(total_price),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            notes: Set(draft.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = model.insert(&self.db).await?;
        tracing::info!("Created order {}", order_number(inserted.id));
        Ok(inserted.into())
    }

    /// Price the same inputs as [`create`](Self::create) without writing
    /// anything.
    pub async fn quote(&self, request: QuoteRequest) -> Result<Quote> {
        match request.kind {
            OrderKind::Standard => {
                let product = self.resolve_active_product(request.product_id).await?;
                let total_price = product.price * request.quantity as i64;
                let savings = product
                    .original_price
                    .map(|original| (original - product.price) * request.quantity as i64)
                    .unwrap_or(0);
                Ok(Quote::Standard {
                    product_name: product.name,
                    unit_price: product.price,
                    quantity: request.quantity,
                    total_price,
                    savings,
                })
            }
            OrderKind::Custom => Ok(Quote::Custom {
                description: request.custom_description,
                quantity: request.quantity,
                estimated_price: CUSTOM_BASE_PRICE * request.quantity as i64,
                note: "Final price is confirmed after design consultation",
            }),
        }
    }

    async fn resolve_active_product(
        &self,
        product_id: Option<i32>,
    ) -> Result<catalog_record::Model> {
        let id = product_id.ok_or_else(|| {
            ServiceError::Validation(vec![FieldError::new(
                "product_id",
                "(absent)",
                "catalog record id for standard orders",
            )])
        })?;
        catalog_record::Entity::find_by_id(id)
            .filter(catalog_record::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound("product"))
    }

    /// Move an order through the status machine. Illegal transitions fail
    /// naming the legal successors of the current state.
    pub async fn set_status(
        &self,
        id: i32,
        status: &str,
        notes: Option<String>,
    ) -> Result<OrderView> {
        let next = OrderStatus::parse(status).ok_or_else(|| {
            ServiceError::Validation(vec![FieldError::new(
                "status",
                format!("\"{}\"", status),
                format!("one of {}", OrderStatus::ALL.join(", ")),
            )])
        })?;

        let existing = order_record::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound("order"))?;

        let current = OrderStatus::parse(&existing.status).ok_or_else(|| {
            sea_orm::DbErr::Custom(format!(
                "order {} has corrupt status {:?}",
                id, existing.status
            ))
        })?;

        if !current.can_transition_to(next) {
            let legal = current
                .successors()
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>();
            let expected = if legal.is_empty() {
                format!("no transition ({} is terminal)", current.as_str())
            } else {
                format!("one of {} (from {})", legal.join(", "), current.as_str())
            };
            return Err(ServiceError::Validation(vec![FieldError::new(
                "status",
                next.as_str(),
                expected,
            )]));
        }

        let mut model = order_record::ActiveModel {
            status: Set(next.as_str().to_string()),
            updated_at: Set(now_secs()),
            ..Default::default()
        };
        if let Some(notes) = notes {
            model.notes = Set(Some(notes));
        }

        order_record::Entity::update_many()
            .set(model)
            .filter(order_record::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        tracing::info!(
            "Order {} status: {} -> {}",
            order_number(id),
            current.as_str(),
            next.as_str()
        );
        self.get(id).await
    }

    /// Apply a partial update to an order row.
    pub async fn update(&self, id: i32, patch: OrderPatch) -> Result<Vec<&'static str>> {
        order_record::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound("order"))?;

        let (model, columns) = patch.compile(now_secs())?;

        let result = order_record::Entity::update_many()
            .set(model)
            .filter(order_record::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("order"));
        }

        Ok(columns)
    }

    /// Hard-delete an order. Orders have no dependents, so no guard applies.
    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = order_record::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("order"));
        }
        tracing::info!("Deleted order {}", order_number(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogDraft, CatalogService};
    use crate::db;
    use sea_orm::PaginatorTrait;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn setup() -> (OrderService, CatalogService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let conn = db::init_database(&temp_dir.path().join("test.db"))
            .await
            .unwrap();
        let assets = Arc::new(crate::assets::LocalAssetStore::new(
            temp_dir.path().join("uploads"),
        ));
        (
            OrderService::new(conn.clone()),
            CatalogService::new(conn, assets),
            temp_dir,
        )
    }

    async fn seed_product(catalog: &CatalogService, price: i64) -> i32 {
        let draft = CatalogDraft::from_raw(
            json!({ "name": "Premium bucket", "price": price, "category": "bucket" })
                .as_object()
                .unwrap(),
        )
        .unwrap();
        catalog.create(draft, None).await.unwrap().id
    }

    fn standard_draft(product_id: i32, quantity: i32) -> OrderDraft {
        OrderDraft::from_raw(
            json!({
                "customer_name": "Ayu",
                "customer_phone": "0812000111",
                "order_type": "standard",
                "product_id": product_id,
                "quantity": quantity,
            })
            .as_object()
            .unwrap(),
        )
        .unwrap()
    }

    async fn order_count(orders: &OrderService) -> u64 {
        order_record::Entity::find().count(&orders.db).await.unwrap()
    }

    #[tokio::test]
    async fn standard_order_totals_price_times_quantity() {
        let (orders, catalog, _guard) = setup().await;
        let product_id = seed_product(&catalog, 150000).await;

        let view = orders.create(standard_draft(product_id, 3)).await.unwrap();
        assert_eq!(view.total_price, 450000);
        assert_eq!(view.status, "pending");
        assert_eq!(view.order_number, format!("BW{:06}", view.id));
    }

    #[tokio::test]
    async fn quote_matches_create_without_side_effects() {
        let (orders, catalog, _guard) = setup().await;
        let product_id = seed_product(&catalog, 150000).await;

        let quote = orders
            .quote(QuoteRequest {
                kind: OrderKind::Standard,
                product_id: Some(product_id),
                custom_description: None,
                quantity: 3,
            })
            .await
            .unwrap();
        let Quote::Standard { total_price, unit_price, .. } = quote else {
            panic!("expected standard quote");
        };
        assert_eq!(total_price, 450000);
        assert_eq!(unit_price, 150000);
        assert_eq!(order_count(&orders).await, 0);

        let view = orders.create(standard_draft(product_id, 3)).await.unwrap();
        assert_eq!(view.total_price, total_price);
    }

    #[tokio::test]
    async fn quote_reports_savings_against_original_price() {
        let (orders, catalog, _guard) = setup().await;
        let draft = CatalogDraft::from_raw(
            json!({
                "name": "Bucket",
                "price": 120000,
                "original_price": 150000,
                "category": "bucket",
            })
            .as_object()
            .unwrap(),
        )
        .unwrap();
        let product_id = catalog.create(draft, None).await.unwrap().id;

        let quote = orders
            .quote(QuoteRequest {
                kind: OrderKind::Standard,
                product_id: Some(product_id),
                custom_description: None,
                quantity: 2,
            })
            .await
            .unwrap();
        let Quote::Standard { savings, .. } = quote else {
            panic!("expected standard quote");
        };
        assert_eq!(savings, 60000);
    }

    #[tokio::test]
    async fn custom_quote_uses_base_estimate() {
        let (orders, _catalog, _guard) = setup().await;
        let quote = orders
            .quote(QuoteRequest {
                kind: OrderKind::Custom,
                product_id: None,
                custom_description: Some("Graduation arch".to_string()),
                quantity: 2,
            })
            .await
            .unwrap();
        let Quote::Custom { estimated_price, .. } = quote else {
            panic!("expected custom quote");
        };
        assert_eq!(estimated_price, 300000);
    }

    #[tokio::test]
    async fn standard_order_requires_an_active_product() {
        let (orders, catalog, _guard) = setup().await;
        let product_id = seed_product(&catalog, 150000).await;
        catalog.toggle_active(product_id).await.unwrap();

        let err = orders
            .create(standard_draft(product_id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn draft_enforces_per_kind_requirements() {
        let err = OrderDraft::from_raw(
            json!({
                "customer_name": "Ayu",
                "customer_phone": "0812000111",
                "order_type": "custom",
            })
            .as_object()
            .unwrap(),
        )
        .unwrap_err();
        let ServiceError::Validation(details) = err else {
            panic!("expected validation error");
        };
        assert_eq!(details[0].field, "custom_description");

        let err = OrderDraft::from_raw(
            json!({
                "customer_name": "Ayu",
                "customer_phone": "0812000111",
                "order_type": "standard",
            })
            .as_object()
            .unwrap(),
        )
        .unwrap_err();
        let ServiceError::Validation(details) = err else {
            panic!("expected validation error");
        };
        assert_eq!(details[0].field, "product_id");
    }

    #[tokio::test]
    async fn status_machine_allows_the_happy_path() {
        let (orders, catalog, _guard) = setup().await;
        let product_id = seed_product(&catalog, 150000).await;
        let view = orders.create(standard_draft(product_id, 1)).await.unwrap();

        for next in ["confirmed", "processing", "completed"] {
            let view = orders.set_status(view.id, next, None).await.unwrap();
            assert_eq!(view.status, next);
        }
    }

    #[tokio::test]
    async fn status_machine_rejects_skips_and_terminal_moves() {
        let (orders, catalog, _guard) = setup().await;
        let product_id = seed_product(&catalog, 150000).await;
        let view = orders.create(standard_draft(product_id, 1)).await.unwrap();

        // pending -> completed skips the machine.
        let err = orders.set_status(view.id, "completed", None).await.unwrap_err();
        let ServiceError::Validation(details) = err else {
            panic!("expected validation error");
        };
        assert!(details[0].expected.contains("confirmed"));
        assert!(details[0].expected.contains("cancelled"));

        orders.set_status(view.id, "cancelled", None).await.unwrap();
        let err = orders.set_status(view.id, "pending", None).await.unwrap_err();
        let ServiceError::Validation(details) = err else {
            panic!("expected validation error");
        };
        assert!(details[0].expected.contains("terminal"));
    }

    #[tokio::test]
    async fn unknown_status_names_the_allowed_set() {
        let (orders, catalog, _guard) = setup().await;
        let product_id = seed_product(&catalog, 150000).await;
        let view = orders.create(standard_draft(product_id, 1)).await.unwrap();

        let err = orders.set_status(view.id, "shipped", None).await.unwrap_err();
        let ServiceError::Validation(details) = err else {
            panic!("expected validation error");
        };
        assert!(details[0].expected.contains("pending"));
        assert!(details[0].expected.contains("cancelled"));
    }

    #[tokio::test]
    async fn partial_update_touches_requested_columns_only() {
        let (orders, catalog, _guard) = setup().await;
        let product_id = seed_product(&catalog, 150000).await;
        let view = orders.create(standard_draft(product_id, 1)).await.unwrap();

        let patch = OrderPatch::from_raw(
            json!({ "quantity": "4", "notes": "deliver friday", "customer_email": "" })
                .as_object()
                .unwrap(),
        )
        .unwrap();
        let applied = orders.update(view.id, patch).await.unwrap();
        assert_eq!(applied, vec!["quantity", "notes"]);

        let updated = orders.get(view.id).await.unwrap();
        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.notes.as_deref(), Some("deliver friday"));
        assert_eq!(updated.customer_name, "Ayu");
    }

    #[tokio::test]
    async fn empty_order_patch_is_nothing_to_update() {
        let (orders, catalog, _guard) = setup().await;
        let product_id = seed_product(&catalog, 150000).await;
        let view = orders.create(standard_draft(product_id, 1)).await.unwrap();

        let err = orders.update(view.id, OrderPatch::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NothingToUpdate));
    }

    #[tokio::test]
    async fn delete_removes_the_order() {
        let (orders, catalog, _guard) = setup().await;
        let product_id = seed_product(&catalog, 150000).await;
        let view = orders.create(standard_draft(product_id, 1)).await.unwrap();

        orders.delete(view.id).await.unwrap();
        assert!(matches!(
            orders.get(view.id).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            orders.delete(view.id).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
