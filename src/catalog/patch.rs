//! Typed patches over catalog records.
//!
//! A patch is a discriminated set of optional typed fields, built by
//! coercing exactly the declared field set out of the raw payload. Caller
//! keys outside that set are ignored, so arbitrary column names can never
//! reach the query layer.

use sea_orm::ActiveValue::Set;
use serde_json::{Map, Value};

use crate::db::entities::catalog_record;
use crate::error::{FieldError, Result, ServiceError};
use crate::fields;

/// Fixed category set for catalog records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Bucket,
    BalloonDecor,
    WeddingDecor,
}

impl Category {
    pub const ALL: &'static [&'static str] = &["bucket", "balloon_decor", "wedding_decor"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bucket => "bucket",
            Category::BalloonDecor => "balloon_decor",
            Category::WeddingDecor => "wedding_decor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bucket" => Some(Category::Bucket),
            "balloon_decor" => Some(Category::BalloonDecor),
            "wedding_decor" => Some(Category::WeddingDecor),
            _ => None,
        }
    }

    fn coerce(field: &str, value: Option<&Value>) -> std::result::Result<Option<Self>, FieldError> {
        Ok(fields::coerce_enum(field, value, Self::ALL)?.and_then(|s| Self::parse(&s)))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated input for record creation. Unlike a patch, required fields are
/// enforced here; a missing name, price, or category is a validation failure.
#[derive(Clone, Debug)]
pub struct CatalogDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub category: Category,
    pub features: Vec<String>,
    pub is_featured: bool,
}

impl CatalogDraft {
    pub fn from_raw(raw: &Map<String, Value>) -> Result<Self> {
        let mut errors = Vec::new();

        let name = match fields::coerce_text("name", raw.get("name")) {
            Ok(Some(name)) => Some(name),
            Ok(None) => {
                errors.push(FieldError::new("name", "(absent)", "non-empty string"));
                None
            }
            Err(e) => {
                errors.push(e);
                None
            }
        };
        let description = fields::coerce_text("description", raw.get("description"))
            .unwrap_or_else(|e| {
                errors.push(e);
                None
            });
        let price = match fields::coerce_int("price", raw.get("price"), 1) {
            Ok(Some(price)) => Some(price),
            Ok(None) => {
                errors.push(FieldError::new("price", "(absent)", "integer >= 1"));
                None
            }
            Err(e) => {
                errors.push(e);
                None
            }
        };
        let original_price = fields::coerce_int("original_price", raw.get("original_price"), 0)
            .unwrap_or_else(|e| {
                errors.push(e);
                None
            });
        let category = match Category::coerce("category", raw.get("category")) {
            Ok(Some(category)) => Some(category),
            Ok(None) => {
                errors.push(FieldError::new(
                    "category",
                    "(absent)",
                    format!("one of {}", Category::ALL.join(", ")),
                ));
                None
            }
            Err(e) => {
                errors.push(e);
                None
            }
        };
        let features = fields::coerce_string_list("features", raw.get("features"))
            .unwrap_or_else(|e| {
                errors.push(e);
                None
            });
        let is_featured = fields::coerce_bool("is_featured", raw.get("is_featured"))
            .unwrap_or_else(|e| {
                errors.push(e);
                None
            });

        // A missing required field always pushed an error above, so the
        // fallback arm carries at least one detail.
        match (name, price, category) {
            (Some(name), Some(price), Some(category)) if errors.is_empty() => Ok(Self {
                name,
                description,
                price,
                original_price,
                category,
                features: features.unwrap_or_default(),
                is_featured: is_featured.unwrap_or(false),
            }),
            _ => Err(ServiceError::Validation(errors)),
        }
    }
}

/// Sparse field assignments for a partial update. `None` means "leave the
/// column untouched"; an empty-string sentinel never reaches this struct
/// because coercion drops it.
#[derive(Clone, Debug, Default)]
pub struct CatalogPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub original_price: Option<i64>,
    pub category: Option<Category>,
    pub image_url: Option<String>,
    pub features: Option<Vec<String>>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
}

/// A compiled write: the active model touches exactly the patched columns
/// plus the `updated_at` stamp, and `columns` lists them for the
/// caller-visible response.
#[derive(Debug)]
pub struct CompiledUpdate {
    pub model: catalog_record::ActiveModel,
    pub columns: Vec<&'static str>,
}

impl CatalogPatch {
    /// Build a patch from raw wire input, aggregating all per-field errors.
    /// The image reference is not settable from here; it is attached by the
    /// service when an upload accompanies the request.
    pub fn from_raw(raw: &Map<String, Value>) -> Result<Self> {
        let mut errors = Vec::new();
        let mut patch = Self::default();

        match fields::coerce_text("name", raw.get("name")) {
            Ok(v) => patch.name = v,
            Err(e) => errors.push(e),
        }
        match fields::coerce_text("description", raw.get("description")) {
            Ok(v) => patch.description = v,
            Err(e) => errors.push(e),
        }
        match fields::coerce_int("price", raw.get("price"), 1) {
            Ok(v) => patch.price = v,
            Err(e) => errors.push(e),
        }
        match fields::coerce_int("original_price", raw.get("original_price"), 0) {
            Ok(v) => patch.original_price = v,
            Err(e) => errors.push(e),
        }
        match Category::coerce("category", raw.get("category")) {
            Ok(v) => patch.category = v,
            Err(e) => errors.push(e),
        }
        match fields::coerce_string_list("features", raw.get("features")) {
            Ok(v) => patch.features = v,
            Err(e) => errors.push(e),
        }
        match fields::coerce_bool("is_featured", raw.get("is_featured")) {
            Ok(v) => patch.is_featured = v,
            Err(e) => errors.push(e),
        }
        match fields::coerce_bool("is_active", raw.get("is_active")) {
            Ok(v) => patch.is_active = v,
            Err(e) => errors.push(e),
        }

        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.original_price.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
            && self.features.is_none()
            && self.is_featured.is_none()
            && self.is_active.is_none()
    }

    /// Compile into a write. Fails with `NothingToUpdate` when no field
    /// survived coercion; a request must never silently no-op.
    pub fn compile(&self, now: i64) -> Result<CompiledUpdate> {
        if self.is_empty() {
            return Err(ServiceError::NothingToUpdate);
        }

        let mut model = catalog_record::ActiveModel::default();
        let mut columns = Vec::new();

        if let Some(name) = &self.name {
            model.name = Set(name.clone());
            columns.push("name");
        }
        if let Some(description) = &self.description {
            model.description = Set(Some(description.clone()));
            columns.push("description");
        }
        if let Some(price) = self.price {
            model.price = Set(price);
            columns.push("price");
        }
        if let Some(original_price) = self.original_price {
            model.original_price = Set(Some(original_price));
            columns.push("original_price");
        }
        if let Some(category) = self.category {
            model.category = Set(category.as_str().to_string());
            columns.push("category");
        }
        if let Some(image_url) = &self.image_url {
            model.image_url = Set(Some(image_url.clone()));
            columns.push("image_url");
        }
        if let Some(features) = &self.features {
            model.features = Set(fields::encode_features(features));
            columns.push("features");
        }
        if let Some(is_featured) = self.is_featured {
            model.is_featured = Set(is_featured);
            columns.push("is_featured");
        }
        if let Some(is_active) = self.is_active {
            model.is_active = Set(is_active);
            columns.push("is_active");
        }

        model.updated_at = Set(now);

        Ok(CompiledUpdate { model, columns })
    }
}
