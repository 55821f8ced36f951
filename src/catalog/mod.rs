//! Catalog record mutation and image asset lifecycle.
//!
//! A record's image reference points at exactly one live file in the asset
//! store, or at nothing (null or an external URL). Mutations keep that
//! invariant: create associates, update swaps and deletes the superseded
//! file, delete cascades, and the reconciliation sweep reclaims files no
//! live record references.

pub mod patch;

pub use patch::{CatalogDraft, CatalogPatch, Category, CompiledUpdate};

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    TransactionTrait,
};
use serde::Serialize;

use crate::assets::{self, AssetStore, UploadedImage};
use crate::db::entities::{catalog_record, order_record};
use crate::db::now_secs;
use crate::error::{Result, ServiceError};
use crate::fields::decode_features;

/// Caller-visible view of a catalog record, with the features column decoded.
#[derive(Clone, Debug, Serialize)]
pub struct CatalogItem {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub category: String,
    pub image_url: Option<String>,
    pub features: Vec<String>,
    pub rating: f64,
    pub reviews_count: i32,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<catalog_record::Model> for CatalogItem {
    fn from(model: catalog_record::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            original_price: model.original_price,
            category: model.category,
            image_url: model.image_url,
            features: decode_features(&model.features),
            rating: model.rating,
            reviews_count: model.reviews_count,
            is_featured: model.is_featured,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CreatedRecord {
    pub id: i32,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct UpdateOutcome {
    /// Column names the compiled update actually touched.
    pub applied: Vec<&'static str>,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DeleteOutcome {
    /// Store-local path of the owned file removed with the record, if any.
    pub removed_image: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ReconcileReport {
    pub scanned: usize,
    pub orphaned: usize,
    pub deleted: usize,
    pub orphans: Vec<String>,
    pub failures: Vec<ReconcileFailure>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReconcileFailure {
    pub name: String,
    pub error: String,
}

/// Catalog mutation service. The persistence handle and asset store are
/// injected; nothing here holds global state.
///
/// Known limitation: two concurrent updates to the same record are not
/// serialized beyond single-statement atomicity. The last write wins per
/// field set; field sets are never merged.
pub struct CatalogService {
    db: DatabaseConnection,
    assets: Arc<dyn AssetStore>,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection, assets: Arc<dyn AssetStore>) -> Self {
        Self { db, assets }
    }

    /// Fetch a record regardless of visibility.
    pub async fn get(&self, id: i32) -> Result<CatalogItem> {
        let model = catalog_record::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound("product"))?;
        Ok(model.into())
    }

    /// Fetch a record only if it is active (the storefront view).
    pub async fn get_active(&self, id: i32) -> Result<CatalogItem> {
        let model = catalog_record::Entity::find_by_id(id)
            .filter(catalog_record::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound("product"))?;
        Ok(model.into())
    }

    /// Create a record, associating an uploaded image when one accompanies
    /// the request. The file is written before the insert; if the insert
    /// fails the file stays behind as an orphan for the next sweep.
    pub async fn create(
        &self,
        draft: CatalogDraft,
        image: Option<UploadedImage>,
    ) -> Result<CreatedRecord> {
        let image_url = match &image {
            Some(upload) => Some(assets::reference_for(
                &self.assets.store("image", upload).await?,
            )),
            None => None,
        };

        let now = now_secs();
        let model = catalog_record::ActiveModel {
            name: Set(draft.name),
            description: Set(draft.description),
            price: Set(draft.price),
            original_price: Set(draft.original_price),
            category: Set(draft.category.as_str().to_string()),
            image_url: Set(image_url.clone()),
            features: Set(crate::fields::encode_features(&draft.features)),
            rating: Set(5.0),
            reviews_count: Set(0),
            is_featured: Set(draft.is_featured),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = match model.insert(&self.db).await {
            Ok(inserted) => inserted,
            Err(e) => {
                if let Some(reference) = &image_url {
                    tracing::warn!(
                        "Insert failed after storing {}; file left for reconciliation",
                        reference
                    );
                }
                return Err(e.into());
            }
        };

        tracing::info!("Created catalog record {}", inserted.id);
        Ok(CreatedRecord {
            id: inserted.id,
            image_url,
        })
    }

    /// Apply a partial update. An accompanying upload becomes the new image
    /// reference and the superseded local file is deleted; external URL
    /// references are never touched.
    pub async fn update(
        &self,
        id: i32,
        mut patch: CatalogPatch,
        image: Option<UploadedImage>,
    ) -> Result<UpdateOutcome> {
        let existing = catalog_record::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound("product"))?;

        if let Some(upload) = &image {
            let name = self.assets.store("image", upload).await?;
            patch.image_url = Some(assets::reference_for(&name));
        }

        let compiled = patch.compile(now_secs())?;
        let new_image = patch.image_url.clone();

        let result = catalog_record::Entity::update_many()
            .set(compiled.model)
            .filter(catalog_record::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            // The row vanished between the existence check and the write.
            return Err(ServiceError::NotFound("product"));
        }

        if let (Some(new_reference), Some(old_reference)) = (&new_image, &existing.image_url) {
            if new_reference != old_reference {
                self.remove_superseded(old_reference).await;
            }
        }

        tracing::info!("Updated catalog record {}: {:?}", id, compiled.columns);
        Ok(UpdateOutcome {
            applied: compiled.columns,
            image_url: new_image,
        })
    }

    /// Delete the superseded file behind a replaced reference. Failures are
    /// non-fatal: the database write already succeeded and the sweep will
    /// reclaim anything left behind.
    async fn remove_superseded(&self, old_reference: &str) {
        let Some(name) = assets::local_name(old_reference) else {
            return;
        };
        match self.assets.delete(name).await {
            Ok(true) => tracing::debug!("Removed superseded image {}", name),
            Ok(false) => tracing::warn!("Superseded image {} was already gone", name),
            Err(e) => tracing::warn!("Failed to remove superseded image {}: {}", name, e),
        }
    }

    /// Permanently remove a record. Refused while any order still references
    /// it; the check and the delete share one transaction, and the schema's
    /// RESTRICT constraint backs the same rule at the store level.
    pub async fn delete(&self, id: i32) -> Result<DeleteOutcome> {
        let txn = self.db.begin().await?;

        let existing = catalog_record::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("product"))?;

        let references = order_record::Entity::find()
            .filter(order_record::Column::ProductId.eq(id))
            .count(&txn)
            .await?;
        if references > 0 {
            return Err(ServiceError::Conflict { references });
        }

        catalog_record::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        let removed_image = match existing.image_url.as_deref().and_then(assets::local_name) {
            Some(name) => match self.assets.delete(name).await {
                Ok(true) => Some(name.to_string()),
                Ok(false) => {
                    tracing::warn!("Owned image {} was already gone", name);
                    None
                }
                Err(e) => {
                    tracing::warn!("Failed to remove owned image {}: {}", name, e);
                    None
                }
            },
            None => None,
        };

        tracing::info!("Deleted catalog record {}", id);
        Ok(DeleteOutcome { removed_image })
    }

    /// Flip the featured flag, returning the new state.
    pub async fn toggle_featured(&self, id: i32) -> Result<bool> {
        self.toggle_flag(id, catalog_record::Column::IsFeatured)
            .await
    }

    /// Flip the active (storefront visibility) flag, returning the new
    /// state. Visibility is not deletion; deactivated records keep their
    /// image and their order references.
    pub async fn toggle_active(&self, id: i32) -> Result<bool> {
        self.toggle_flag(id, catalog_record::Column::IsActive).await
    }

    async fn toggle_flag(&self, id: i32, column: catalog_record::Column) -> Result<bool> {
        let existing = catalog_record::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound("product"))?;

        let mut model = <catalog_record::ActiveModel as sea_orm::ActiveModelTrait>::default();
        let new_state = match column {
            catalog_record::Column::IsFeatured => {
                model.is_featured = Set(!existing.is_featured);
                !existing.is_featured
            }
            _ => {
                model.is_active = Set(!existing.is_active);
                !existing.is_active
            }
        };
        model.updated_at = Set(now_secs());

        catalog_record::Entity::update_many()
            .set(model)
            .filter(catalog_record::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        Ok(new_state)
    }

    /// Reclaim files no live record references. Files younger than `min_age`
    /// are skipped: a fresh upload may simply not be associated yet.
    /// Idempotent and safe to run alongside normal mutation traffic.
    pub async fn reconcile_assets(&self, min_age: Duration) -> Result<ReconcileReport> {
        let files = self.assets.list().await?;

        let records = catalog_record::Entity::find().all(&self.db).await?;
        let referenced: std::collections::HashSet<&str> = records
            .iter()
            .filter_map(|r| r.image_url.as_deref())
            .filter_map(assets::local_name)
            .collect();

        let mut report = ReconcileReport {
            scanned: files.len(),
            ..Default::default()
        };

        for name in files {
            if referenced.contains(name.as_str()) {
                continue;
            }

            match self.assets.modified(&name).await {
                Ok(modified) => {
                    let age = SystemTime::now()
                        .duration_since(modified)
                        .unwrap_or_default();
                    if age < min_age {
                        tracing::debug!("Skipping fresh unassociated file {}", name);
                        continue;
                    }
                }
                Err(e) => {
                    report.failures.push(ReconcileFailure {
                        name,
                        error: e.to_string(),
                    });
                    continue;
                }
            }

            report.orphaned += 1;
            report.orphans.push(name.clone());
            match self.assets.delete(&name).await {
                Ok(_) => report.deleted += 1,
                Err(e) => report.failures.push(ReconcileFailure {
                    name,
                    error: e.to_string(),
                }),
            }
        }

        tracing::info!(
            "Asset reconciliation: scanned={} orphaned={} deleted={} failures={}",
            report.scanned,
            report.orphaned,
            report.deleted,
            report.failures.len()
        );
        Ok(report)
    }
}
