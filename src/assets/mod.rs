//! Asset store abstraction.
//!
//! Uploaded catalog images live in a dedicated store. A record's image
//! reference is either `/uploads/<name>` (a file this store owns), an
//! external absolute URL (never touched by lifecycle operations), or null.

pub mod local;

pub use local::LocalAssetStore;

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::time::SystemTime;

/// Largest accepted upload, 5 MiB.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Reference prefix for files owned by the asset store.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// Asset store error types
#[derive(Debug)]
pub enum AssetError {
    /// File not found
    NotFound(String),
    /// File name would escape the store or is malformed
    InvalidName(String),
    /// Upload is not an image
    UnsupportedType(String),
    /// Upload exceeds [`MAX_UPLOAD_BYTES`]
    TooLarge(usize),
    /// IO error
    Io(std::io::Error),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NotFound(name) => write!(f, "file not found: {}", name),
            AssetError::InvalidName(name) => write!(f, "invalid file name: {}", name),
            AssetError::UnsupportedType(ct) => write!(f, "unsupported content type: {}", ct),
            AssetError::TooLarge(size) => {
                write!(f, "upload of {} bytes exceeds {} byte limit", size, MAX_UPLOAD_BYTES)
            }
            AssetError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for AssetError {}

impl From<std::io::Error> for AssetError {
    fn from(e: std::io::Error) -> Self {
        AssetError::Io(e)
    }
}

pub type AssetResult<T> = Result<T, AssetError>;

/// An image file received alongside a mutation request.
#[derive(Clone, Debug)]
pub struct UploadedImage {
    pub original_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// File store collaborator for uploaded images.
///
/// `store` generates a collision-resistant name; ownership of the file is
/// only established once a catalog record's image reference points at it.
/// A stored file nothing references is an orphan, reclaimed by the
/// reconciliation sweep.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Write a new file and return its generated name. Rejects non-image
    /// content types and payloads over [`MAX_UPLOAD_BYTES`].
    async fn store(&self, field: &str, upload: &UploadedImage) -> AssetResult<String>;

    /// Delete a file by name. Idempotent: returns `Ok(false)` if the file
    /// was already gone.
    async fn delete(&self, name: &str) -> AssetResult<bool>;

    /// Check if a file exists.
    async fn exists(&self, name: &str) -> AssetResult<bool>;

    /// List all file names in the store.
    async fn list(&self) -> AssetResult<Vec<String>>;

    /// Last-modified time of a file, used to exclude fresh uploads from the
    /// orphan sweep.
    async fn modified(&self, name: &str) -> AssetResult<SystemTime>;
}

/// True for references pointing outside the asset store. External references
/// are displayed as-is and must never be deleted.
pub fn is_external(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Extract the store-local file name from an image reference, if it has one.
pub fn local_name(reference: &str) -> Option<&str> {
    if is_external(reference) {
        return None;
    }
    reference.strip_prefix(UPLOADS_PREFIX).filter(|n| !n.is_empty())
}

/// Build the stored reference for a file name.
pub fn reference_for(name: &str) -> String {
    format!("{}{}", UPLOADS_PREFIX, name)
}
