use serde::Serialize;
use thiserror::Error;

use crate::assets::AssetError;

/// One rejected input field. Requests surface every bad field at once, so
/// these are always carried as a batch inside [`ServiceError::Validation`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub value: String,
    pub expected: String,
}

impl FieldError {
    pub fn new(field: &str, value: impl ToString, expected: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: got {}, expected {}",
            self.field, self.value, self.expected
        )
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("invalid input ({} field(s))", .0.len())]
    Validation(Vec<FieldError>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("record is referenced by {references} order(s)")]
    Conflict { references: u64 },

    #[error("nothing to update")]
    NothingToUpdate,

    #[error("asset store error: {0}")]
    AssetIo(#[from] AssetError),

    #[error("persistence error: {0}")]
    Persistence(#[from] sea_orm::DbErr),
}

impl ServiceError {
    /// HTTP-equivalent severity for the transport layer to map onto a response.
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::NothingToUpdate => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict { .. } => 409,
            ServiceError::AssetIo(_) => 500,
            ServiceError::Persistence(_) => 500,
        }
    }

    /// Stable machine-readable tag for the error body.
    pub fn tag(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::NothingToUpdate => "nothing_to_update",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Conflict { .. } => "conflict",
            ServiceError::AssetIo(_) => "asset_io_error",
            ServiceError::Persistence(_) => "persistence_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
