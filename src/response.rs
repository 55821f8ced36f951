//! Caller-visible response shapes.
//!
//! The transport layer (out of scope here) serializes these as-is. Mutations
//! answer `{ success, message, data }`; failures answer
//! `{ error, message, details? }` with the taxonomy's HTTP-equivalent status.

use serde::Serialize;
use serde_json::Value;

use crate::error::ServiceError;

#[derive(Clone, Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Map a service error onto its status and wire body. Persistence detail is
/// suppressed outside development mode; everything else in the taxonomy is
/// caller-actionable and reported in full.
pub fn error_body(err: &ServiceError, dev_mode: bool) -> (u16, ErrorBody) {
    let details = match err {
        ServiceError::Validation(fields) => serde_json::to_value(fields).ok(),
        _ => None,
    };

    let message = match err {
        ServiceError::Conflict { references } => format!(
            "record is referenced by {} order(s); remove or re-point dependent orders first",
            references
        ),
        ServiceError::Persistence(_) if !dev_mode => "internal server error".to_string(),
        other => other.to_string(),
    };

    (
        err.status(),
        ErrorBody {
            error: err.tag(),
            message,
            details,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;

    #[test]
    fn success_shape_carries_data() {
        let response = ApiResponse::ok("created", serde_json::json!({ "id": 7 }));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["id"], 7);
    }

    #[test]
    fn validation_errors_expose_every_field() {
        let err = ServiceError::Validation(vec![
            FieldError::new("price", "\"abc\"", "integer >= 1"),
            FieldError::new("category", "\"garden\"", "one of bucket, balloon_decor"),
        ]);
        let (status, body) = error_body(&err, false);
        assert_eq!(status, 400);
        assert_eq!(body.error, "validation_error");
        assert_eq!(body.details.unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn conflict_instructs_the_caller() {
        let (status, body) = error_body(&ServiceError::Conflict { references: 4 }, false);
        assert_eq!(status, 409);
        assert!(body.message.contains("4 order(s)"));
        assert!(body.message.contains("re-point"));
    }

    #[test]
    fn persistence_detail_is_suppressed_in_production() {
        let err = ServiceError::Persistence(sea_orm::DbErr::Custom("secret table".to_string()));
        let (status, body) = error_body(&err, false);
        assert_eq!(status, 500);
        assert_eq!(body.message, "internal server error");

        let (_, body) = error_body(&err, true);
        assert!(body.message.contains("secret table"));
    }
}
