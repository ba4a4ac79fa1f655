//! Errors raised by the signing flow and how they map onto HTTP responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::models::contracts::ContractStatus;

#[derive(Debug, Error)]
pub enum SigningError {
    /// Missing or malformed signer input; the caller can retry with input.
    #[error("{0}")]
    Validation(String),

    #[error("Contract {0} not found")]
    NotFound(Uuid),

    /// The contract's status does not allow the requested write.
    #[error("Contract is {}; it cannot move to {}", .from.as_str(), .to.as_str())]
    InvalidTransition {
        from: ContractStatus,
        to: ContractStatus,
    },

    /// The contract row changed between read and write.
    #[error("Contract {0} was modified by someone else; reload and try again")]
    Conflict(Uuid),

    #[error("Database error: {0}")]
    Persistence(#[from] DbErr),

    /// The signature list could not be serialized into the block.
    #[error("Failed to encode signatures: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl SigningError {
    pub fn signature_required() -> Self {
        SigningError::Validation("Signature required".to_string())
    }
}

impl ResponseError for SigningError {
    fn status_code(&self) -> StatusCode {
        match self {
            SigningError::Validation(_) => StatusCode::BAD_REQUEST,
            SigningError::NotFound(_) => StatusCode::NOT_FOUND,
            SigningError::InvalidTransition { .. } | SigningError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            SigningError::Persistence(_) | SigningError::Encoding(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}
