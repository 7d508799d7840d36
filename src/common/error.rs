// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::orders::OrderStatus;

/// Mensagem genérica devolvida em qualquer 500.
pub const GENERIC_INTERNAL_MESSAGE: &str = "An unexpected error occurred.";

/// Detalhe de um erro interno, anexado aos extensions da resposta.
/// O middleware `expose_error_details` decide se ele vai para o corpo.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Not enough stock for product {product_id}, available: {available}")]
    InsufficientStock {
        product_id: Uuid,
        available: i32,
        requested: i32,
    },

    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("No token provided")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Product is referenced by existing orders")]
    ProductInUse,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidInput(_)
            | AppError::InsufficientStock { .. }
            | AppError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ProductInUse => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                (status, body).into_response()
            }
            AppError::InsufficientStock {
                product_id,
                available,
                requested,
            } => {
                let body = Json(json!({
                    "error": format!(
                        "Not enough stock for {}, available: {}",
                        product_id, available
                    ),
                    "product_id": product_id,
                    "available": available,
                    "requested": requested,
                }));
                (status, body).into_response()
            }
            // Banco e erros inesperados viram 500 genérico.
            // O detalhe vai para o log e para os extensions da resposta.
            ref e @ (AppError::DatabaseError(_) | AppError::InternalServerError(_)) => {
                let detail = e.to_string();
                tracing::error!("Internal server error: {}", detail);
                let mut response =
                    (status, Json(json!({ "error": GENERIC_INTERNAL_MESSAGE }))).into_response();
                response.extensions_mut().insert(InternalErrorDetail(detail));
                response
            }
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}
