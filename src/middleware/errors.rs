// src/middleware/errors.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{common::error::InternalErrorDetail, config::AppState};

/// Fora de produção, troca a mensagem genérica dos 500 pelo detalhe do erro.
pub async fn expose_error_details(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    if app_state.config.expose_error_details {
        if let Some(InternalErrorDetail(detail)) =
            response.extensions_mut().remove::<InternalErrorDetail>()
        {
            return (response.status(), Json(json!({ "error": detail }))).into_response();
        }
    }

    response
}
