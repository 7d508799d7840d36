// src/router.rs

use std::any::Any;

use axum::{
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{
    common::error::AppError,
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::{
        auth::{admin_guard, auth_guard},
        cors::cors_layer,
        errors::expose_error_details,
    },
};

/// Monta o router completo da API com todas as camadas.
pub fn app(app_state: AppState) -> Router {
    // --- Produtos: leitura sempre pública ---
    let product_reads = Router::new()
        .route("/", get(handlers::products::list_products))
        .route("/{id}", get(handlers::products::get_product));

    let mut product_writes = Router::new()
        .route("/", post(handlers::products::create_product))
        .route(
            "/{id}",
            put(handlers::products::update_product).delete(handlers::products::delete_product),
        );

    if app_state.config.product_writes_require_admin {
        // A última camada roda primeiro: auth_guard antes do admin_guard
        product_writes = product_writes
            .layer(axum_middleware::from_fn_with_state(app_state.clone(), admin_guard))
            .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));
    }

    let product_routes = product_reads.merge(product_writes);

    // --- Rotas protegidas ---
    let user_routes = Router::new()
        .route("/profile", get(handlers::users::get_profile))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let order_routes = Router::new()
        .route(
            "/",
            post(handlers::orders::create_order).get(handlers::orders::list_orders),
        )
        .route("/{id}", get(handlers::orders::get_order))
        .route("/{id}/status", patch(handlers::orders::update_order_status))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let payment_routes = Router::new()
        .route("/", post(handlers::payments::create_payment))
        .route("/{id}/status", patch(handlers::payments::update_payment_status))
        .route("/order/{order_id}", get(handlers::payments::get_payment_by_order))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let cors = cors_layer(&app_state.config.allowed_origins);

    Router::new()
        .route("/", get(handlers::health::health))
        .route("/api/health", get(handlers::health::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/users", user_routes)
        .nest("/api/products", product_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/payments", payment_routes)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            expose_error_details,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// Panic em handler vira um 500 comum, no mesmo formato dos outros erros
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "handler panicked".to_string());

    AppError::InternalServerError(anyhow::anyhow!(detail)).into_response()
}
