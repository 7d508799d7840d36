// src/handlers/payments.rs

use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, json::JsonBody, path::PathParam},
    config::AppState,
    models::payments::{Payment, PaymentMethod, PaymentStatus},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentPayload {
    pub order_id: Option<Uuid>,
    #[schema(example = "GCash")]
    pub method: Option<String>,
    #[schema(example = "GC-0038217745")]
    pub payment_reference: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentStatusPayload {
    #[schema(example = "Paid")]
    pub status: Option<String>,
}

// POST /api/payments
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    request_body = CreatePaymentPayload,
    responses(
        (status = 200, description = "Pagamento registrado como Pending", body = Payment),
        (status = 400, description = "Pedido ou método ausente/inválido"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_payment(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<CreatePaymentPayload>,
) -> Result<Json<Payment>, AppError> {
    let (Some(order_id), Some(method)) = (payload.order_id, payload.method.as_deref()) else {
        return Err(AppError::InvalidInput(
            "Order ID and payment method are required".into(),
        ));
    };
    let method: PaymentMethod = method.parse()?;

    let payment = app_state
        .payment_service
        .create_payment(order_id, method, payload.payment_reference.as_deref())
        .await?;

    Ok(Json(payment))
}

// PATCH /api/payments/{payment_id}/status
#[utoipa::path(
    patch,
    path = "/api/payments/{payment_id}/status",
    tag = "Payments",
    request_body = UpdatePaymentStatusPayload,
    params(("payment_id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Status atualizado"),
        (status = 400, description = "Status desconhecido"),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_payment_status(
    State(app_state): State<AppState>,
    PathParam(payment_id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdatePaymentStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let status: PaymentStatus = payload
        .status
        .as_deref()
        .ok_or_else(|| AppError::InvalidInput("Status is required".into()))?
        .parse()?;

    app_state
        .payment_service
        .update_payment_status(payment_id, status)
        .await?;

    Ok(Json(json!({ "message": "Payment status updated" })))
}

// GET /api/payments/order/{order_id}
#[utoipa::path(
    get,
    path = "/api/payments/order/{order_id}",
    tag = "Payments",
    params(("order_id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Primeiro pagamento do pedido", body = Payment),
        (status = 404, description = "Nenhum pagamento para o pedido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_payment_by_order(
    State(app_state): State<AppState>,
    PathParam(order_id): PathParam<Uuid>,
) -> Result<Json<Payment>, AppError> {
    let payment = app_state
        .payment_service
        .get_payment_by_order(order_id)
        .await?;
    Ok(Json(payment))
}
