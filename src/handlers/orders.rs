// src/handlers/orders.rs

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
    middleware::auth::AuthenticatedUser,
    models::orders::{Order, OrderDetail, OrderLine, OrderPlaced, OrderStatus},
};

// ---
// Payload: CreateOrder
// ---
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderPayload {
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[schema(example = "GCash")]
    pub payment_method: Option<String>,
}

// ---
// Payload: UpdateOrderStatus
// ---
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusPayload {
    #[schema(example = "Cancelled")]
    pub status: Option<String>,
}

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 200, description = "Pedido criado", body = OrderPlaced),
        (status = 400, description = "Entrada inválida ou estoque insuficiente"),
        (status = 404, description = "Usuário ou produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    JsonBody(payload): JsonBody<CreateOrderPayload>,
) -> Result<Json<OrderPlaced>, AppError> {
    // Método ausente cai na mesma validação de método desconhecido
    let placed = app_state
        .order_service
        .create_order(
            &identity,
            &payload.items,
            payload.payment_method.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(placed))
}

// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    responses(
        (status = 200, description = "Pedidos do usuário, mais recentes primeiro", body = [Order]),
        (status = 404, description = "Usuário sem cadastro interno")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = app_state.order_service.list_orders(&identity).await?;
    Ok(Json(orders))
}

// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido com itens e pagamentos", body = OrderDetail),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<OrderDetail>, AppError> {
    let detail = app_state
        .order_service
        .get_order_details(&identity, id)
        .await?;
    Ok(Json(detail))
}

// PATCH /api/orders/{order_id}/status
#[utoipa::path(
    patch,
    path = "/api/orders/{order_id}/status",
    tag = "Orders",
    request_body = UpdateOrderStatusPayload,
    params(("order_id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Status atualizado"),
        (status = 400, description = "Status inválido ou transição não permitida"),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Sem permissão para esta transição"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    PathParam(order_id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateOrderStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let status: OrderStatus = payload
        .status
        .as_deref()
        .ok_or_else(|| AppError::InvalidInput("Status is required".into()))?
        .parse()?;

    let order = app_state
        .order_service
        .update_order_status(&identity, order_id, status)
        .await?;

    Ok(Json(json!({
        "message": format!("Order {} status updated to {}", order.id, order.status)
    })))
}
