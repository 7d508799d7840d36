// src/handlers/products.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{error::AppError, json::JsonBody, path::PathParam},
    config::AppState,
    models::catalog::{fits_money_column, Product, ProductChanges, MAX_STOCK},
};

// ---
// Validação Customizada
// ---
fn validate_price(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("Price cannot be negative.".into());
        return Err(err);
    }
    // Nada de arredondar em silêncio nem estourar a coluna
    if !fits_money_column(*val) {
        let mut err = ValidationError::new("range");
        err.message =
            Some("Price must have at most 2 decimal places and be below 10000000000.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateProduct
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductPayload {
    #[serde(alias = "product_name")]
    #[validate(
        required(message = "Product name and price are required"),
        length(min = 1, message = "Product name cannot be empty")
    )]
    #[schema(example = "Ube Cheese Pandesal (6 pcs)")]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(
        required(message = "Product name and price are required"),
        custom(function = "validate_price")
    )]
    #[schema(value_type = Option<String>, example = "120.00")]
    pub price: Option<Decimal>,

    // Se não vier, começa com 0
    #[validate(range(min = 0, max = MAX_STOCK, message = "Stock must be between 0 and 1000000000"))]
    #[schema(example = 25)]
    pub stock: Option<i32>,
}

// ---
// Payload: UpdateProduct (só os campos enviados mudam)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductPayload {
    #[serde(alias = "product_name")]
    #[validate(length(min = 1, message = "Product name cannot be empty"))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<String>, example = "135.00")]
    pub price: Option<Decimal>,

    #[validate(range(min = 0, max = MAX_STOCK, message = "Stock must be between 0 and 1000000000"))]
    pub stock: Option<i32>,
}

impl From<UpdateProductPayload> for ProductChanges {
    fn from(payload: UpdateProductPayload) -> Self {
        Self {
            name: payload.name,
            description: payload.description,
            price: payload.price,
            stock: payload.stock,
        }
    }
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses((status = 200, description = "Catálogo completo", body = [Product]))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = app_state.catalog_service.list_products().await?;
    Ok(Json(products))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Product>, AppError> {
    let product = app_state.catalog_service.get_product(id).await?;
    Ok(Json(product))
}

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Campos obrigatórios ausentes ou inválidos")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // `required` acima garante os dois campos
    let (Some(name), Some(price)) = (payload.name.as_deref(), payload.price) else {
        return Err(AppError::InvalidInput("Product name and price are required".into()));
    };

    let product = app_state
        .catalog_service
        .create_product(
            name,
            payload.description.as_deref(),
            price,
            payload.stock.unwrap_or(0),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    request_body = UpdateProductPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto atualizado"),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .catalog_service
        .update_product(id, payload.into())
        .await?;

    Ok(Json(json!({ "message": "Product updated successfully" })))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto removido"),
        (status = 404, description = "Produto não encontrado"),
        (status = 409, description = "Produto já usado em pedidos")
    )
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.delete_product(id).await?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}
