// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,

        // --- Users ---
        handlers::users::get_profile,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,

        // --- Payments ---
        handlers::payments::create_payment,
        handlers::payments::update_payment_status,
        handlers::payments::get_payment_by_order,
    ),
    components(
        schemas(
            // --- Users ---
            models::auth::UserRole,
            models::auth::User,

            // --- Catalog ---
            models::catalog::Product,
            handlers::products::CreateProductPayload,
            handlers::products::UpdateProductPayload,

            // --- Orders ---
            models::orders::OrderStatus,
            models::orders::Order,
            models::orders::OrderItem,
            models::orders::OrderItemDetail,
            models::orders::OrderDetail,
            models::orders::OrderLine,
            models::orders::OrderPlaced,
            handlers::orders::CreateOrderPayload,
            handlers::orders::UpdateOrderStatusPayload,

            // --- Payments ---
            models::payments::PaymentMethod,
            models::payments::PaymentStatus,
            models::payments::Payment,
            handlers::payments::CreatePaymentPayload,
            handlers::payments::UpdatePaymentStatusPayload,
        )
    ),
    tags(
        (name = "Health", description = "Verificação de disponibilidade"),
        (name = "Users", description = "Perfil do Usuário"),
        (name = "Products", description = "Catálogo de Produtos"),
        (name = "Orders", description = "Pedidos, Estoque e Status"),
        (name = "Payments", description = "Registro de Pagamentos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
