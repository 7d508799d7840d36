// tests/store.rs
//
// Propriedades do motor de pedidos contra um Postgres real.
// Rodar com: DATABASE_URL=postgres://... cargo test -- --ignored

use std::{sync::Arc, time::Duration};

use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use preorder_backend::{
    common::error::AppError,
    config::{allowed_origins, AppState, Config, IdentityConfig, TokenKey},
    models::{
        auth::VerifiedIdentity,
        catalog::Product,
        orders::{OrderLine, OrderStatus},
        payments::{PaymentMethod, PaymentStatus},
    },
    services::identity::JwtIdentityVerifier,
};

async fn state() -> AppState {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL deve apontar para um Postgres descartável");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    let config = Config {
        database_url,
        max_connections: 10,
        acquire_timeout: Duration::from_secs(5),
        lock_timeout: Duration::from_secs(5),
        port: 0,
        allowed_origins: allowed_origins(None),
        expose_error_details: true,
        product_writes_require_admin: false,
        identity: IdentityConfig {
            key: TokenKey::Secret("test".into()),
            issuer: None,
            audience: None,
        },
    };
    let verifier = JwtIdentityVerifier::from_config(&config.identity).unwrap();
    AppState::from_parts(pool, config, Arc::new(verifier))
}

async fn customer(state: &AppState) -> VerifiedIdentity {
    let identity = VerifiedIdentity {
        subject_id: format!("uid-{}", Uuid::new_v4()),
        email: None,
        display_name: Some("Cliente".into()),
        picture: None,
    };
    state.user_service.get_or_create_profile(&identity).await.unwrap();
    identity
}

async fn admin(state: &AppState) -> VerifiedIdentity {
    let identity = customer(state).await;
    sqlx::query("UPDATE users SET role = 'admin' WHERE subject_id = $1")
        .bind(&identity.subject_id)
        .execute(&state.db_pool)
        .await
        .unwrap();
    identity
}

async fn product(state: &AppState, price: &str, stock: i32) -> Product {
    state
        .catalog_service
        .create_product(
            &format!("Produto {}", Uuid::new_v4()),
            None,
            price.parse().unwrap(),
            stock,
        )
        .await
        .unwrap()
}

async fn stock_of(pool: &PgPool, id: Uuid) -> i32 {
    sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

fn line(product: &Product, quantity: i32) -> OrderLine {
    OrderLine {
        product_id: product.id,
        quantity,
    }
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn order_total_and_stock_deduction() {
    let state = state().await;
    let buyer = customer(&state).await;
    let bread = product(&state, "120.00", 10).await;
    let cake = product(&state, "45.50", 4).await;

    let placed = state
        .order_service
        .create_order(&buyer, &[line(&bread, 2), line(&cake, 3)], "GCash")
        .await
        .unwrap();

    assert_eq!(placed.total_amount, "376.50".parse::<Decimal>().unwrap());
    assert_eq!(placed.payment_method, PaymentMethod::GCash);
    assert_eq!(placed.payment_status, PaymentStatus::Pending);
    assert_eq!(stock_of(&state.db_pool, bread.id).await, 8);
    assert_eq!(stock_of(&state.db_pool, cake.id).await, 1);

    let detail = state
        .order_service
        .get_order_details(&buyer, placed.order_id)
        .await
        .unwrap();
    assert_eq!(detail.header.status, OrderStatus::Pending);
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.payments.len(), 1);
    assert!(detail.items.iter().any(|i| i.product_name == bread.name && i.price == bread.price));
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn insufficient_stock_rolls_back_everything() {
    let state = state().await;
    let buyer = customer(&state).await;
    let plenty = product(&state, "10.00", 50).await;
    let scarce = product(&state, "10.00", 1).await;

    let err = state
        .order_service
        .create_order(&buyer, &[line(&plenty, 5), line(&scarce, 2)], "Cash")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::InsufficientStock { available: 1, requested: 2, .. }
    ));
    assert_eq!(stock_of(&state.db_pool, plenty.id).await, 50);
    assert_eq!(stock_of(&state.db_pool, scarce.id).await, 1);
    assert!(state.order_service.list_orders(&buyer).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn repeated_product_in_one_order_sees_remaining_stock() {
    let state = state().await;
    let buyer = customer(&state).await;
    let bread = product(&state, "10.00", 3).await;

    let err = state
        .order_service
        .create_order(&buyer, &[line(&bread, 2), line(&bread, 2)], "Cash")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock { available: 1, .. }));
    assert_eq!(stock_of(&state.db_pool, bread.id).await, 3);
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn invalid_orders_are_rejected() {
    let state = state().await;
    let buyer = customer(&state).await;
    let bread = product(&state, "10.00", 3).await;

    let empty = state.order_service.create_order(&buyer, &[], "Cash").await;
    assert!(matches!(empty, Err(AppError::InvalidInput(_))));

    let method = state
        .order_service
        .create_order(&buyer, &[line(&bread, 1)], "Bitcoin")
        .await;
    assert!(matches!(method, Err(AppError::InvalidInput(_))));

    let missing = OrderLine {
        product_id: Uuid::new_v4(),
        quantity: 1,
    };
    let unknown = state.order_service.create_order(&buyer, &[missing], "Cash").await;
    assert!(matches!(unknown, Err(AppError::NotFound("Product"))));

    let stranger = VerifiedIdentity {
        subject_id: format!("ghost-{}", Uuid::new_v4()),
        email: None,
        display_name: None,
        picture: None,
    };
    let no_user = state
        .order_service
        .create_order(&stranger, &[line(&bread, 1)], "Cash")
        .await;
    assert!(matches!(no_user, Err(AppError::NotFound("User"))));

    assert_eq!(stock_of(&state.db_pool, bread.id).await, 3);
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn concurrent_orders_never_oversell() {
    let state = state().await;
    let bread = product(&state, "10.00", 5).await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let buyer = customer(&state).await;
        let orders = state.order_service.clone();
        let lines = [line(&bread, 2)];
        handles.push(tokio::spawn(async move {
            orders.create_order(&buyer, &lines, "Cash").await
        }));
    }

    let mut placed = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => placed += 1,
            Err(AppError::InsufficientStock { .. }) => refused += 1,
            Err(other) => panic!("erro inesperado: {:?}", other),
        }
    }

    assert_eq!((placed, refused), (2, 2));
    assert_eq!(stock_of(&state.db_pool, bread.id).await, 1);
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn cancelling_restores_stock_once() {
    let state = state().await;
    let buyer = customer(&state).await;
    let bread = product(&state, "10.00", 6).await;

    let placed = state
        .order_service
        .create_order(&buyer, &[line(&bread, 4)], "Cash")
        .await
        .unwrap();
    assert_eq!(stock_of(&state.db_pool, bread.id).await, 2);

    let order = state
        .order_service
        .update_order_status(&buyer, placed.order_id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&state.db_pool, bread.id).await, 6);

    // Cancelado é terminal: nada de devolver estoque de novo
    let again = state
        .order_service
        .update_order_status(&buyer, placed.order_id, OrderStatus::Cancelled)
        .await;
    assert!(matches!(again, Err(AppError::InvalidTransition { .. })));
    assert_eq!(stock_of(&state.db_pool, bread.id).await, 6);
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn only_admins_mark_orders_paid() {
    let state = state().await;
    let buyer = customer(&state).await;
    let boss = admin(&state).await;
    let bread = product(&state, "10.00", 5).await;

    let placed = state
        .order_service
        .create_order(&buyer, &[line(&bread, 1)], "GCash")
        .await
        .unwrap();

    let denied = state
        .order_service
        .update_order_status(&buyer, placed.order_id, OrderStatus::Paid)
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let detail = state
        .order_service
        .get_order_details(&buyer, placed.order_id)
        .await
        .unwrap();
    assert_eq!(detail.header.status, OrderStatus::Pending);

    let paid = state
        .order_service
        .update_order_status(&boss, placed.order_id, OrderStatus::Paid)
        .await
        .unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);

    // Pago só volta a estoque pelas mãos do admin
    let denied = state
        .order_service
        .update_order_status(&buyer, placed.order_id, OrderStatus::Cancelled)
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
    assert_eq!(stock_of(&state.db_pool, bread.id).await, 4);
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn orders_are_private_to_their_owner() {
    let state = state().await;
    let owner = customer(&state).await;
    let other = customer(&state).await;
    let boss = admin(&state).await;
    let bread = product(&state, "10.00", 5).await;

    let placed = state
        .order_service
        .create_order(&owner, &[line(&bread, 1)], "Cash")
        .await
        .unwrap();

    let peek = state
        .order_service
        .get_order_details(&other, placed.order_id)
        .await;
    assert!(matches!(peek, Err(AppError::NotFound("Order"))));
    assert!(state.order_service.list_orders(&other).await.unwrap().is_empty());

    let cancel = state
        .order_service
        .update_order_status(&other, placed.order_id, OrderStatus::Cancelled)
        .await;
    assert!(matches!(cancel, Err(AppError::Forbidden(_))));

    assert!(state
        .order_service
        .get_order_details(&boss, placed.order_id)
        .await
        .is_ok());
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn payment_round_trip_and_duplicates() {
    let state = state().await;
    let buyer = customer(&state).await;
    let bread = product(&state, "10.00", 5).await;

    let placed = state
        .order_service
        .create_order(&buyer, &[line(&bread, 1)], "Cash")
        .await
        .unwrap();

    let first = state
        .payment_service
        .get_payment_by_order(placed.order_id)
        .await
        .unwrap();
    assert_eq!(first.order_id, placed.order_id);
    assert_eq!(first.method, PaymentMethod::Cash);
    assert_eq!(first.status, PaymentStatus::Pending);

    // Um segundo registro é aceito, mas a consulta continua trazendo o primeiro
    let extra = state
        .payment_service
        .create_payment(placed.order_id, PaymentMethod::GCash, Some("GC-123"))
        .await
        .unwrap();
    assert_eq!(extra.status, PaymentStatus::Pending);
    assert_eq!(extra.reference.as_deref(), Some("GC-123"));
    assert_eq!(
        state
            .payment_service
            .get_payment_by_order(placed.order_id)
            .await
            .unwrap()
            .id,
        first.id
    );

    state
        .payment_service
        .update_payment_status(extra.id, PaymentStatus::Paid)
        .await
        .unwrap();
    let detail = state
        .order_service
        .get_order_details(&buyer, placed.order_id)
        .await
        .unwrap();
    assert_eq!(detail.payments.len(), 2);
    assert!(detail.payments.iter().any(|p| p.id == extra.id && p.status == PaymentStatus::Paid));

    let unknown = state
        .payment_service
        .update_payment_status(Uuid::new_v4(), PaymentStatus::Paid)
        .await;
    assert!(matches!(unknown, Err(AppError::NotFound("Payment"))));

    let no_order = state
        .payment_service
        .create_payment(Uuid::new_v4(), PaymentMethod::Cash, None)
        .await;
    assert!(matches!(no_order, Err(AppError::NotFound("Order"))));
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn catalog_crud_and_in_use_products() {
    let state = state().await;
    let buyer = customer(&state).await;
    let bread = product(&state, "10.00", 5).await;

    let updated = state
        .catalog_service
        .update_product(
            bread.id,
            preorder_backend::models::catalog::ProductChanges {
                stock: Some(9),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.stock, 9);
    assert_eq!(updated.name, bread.name);
    assert_eq!(updated.price, bread.price);

    state
        .order_service
        .create_order(&buyer, &[line(&bread, 1)], "Cash")
        .await
        .unwrap();
    let in_use = state.catalog_service.delete_product(bread.id).await;
    assert!(matches!(in_use, Err(AppError::ProductInUse)));

    let loose = product(&state, "1.00", 1).await;
    state.catalog_service.delete_product(loose.id).await.unwrap();
    assert!(matches!(
        state.catalog_service.get_product(loose.id).await,
        Err(AppError::NotFound("Product"))
    ));
    assert!(matches!(
        state.catalog_service.delete_product(loose.id).await,
        Err(AppError::NotFound("Product"))
    ));
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn profile_is_created_once() {
    let state = state().await;
    let identity = customer(&state).await;

    let first = state.user_service.get_or_create_profile(&identity).await.unwrap();
    let second = state.user_service.get_or_create_profile(&identity).await.unwrap();
    assert_eq!(first.id, second.id);
    assert!(!first.is_admin());
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn orders_are_listed_newest_first() {
    let state = state().await;
    let buyer = customer(&state).await;
    let bread = product(&state, "10.00", 5).await;

    let first = state
        .order_service
        .create_order(&buyer, &[line(&bread, 1)], "Cash")
        .await
        .unwrap();
    let second = state
        .order_service
        .create_order(&buyer, &[line(&bread, 1)], "GCash")
        .await
        .unwrap();

    let orders = state.order_service.list_orders(&buyer).await.unwrap();
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![second.order_id, first.order_id]);
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn cancelling_restores_every_line() {
    let state = state().await;
    let buyer = customer(&state).await;
    let bread = product(&state, "10.00", 5).await;
    let cake = product(&state, "25.00", 3).await;

    let placed = state
        .order_service
        .create_order(&buyer, &[line(&bread, 2), line(&cake, 1)], "Cash")
        .await
        .unwrap();
    assert_eq!(stock_of(&state.db_pool, bread.id).await, 3);
    assert_eq!(stock_of(&state.db_pool, cake.id).await, 2);

    state
        .order_service
        .update_order_status(&buyer, placed.order_id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(stock_of(&state.db_pool, bread.id).await, 5);
    assert_eq!(stock_of(&state.db_pool, cake.id).await, 3);
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn oversized_total_is_invalid_input_and_rolls_back() {
    let state = state().await;
    let buyer = customer(&state).await;
    let pricey = product(&state, "99999.99", 1_000_000).await;

    let err = state
        .order_service
        .create_order(&buyer, &[line(&pricey, 200_000)], "Cash")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(stock_of(&state.db_pool, pricey.id).await, 1_000_000);
    assert!(state.order_service.list_orders(&buyer).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a disposable Postgres at DATABASE_URL"]
async fn restock_past_integer_range_is_invalid_input() {
    let state = state().await;
    let buyer = customer(&state).await;
    let bread = product(&state, "10.00", 10).await;

    let placed = state
        .order_service
        .create_order(&buyer, &[line(&bread, 5)], "Cash")
        .await
        .unwrap();

    sqlx::query("UPDATE products SET stock = 2147483647 WHERE id = $1")
        .bind(bread.id)
        .execute(&state.db_pool)
        .await
        .unwrap();

    let err = state
        .order_service
        .update_order_status(&buyer, placed.order_id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let detail = state
        .order_service
        .get_order_details(&buyer, placed.order_id)
        .await
        .unwrap();
    assert_eq!(detail.header.status, OrderStatus::Pending);
    assert_eq!(stock_of(&state.db_pool, bread.id).await, 2_147_483_647);
}
