// src/models/orders.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::payments::{Payment, PaymentMethod, PaymentStatus},
};

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Paid => "Paid",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Paid" => Ok(OrderStatus::Paid),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(AppError::InvalidInput(
                "Invalid status. Must be Pending, Paid or Cancelled".into(),
            )),
        }
    }
}

// --- Structs de Operação ---

// `total_amount` é calculado na criação e nunca mais recalculado.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = String, example = "240.00")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha do pedido. O preço é uma "foto" do produto no momento da compra.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(value_type = String, example = "120.00")]
    pub price: Decimal,
}

// Linha do pedido + nome do produto (JOIN), usada no detalhe.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderItemDetail {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    #[schema(value_type = String, example = "120.00")]
    pub price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub header: Order,
    pub items: Vec<OrderItemDetail>,
    pub payments: Vec<Payment>,
}

/// Um item pedido pelo cliente (ainda não validado contra o estoque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub product_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i32,
}

// Resposta do POST /orders
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderPlaced {
    #[schema(example = "Order placed successfully")]
    pub message: String,
    pub order_id: Uuid,
    #[schema(value_type = String, example = "240.00")]
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
}

/// Total de um pedido: soma de preço * quantidade de cada linha.
pub fn order_total<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    lines
        .into_iter()
        .map(|(price, quantity)| price * Decimal::from(quantity))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_exact_in_decimal() {
        // 0.1 * 3 + 0.2 em ponto flutuante daria 0.5000000000000001
        let total = order_total([
            (Decimal::new(10, 2), 3),
            (Decimal::new(20, 2), 1),
        ]);
        assert_eq!(total, Decimal::new(50, 2));
    }

    #[test]
    fn total_of_nothing_is_zero() {
        assert_eq!(order_total(std::iter::empty()), Decimal::ZERO);
    }

    #[test]
    fn status_rejects_unknown_and_lowercase() {
        assert_eq!("Paid".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        assert!(matches!("paid".parse::<OrderStatus>(), Err(AppError::InvalidInput(_))));
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }
}
