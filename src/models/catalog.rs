// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Teto exclusivo das colunas de dinheiro (`NUMERIC(12, 2)`): 10^10.
pub const MONEY_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// Teto do estoque aceito na entrada. Deixa folga até `i32::MAX` para devoluções.
pub const MAX_STOCK: i32 = 1_000_000_000;

/// Cabe em `NUMERIC(12, 2)` sem arredondar: no máximo 2 casas e abaixo de 10^10.
pub fn fits_money_column(value: Decimal) -> bool {
    value.normalize().scale() <= 2 && value.abs() < MONEY_LIMIT
}

// --- Produto do catálogo ---
// `stock` é o saldo disponível; o banco garante (CHECK) que nunca fica negativo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Ube Cheese Pandesal (6 pcs)")]
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "120.00")]
    pub price: Decimal,
    #[schema(example = 25)]
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Campos opcionais de uma atualização parcial de produto.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_limit_is_ten_to_the_tenth() {
        assert_eq!(MONEY_LIMIT, Decimal::from(10_000_000_000i64));
    }

    #[test]
    fn money_column_rejects_extra_scale_and_overflow() {
        assert!(fits_money_column("120.00".parse().unwrap()));
        assert!(fits_money_column("1.500".parse().unwrap()));
        assert!(fits_money_column("9999999999.99".parse().unwrap()));
        assert!(!fits_money_column("1.005".parse().unwrap()));
        assert!(!fits_money_column("10000000000".parse().unwrap()));
        assert!(!fits_money_column("100000000000".parse().unwrap()));
    }
}
