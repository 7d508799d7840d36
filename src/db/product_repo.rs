// src/db/product_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{is_foreign_key_violation, is_numeric_out_of_range},
        error::AppError,
    },
    models::catalog::{Product, ProductChanges},
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" e CRUD simples
    // ---
    // Operações de uma única instrução usam a pool principal.

    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        let products =
            sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(products)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        stock: i32,
    ) -> Result<Product, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, price, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    /// Atualização parcial: campos `None` mantêm o valor atual.
    pub async fn update(
        &self,
        id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                stock = COALESCE($5, stock),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .bind(changes.stock)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    /// Retorna quantas linhas foram apagadas (0 = não existia).
    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                // Produto já usado em pedidos: o histórico não pode perder a referência
                if is_foreign_key_violation(&e) {
                    return AppError::ProductInUse;
                }
                e.into()
            })?;
        Ok(result.rows_affected())
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    /// `SELECT ... FOR UPDATE`: segura a linha até o fim da transação,
    /// impedindo que dois pedidos vejam o mesmo saldo.
    pub async fn lock_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(product)
    }

    /// Soma `delta` ao estoque (negativo = baixa, positivo = devolução).
    pub async fn adjust_stock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        delta: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(delta)
            .execute(executor)
            .await
            .map_err(|e| {
                // Devolução que passaria do limite do INTEGER
                if is_numeric_out_of_range(&e) {
                    return AppError::InvalidInput(format!(
                        "Stock for product {} would exceed the maximum",
                        id
                    ));
                }
                e.into()
            })?;
        Ok(())
    }
}
