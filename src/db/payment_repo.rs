// src/db/payment_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::payments::{Payment, PaymentMethod, PaymentStatus},
};

#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Sempre nasce `Pending`. Não há unicidade por pedido.
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        method: PaymentMethod,
        reference: Option<&str>,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (order_id, method, status, reference)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(method)
        .bind(PaymentStatus::Pending)
        .bind(reference)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    pub async fn list_for_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE order_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }

    // O primeiro registro criado para o pedido
    pub async fn first_for_order(&self, order_id: Uuid) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE order_id = $1 ORDER BY created_at ASC, id ASC LIMIT 1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(payment)
    }

    /// Retorna quantas linhas foram alteradas (0 = pagamento inexistente).
    pub async fn update_status(&self, id: Uuid, status: PaymentStatus) -> Result<u64, AppError> {
        let result =
            sqlx::query("UPDATE payments SET status = $1, updated_at = NOW() WHERE id = $2")
                .bind(status)
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}
