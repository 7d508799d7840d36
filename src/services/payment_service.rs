// src/services/payment_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrderRepository, PaymentRepository},
    models::payments::{Payment, PaymentMethod, PaymentStatus},
};

#[derive(Clone)]
pub struct PaymentService {
    pool: PgPool,
    order_repo: OrderRepository,
    payment_repo: PaymentRepository,
}

impl PaymentService {
    pub fn new(pool: PgPool, order_repo: OrderRepository, payment_repo: PaymentRepository) -> Self {
        Self {
            pool,
            order_repo,
            payment_repo,
        }
    }

    /// Novo registro `Pending` para o pedido. Não verifica se já existe
    /// pagamento: mais de um registro por pedido é permitido.
    pub async fn create_payment(
        &self,
        order_id: Uuid,
        method: PaymentMethod,
        reference: Option<&str>,
    ) -> Result<Payment, AppError> {
        // Confere o pedido e insere na mesma transação (o pedido não some no meio)
        let mut tx = self.pool.begin().await?;

        self.order_repo
            .find_by_id(&mut *tx, order_id)
            .await?
            .ok_or(AppError::NotFound("Order"))?;

        let payment = self
            .payment_repo
            .insert(&mut *tx, order_id, method, reference)
            .await?;

        tx.commit().await?;

        tracing::info!(payment_id = %payment.id, order_id = %order_id, "💳 Pagamento registrado ({})", method);
        Ok(payment)
    }

    pub async fn update_payment_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> Result<(), AppError> {
        match self.payment_repo.update_status(payment_id, status).await? {
            0 => Err(AppError::NotFound("Payment")),
            _ => {
                tracing::info!(payment_id = %payment_id, "Status do pagamento: {}", status);
                Ok(())
            }
        }
    }

    /// O primeiro pagamento registrado para o pedido.
    pub async fn get_payment_by_order(&self, order_id: Uuid) -> Result<Payment, AppError> {
        self.payment_repo
            .first_for_order(order_id)
            .await?
            .ok_or(AppError::NotFound("Payment"))
    }
}
