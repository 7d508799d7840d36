// src/services/order_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{begin_with_lock_timeout, is_lock_failure},
        error::AppError,
    },
    db::{OrderRepository, PaymentRepository, ProductRepository, UserRepository},
    models::{
        auth::VerifiedIdentity,
        catalog::MONEY_LIMIT,
        orders::{order_total, Order, OrderDetail, OrderLine, OrderPlaced, OrderStatus},
        payments::PaymentMethod,
    },
    services::order_policy::{authorize_transition, Requester, TransitionEffect},
};

#[derive(Clone)]
pub struct OrderService {
    pool: PgPool,
    lock_timeout: Duration,
    user_repo: UserRepository,
    product_repo: ProductRepository,
    order_repo: OrderRepository,
    payment_repo: PaymentRepository,
}

impl OrderService {
    pub fn new(
        pool: PgPool,
        lock_timeout: Duration,
        user_repo: UserRepository,
        product_repo: ProductRepository,
        order_repo: OrderRepository,
        payment_repo: PaymentRepository,
    ) -> Self {
        Self {
            pool,
            lock_timeout,
            user_repo,
            product_repo,
            order_repo,
            payment_repo,
        }
    }

    // --- CRIAR PEDIDO ---

    /// Coloca um pedido numa única transação: baixa de estoque, pedido,
    /// itens e o registro de pagamento inicial. Qualquer erro desfaz tudo.
    pub async fn create_order(
        &self,
        identity: &VerifiedIdentity,
        lines: &[OrderLine],
        payment_method: &str,
    ) -> Result<OrderPlaced, AppError> {
        let placed = self
            .place_order(identity, lines, payment_method)
            .await
            .inspect_err(|e| log_lock_failure(e, "create_order"))?;

        tracing::info!(
            order_id = %placed.order_id,
            total = %placed.total_amount,
            "🛒 Pedido criado com {} item(ns)",
            lines.len()
        );
        Ok(placed)
    }

    async fn place_order(
        &self,
        identity: &VerifiedIdentity,
        lines: &[OrderLine],
        payment_method: &str,
    ) -> Result<OrderPlaced, AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        // Se qualquer '?' abaixo falhar, o tx sofre rollback automático ao sair do escopo (drop)
        let mut tx = begin_with_lock_timeout(&self.pool, self.lock_timeout).await?;

        // 1. Usuário interno
        let user = self
            .user_repo
            .find_by_subject(&mut *tx, &identity.subject_id)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        // 2. Entrada
        validate_lines(lines)?;
        let payment_method: PaymentMethod = payment_method.parse()?;

        // 3. Trava cada produto NA ORDEM enviada, confere saldo e já dá a baixa.
        //    A baixa imediata faz um produto repetido no pedido enxergar o saldo restante.
        let mut priced = Vec::with_capacity(lines.len());

        for line in lines {
            let product = self
                .product_repo
                .lock_for_update(&mut *tx, line.product_id)
                .await?
                .ok_or(AppError::NotFound("Product"))?;

            if product.stock < line.quantity {
                return Err(AppError::InsufficientStock {
                    product_id: product.id,
                    available: product.stock,
                    requested: line.quantity,
                });
            }

            // 4. Baixa de estoque
            self.product_repo
                .adjust_stock(&mut *tx, product.id, -line.quantity)
                .await?;

            priced.push((line, product.price));
        }

        let total_amount = order_total(priced.iter().map(|(line, price)| (*price, line.quantity)));
        check_total(total_amount)?;

        // 5. Pedido (status padrão 'Pending')
        let order = self
            .order_repo
            .insert_order(&mut *tx, user.id, total_amount)
            .await?;

        // 6. Itens com o preço "congelado"
        for (line, price) in &priced {
            self.order_repo
                .insert_item(&mut *tx, order.id, line.product_id, line.quantity, *price)
                .await?;
        }

        // 7. Pagamento inicial
        let payment = self
            .payment_repo
            .insert(&mut *tx, order.id, payment_method, None)
            .await?;

        // 8. Se chegou aqui, deu tudo certo. "Commita" a transação.
        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        Ok(OrderPlaced {
            message: "Order placed successfully".into(),
            order_id: order.id,
            total_amount: order.total_amount,
            payment_method: payment.method,
            payment_status: payment.status,
        })
    }

    // --- CONSULTAS ---

    pub async fn list_orders(&self, identity: &VerifiedIdentity) -> Result<Vec<Order>, AppError> {
        let user = self
            .user_repo
            .find_by_subject(&self.pool, &identity.subject_id)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        self.order_repo.list_for_user(user.id).await
    }

    /// Pedido + itens + pagamentos. Quem não é dono (nem admin) recebe NotFound.
    pub async fn get_order_details(
        &self,
        identity: &VerifiedIdentity,
        order_id: Uuid,
    ) -> Result<OrderDetail, AppError> {
        let user = self
            .user_repo
            .find_by_subject(&self.pool, &identity.subject_id)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        let header = self
            .order_repo
            .find_by_id(&self.pool, order_id)
            .await?
            .filter(|order| order.user_id == user.id || user.is_admin())
            .ok_or(AppError::NotFound("Order"))?;

        let items = self.order_repo.list_item_details(&self.pool, order_id).await?;
        let payments = self.payment_repo.list_for_order(&self.pool, order_id).await?;

        Ok(OrderDetail {
            header,
            items,
            payments,
        })
    }

    // --- TRANSIÇÃO DE STATUS ---

    /// Muda o status segundo a tabela de transições. Cancelamento devolve o
    /// estoque na mesma transação que grava o novo status.
    pub async fn update_order_status(
        &self,
        identity: &VerifiedIdentity,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order, AppError> {
        self.transition(identity, order_id, new_status)
            .await
            .inspect_err(|e| log_lock_failure(e, "update_order_status"))
    }

    async fn transition(
        &self,
        identity: &VerifiedIdentity,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order, AppError> {
        let mut tx = begin_with_lock_timeout(&self.pool, self.lock_timeout).await?;

        let user = self
            .user_repo
            .find_by_subject(&mut *tx, &identity.subject_id)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        // Trava o pedido: duas transições concorrentes não podem ambas
        // partir de 'Pending' (ex: cancelar duas vezes e devolver estoque em dobro)
        let order = self
            .order_repo
            .lock_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::NotFound("Order"))?;

        let requester = Requester {
            is_admin: user.is_admin(),
            is_owner: order.user_id == user.id,
        };
        let effect = authorize_transition(order.status, new_status, requester)?;

        if effect == TransitionEffect::RestoreStock {
            let items = self.order_repo.list_items(&mut *tx, order_id).await?;
            for item in &items {
                self.product_repo
                    .adjust_stock(&mut *tx, item.product_id, item.quantity)
                    .await?;
            }
        }

        self.order_repo
            .update_status(&mut *tx, order_id, new_status)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            by = %user.id,
            "Status do pedido: {} -> {}",
            order.status,
            new_status
        );

        Ok(Order {
            status: new_status,
            ..order
        })
    }
}

/// Regras de entrada do pedido que não dependem do banco.
pub fn validate_lines(lines: &[OrderLine]) -> Result<(), AppError> {
    if lines.is_empty() {
        return Err(AppError::InvalidInput("No items in order".into()));
    }
    if let Some(line) = lines.iter().find(|line| line.quantity <= 0) {
        return Err(AppError::InvalidInput(format!(
            "Quantity for product {} must be a positive integer",
            line.product_id
        )));
    }
    Ok(())
}

/// O total precisa caber na coluna `NUMERIC(12, 2)` do pedido.
pub fn check_total(total_amount: Decimal) -> Result<(), AppError> {
    if total_amount >= MONEY_LIMIT {
        return Err(AppError::InvalidInput(format!(
            "Order total {} exceeds the maximum allowed amount",
            total_amount
        )));
    }
    Ok(())
}

fn log_lock_failure(err: &AppError, operation: &str) {
    if let AppError::DatabaseError(db_err) = err {
        if is_lock_failure(db_err) {
            tracing::warn!("⏳ {}: lock de linha não obtido a tempo, transação abortada", operation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32) -> OrderLine {
        OrderLine {
            product_id: Uuid::new_v4(),
            quantity,
        }
    }

    #[test]
    fn empty_order_is_rejected() {
        let err = validate_lines(&[]).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(msg) if msg == "No items in order"));
    }

    #[test]
    fn totals_beyond_the_money_column_are_rejected() {
        assert!(check_total("9999999999.99".parse().unwrap()).is_ok());

        // 200_000 x 99_999.99
        let total = order_total([("99999.99".parse::<Decimal>().unwrap(), 200_000)]);
        assert!(matches!(check_total(total), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn quantities_must_be_positive() {
        assert!(validate_lines(&[line(1), line(3)]).is_ok());
        assert!(matches!(validate_lines(&[line(1), line(0)]), Err(AppError::InvalidInput(_))));
        assert!(matches!(validate_lines(&[line(-2)]), Err(AppError::InvalidInput(_))));
    }
}
