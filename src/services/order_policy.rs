// src/services/order_policy.rs

use crate::{common::error::AppError, models::orders::OrderStatus};

/// Quem está pedindo a transição, em relação ao pedido.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub is_admin: bool,
    pub is_owner: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Allowed {
    AdminOnly,
    AdminOrOwner,
}

impl Allowed {
    fn permits(self, requester: Requester) -> bool {
        match self {
            Allowed::AdminOnly => requester.is_admin,
            Allowed::AdminOrOwner => requester.is_admin || requester.is_owner,
        }
    }
}

/// O que a transição faz além de gravar o novo status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEffect {
    StatusOnly,
    /// Devolve ao estoque as quantidades de cada item do pedido.
    RestoreStock,
}

struct Transition {
    from: OrderStatus,
    to: OrderStatus,
    allowed: Allowed,
    effect: TransitionEffect,
}

// Tudo que não está aqui é inválido. `Cancelled` é terminal.
const TRANSITIONS: &[Transition] = &[
    Transition {
        from: OrderStatus::Pending,
        to: OrderStatus::Paid,
        allowed: Allowed::AdminOnly,
        effect: TransitionEffect::StatusOnly,
    },
    Transition {
        from: OrderStatus::Pending,
        to: OrderStatus::Cancelled,
        allowed: Allowed::AdminOrOwner,
        effect: TransitionEffect::RestoreStock,
    },
    Transition {
        from: OrderStatus::Paid,
        to: OrderStatus::Cancelled,
        allowed: Allowed::AdminOnly,
        effect: TransitionEffect::RestoreStock,
    },
    Transition {
        from: OrderStatus::Paid,
        to: OrderStatus::Pending,
        allowed: Allowed::AdminOnly,
        effect: TransitionEffect::StatusOnly,
    },
];

/// Avalia a transição uma única vez, antes de qualquer escrita.
///
/// Primeiro checa se o solicitante pode pedir o status de destino (para não
/// revelar o estado de pedidos alheios), depois se a transição existe.
pub fn authorize_transition(
    from: OrderStatus,
    to: OrderStatus,
    requester: Requester,
) -> Result<TransitionEffect, AppError> {
    let target = match to {
        OrderStatus::Cancelled => Allowed::AdminOrOwner,
        OrderStatus::Paid | OrderStatus::Pending => Allowed::AdminOnly,
    };
    if !target.permits(requester) {
        return Err(forbidden(to));
    }

    let transition = TRANSITIONS
        .iter()
        .find(|t| t.from == from && t.to == to)
        .ok_or(AppError::InvalidTransition { from, to })?;

    if !transition.allowed.permits(requester) {
        return Err(forbidden(to));
    }

    Ok(transition.effect)
}

fn forbidden(to: OrderStatus) -> AppError {
    let message = match to {
        OrderStatus::Paid => "Only admins can mark orders as paid",
        OrderStatus::Pending => "Only admins can reopen orders",
        OrderStatus::Cancelled => "You can only cancel your own pending orders",
    };
    AppError::Forbidden(message.into())
}
