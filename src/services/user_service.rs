// src/services/user_service.rs

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{User, VerifiedIdentity},
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Perfil do usuário autenticado, criado no primeiro acesso.
    pub async fn get_or_create_profile(&self, identity: &VerifiedIdentity) -> Result<User, AppError> {
        let user = self.user_repo.get_or_create(identity).await?;
        tracing::debug!(user_id = %user.id, "Perfil resolvido para {}", identity.subject_id);
        Ok(user)
    }

    /// Usuário interno já existente e com papel `admin` (não cria perfil).
    pub async fn require_admin(&self, identity: &VerifiedIdentity) -> Result<User, AppError> {
        let user = self
            .user_repo
            .find_by_subject(self.user_repo.pool(), &identity.subject_id)
            .await?;

        match user {
            Some(user) if user.is_admin() => Ok(user),
            _ => Err(AppError::Forbidden("Only admins can manage products".into())),
        }
    }
}
