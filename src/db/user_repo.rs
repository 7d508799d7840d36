// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::auth::{User, VerifiedIdentity},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // Busca um usuário pelo ID do provedor de identidade.
    // Genérico no executor para rodar dentro da transação do pedido.
    pub async fn find_by_subject<'e, E>(
        &self,
        executor: E,
        subject_id: &str,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE subject_id = $1")
            .bind(subject_id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    /// "Get-or-create": devolve o usuário existente ou cria um `customer`.
    /// O UPSERT evita corrida entre dois primeiros acessos simultâneos.
    pub async fn get_or_create(&self, identity: &VerifiedIdentity) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (subject_id, display_name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (subject_id)
            DO UPDATE SET subject_id = EXCLUDED.subject_id
            RETURNING *
            "#,
        )
        .bind(&identity.subject_id)
        .bind(identity.display_name.as_deref())
        .bind(identity.email.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}
