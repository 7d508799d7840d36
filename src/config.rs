// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

use crate::{
    db::{OrderRepository, PaymentRepository, ProductRepository, UserRepository},
    services::{
        catalog_service::CatalogService,
        identity::{IdentityVerifier, JwtIdentityVerifier},
        order_service::OrderService,
        payment_service::PaymentService,
        user_service::UserService,
    },
};

const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Como o ID token do provedor de identidade é assinado.
#[derive(Debug, Clone)]
pub enum TokenKey {
    /// HS256 com segredo compartilhado
    Secret(String),
    /// RS256 com a chave pública (PEM) do provedor
    RsaPublicPem(String),
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub key: TokenKey,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub lock_timeout: Duration,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    /// `false` em produção: 500 sempre com mensagem genérica.
    pub expose_error_details: bool,
    /// Lacuna de autorização em aberto: escrita de produtos sem login (padrão)
    /// ou só para admin.
    pub product_writes_require_admin: bool,
    pub identity: IdentityConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;

        let key = match (
            env::var("AUTH_JWT_PUBLIC_KEY_PEM").ok(),
            env::var("AUTH_JWT_SECRET").ok(),
        ) {
            (Some(pem), _) => TokenKey::RsaPublicPem(pem),
            (None, Some(secret)) => TokenKey::Secret(secret),
            (None, None) => anyhow::bail!(
                "AUTH_JWT_PUBLIC_KEY_PEM ou AUTH_JWT_SECRET deve ser definido"
            ),
        };

        Ok(Self {
            database_url,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            acquire_timeout: Duration::from_secs(parse_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 3)?),
            lock_timeout: Duration::from_millis(parse_or("DATABASE_LOCK_TIMEOUT_MS", 5000)?),
            port: parse_or("PORT", 3000)?,
            allowed_origins: allowed_origins(env::var("FRONTEND_URL").ok()),
            expose_error_details: env::var("APP_ENV").map(|v| v != "production").unwrap_or(true),
            product_writes_require_admin: parse_or("PRODUCT_WRITES_REQUIRE_ADMIN", false)?,
            identity: IdentityConfig {
                key,
                issuer: env::var("AUTH_JWT_ISSUER").ok(),
                audience: env::var("AUTH_JWT_AUDIENCE").ok(),
            },
        })
    }
}

fn parse_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} tem um valor inválido: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

/// Origem do front local + `FRONTEND_URL` (se houver).
pub fn allowed_origins(frontend_url: Option<String>) -> Vec<String> {
    let mut origins = vec![DEFAULT_FRONTEND_ORIGIN.to_string()];
    if let Some(url) = frontend_url {
        let url = url.trim().trim_end_matches('/').to_string();
        if !url.is_empty() && !origins.contains(&url) {
            origins.push(url);
        }
    }
    origins
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub user_service: UserService,
    pub catalog_service: CatalogService,
    pub order_service: OrderService,
    pub payment_service: PaymentService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let identity = JwtIdentityVerifier::from_config(&config.identity)?;
        Ok(Self::from_parts(db_pool, config, Arc::new(identity)))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(
        db_pool: PgPool,
        config: Config,
        identity: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let payment_repo = PaymentRepository::new(db_pool.clone());

        let user_service = UserService::new(user_repo.clone());
        let catalog_service = CatalogService::new(product_repo.clone());
        let order_service = OrderService::new(
            db_pool.clone(),
            config.lock_timeout,
            user_repo,
            product_repo,
            order_repo.clone(),
            payment_repo.clone(),
        );
        let payment_service = PaymentService::new(db_pool.clone(), order_repo, payment_repo);

        Self {
            db_pool,
            config: Arc::new(config),
            identity,
            user_service,
            catalog_service,
            order_service,
            payment_service,
        }
    }
}
