// src/services/identity.rs

use anyhow::Context;
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    config::{IdentityConfig, TokenKey},
    models::auth::{IdTokenClaims, VerifiedIdentity},
};

/// Dado um bearer token, devolve a identidade verificada ou falha.
/// O provedor de identidade é externo; esta é a única fronteira com ele.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AppError>;
}

/// Verifica ID tokens JWT (HS256 com segredo ou RS256 com chave pública).
pub struct JwtIdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    pub fn from_config(config: &IdentityConfig) -> anyhow::Result<Self> {
        let (key, algorithm) = match &config.key {
            TokenKey::Secret(secret) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            TokenKey::RsaPublicPem(pem) => (
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .context("AUTH_JWT_PUBLIC_KEY_PEM não é uma chave RSA válida")?,
                Algorithm::RS256,
            ),
        };

        let mut validation = Validation::new(algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            // Sem audiência configurada, não exigimos o claim "aud"
            None => validation.validate_aud = false,
        }

        Ok(Self { key, validation })
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AppError> {
        let token_data = decode::<IdTokenClaims>(token, &self.key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token verification failed: {}", e);
                AppError::InvalidToken
            })?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(AppError::InvalidToken);
        }

        Ok(token_data.claims.into())
    }
}
