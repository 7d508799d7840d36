// src/middleware/cors.rs

use axum::http::{header, request::Parts, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// CORS com lista de origens permitidas.
///
/// Origem fora da lista não aborta a requisição: só não recebe os cabeçalhos
/// permissivos, e o navegador bloqueia a resposta.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, parts: &Parts| {
                let ok = allowed.contains(origin);
                if !ok {
                    tracing::warn!(
                        "[CORS] Origem {:?} não permitida ({} {})",
                        origin,
                        parts.method,
                        parts.uri.path()
                    );
                }
                ok
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
