//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use preorder_backend::{
    config::{AppState, Config},
    router,
};

#[tokio::main]
async fn main() {
    // Logger: RUST_LOG tem prioridade, senão "info"
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env().expect("Configuração inválida.");
    let port = config.port;

    let app_state = AppState::new(config)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    tracing::info!("🌐 Origens permitidas (CORS): {:?}", app_state.config.allowed_origins);
    if app_state.config.product_writes_require_admin {
        tracing::info!("🔒 Escrita de produtos restrita a admins");
    }

    let app = router::app(app_state);

    // Inicia o servidor
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
