use notes_api::{AppState, config, repository::PgRepository, router};

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Pick up a local .env before reading any configuration
    dotenvy::dotenv().ok();

    // Log setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        panic!("failed to locate or load config: {e}");
    });
    tracing::info!(
        "Successfully loaded notes API config ({:?} environment)",
        cfg.environment
    );

    // Repository creation and migration
    let mut repo = PgRepository::new(&cfg.database_dsn)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to establish database connection: {e}");
            panic!("failed to establish database connection: {e}");
        });

    repo.migrate().await.unwrap_or_else(|e| {
        tracing::error!("Failed to migrate database: {e}");
        panic!("failed to migrate database: {e}");
    });

    let repo = Arc::new(repo);

    // Router config
    let state = AppState::new(repo.clone(), repo, &cfg.jwt_secret, cfg.environment);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind to port {}: {e}", cfg.port);
            panic!("failed to bind to port {}: {e}", cfg.port);
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Notes API starting, listening on {}", addr),
        Err(e) => tracing::warn!("Notes API starting, local address unavailable: {e}"),
    }

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("HTTP server error: {e}");
        panic!("failed to run HTTP server: {e}");
    }
}
