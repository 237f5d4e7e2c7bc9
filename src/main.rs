use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use daymark_api::auth::bootstrap::ensure_admin;
use daymark_api::config::Config;
use daymark_api::db::{self, FullRepository, InMemoryRepository, PgRepository};
use daymark_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daymark_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);

    let repo: Arc<dyn FullRepository> = if config.uses_memory_store() {
        tracing::warn!("Using the in-memory store; data is lost on restart");
        Arc::new(InMemoryRepository::new())
    } else {
        let pool = db::pool::create_pool(&config.database_url)
            .await
            .context("Failed to connect to the database")?;
        db::pool::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        tracing::info!("Database migrations applied");
        Arc::new(PgRepository::new(pool))
    };

    if let Some(admin) = &config.admin {
        ensure_admin(repo.as_ref(), admin)
            .await
            .context("Failed to bootstrap the admin account")?;
    }

    let state = AppState::new(repo, config.clone());
    state.login_throttle.spawn_pruner();

    let app = create_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
