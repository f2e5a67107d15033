use std::sync::Arc;

use identity_api::{
    build_app, builtin_entities, resolve, AppState, JwtVerifier, MemoryRepository, PgRepository, Repository, Settings,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("identity_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let catalog = resolve(&builtin_entities())?;
    tracing::info!(entities = catalog.entities().len(), "catalog resolved");

    let repository: Arc<dyn Repository> = match &settings.database_url {
        Some(url) => Arc::new(PgRepository::connect(url, &settings).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on exit");
            Arc::new(MemoryRepository::new())
        }
    };

    let state = AppState {
        repository,
        catalog: Arc::new(catalog),
        verifier: Arc::new(JwtVerifier::new(&settings.jwt)?),
    };

    let app = build_app(state, &settings);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("identity-api listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
