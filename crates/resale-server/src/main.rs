use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use resale_api::auth::{AppState, AppStateInner};
use resale_api::config::Config;
use resale_api::uploads::UploadStore;
use resale_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resale=debug,resale_api=debug,resale_db=debug,tower_http=debug".into()),
        )
        .init();

    // Config (loads .env if present)
    let config = Config::from_env()?;
    if let Err(e) = config.check_secret() {
        eprintln!("FATAL: {}.", e);
        eprintln!("       Set RESALE_JWT_SECRET in your .env file and restart.");
        std::process::exit(1);
    }

    // Init storage
    let db = Database::open(&config.db_path)?;
    let uploads = UploadStore::new(config.upload_dir.clone()).await?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret.clone(),
        token_ttl: config.token_ttl(),
        uploads,
    });

    let app = resale_api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Resale server listening on {}", addr);
    info!("Admin tokens expire after {} minutes", config.token_ttl_minutes);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(signal) => signal,
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
