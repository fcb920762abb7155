use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vesta::auth::{PasswordHasher, TokenIssuer};
use vesta::mail::Mailer;
use vesta::server::router::{AppState, cms_router};
use vesta::storage::FileStore;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = vesta::config::Config::from_optional_toml();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    if cfg.auth.jwt_secret.trim().is_empty() {
        return Err("auth.jwt_secret must be set and non-empty (config.toml)".into());
    }

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        upload_dir = %cfg.upload.dir.display(),
        max_upload_mb = cfg.upload.max_size_mb,
        mail_enabled = cfg.mail.enabled,
    );

    let db = vesta::db::spawn(&cfg.basic.database_url).await;
    let store = Arc::new(FileStore::new(&cfg.upload).await?);
    let passwords = PasswordHasher::new();
    let tokens = TokenIssuer::new(cfg.auth.jwt_secret.clone(), cfg.auth.token_ttl_hours);
    let mailer = Mailer::new(&cfg.mail);

    vesta::bootstrap::ensure_admin(&db, &passwords, &cfg.auth).await?;

    let state = AppState::new(db, store, tokens, passwords, mailer);
    let app = cms_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { /* ... */ },
        _ = terminate => { /* ... */ },
    }
}
