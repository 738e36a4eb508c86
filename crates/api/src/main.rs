use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corner_api::auth::verifier::{IdentityVerifier, JwtSecretVerifier, SupabaseAuthVerifier};
use corner_api::config::ServerConfig;
use corner_api::router::build_app_router;
use corner_api::state::AppState;
use corner_db::{PgStore, RestStore, RowStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corner_api=debug,corner_db=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        demo_mode = config.demo.enabled,
        "Loaded server configuration",
    );

    // --- Upstream HTTP client ---
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    // --- Row store ---
    let store: Arc<dyn RowStore> = match &config.supabase.database_url {
        Some(database_url) => {
            let pool = corner_db::create_pool(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection pool created");

            corner_db::health_check(&pool)
                .await
                .context("Database health check failed")?;
            tracing::info!("Database health check passed");

            Arc::new(PgStore::new(pool))
        }
        None => Arc::new(RestStore::new(
            http.clone(),
            &config.supabase.url,
            config.supabase.service_key.clone(),
        )),
    };

    // --- Identity ---
    let identity: Arc<dyn IdentityVerifier> = match &config.supabase.jwt_secret {
        Some(secret) => Arc::new(JwtSecretVerifier::new(secret)),
        None => Arc::new(SupabaseAuthVerifier::new(
            http,
            &config.supabase.url,
            config.supabase.service_key.clone(),
        )),
    };
    tracing::info!(
        store = store.backend(),
        identity = identity.backend(),
        "Backends configured",
    );

    // --- App state ---
    let state = AppState {
        store,
        identity,
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
///
/// If a signal handler cannot be installed, that branch never resolves and
/// the other one still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
