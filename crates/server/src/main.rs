//! menlog server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use fred::interfaces::ClientLike;
use menlog_api::{AppState, app};
use menlog_common::{Config, LocalStorage, ShopInfoCache, config::RedisConfig};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Connect the shop-info cache. Redis being unreachable only disables caching.
async fn connect_shop_info_cache(redis: &RedisConfig) -> Option<ShopInfoCache> {
    let fred_config = match fred::types::config::Config::from_url(&redis.url) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Invalid Redis URL, shop info caching disabled");
            return None;
        }
    };

    let client = fred::clients::Client::new(fred_config, None, None, None);
    client.connect();
    if let Err(e) = client.wait_for_connect().await {
        warn!(error = %e, "Redis unavailable, shop info caching disabled");
        return None;
    }

    info!("Connected to Redis");
    Some(ShopInfoCache::new(Arc::new(client), redis.prefix.clone()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menlog=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting menlog server...");

    let config = match std::env::var("MENLOG_CONFIG") {
        Ok(path) => Config::from_file(path)?,
        Err(_) => Config::load()?,
    };

    let db = menlog_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    menlog_db::migrate(&db).await?;
    info!("Migrations completed");

    let shop_info_cache = match &config.redis {
        Some(redis) => connect_shop_info_cache(redis).await,
        None => {
            info!("No Redis configured, shop info caching disabled");
            None
        }
    };

    let storage = Arc::new(LocalStorage::new(
        config.storage.base_path.clone(),
        config.storage.base_url.clone(),
    ));

    let state = AppState::new(Arc::new(db), &config, storage, shop_info_cache);

    let mut app = app(state);
    // Serve uploads ourselves unless they live behind an external URL.
    let files_prefix = config.storage.base_url.trim_matches('/');
    if config.storage.base_url.starts_with('/') && !files_prefix.is_empty() {
        app = app.nest_service(
            &format!("/{files_prefix}"),
            ServeDir::new(&config.storage.base_path),
        );
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let ip: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(ip, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
