use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use forumx_server::config::AppConfig;
use forumx_server::database::client::{Database, DbConfig};
use forumx_server::init;
use forumx_server::middleware::error::{AppError, AppResult};
use forumx_server::middleware::mw_ctx;
use forumx_server::utils::clock::SystemClock;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("forumx_server=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let db = Database::connect(DbConfig {
        url: &config.db_url,
        database: &config.db_database,
        namespace: &config.db_namespace,
        username: config.db_username.as_deref(),
        password: config.db_password.as_deref(),
    })
    .await?;
    db.run_migrations().await?;

    let ctx_state = mw_ctx::create_ctx_state(db, &config, Arc::new(SystemClock));
    let routes_all = init::main_router(&ctx_state);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Generic {
            description: format!("bind {addr}: {e}"),
        })?;
    info!("->> LISTENING on {addr}");

    axum::serve(listener, routes_all.into_make_service())
        .await
        .map_err(|e| AppError::Generic {
            description: e.to_string(),
        })
}
