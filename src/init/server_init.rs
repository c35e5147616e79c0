use std::net::SocketAddr;
use std::sync::Arc;

use diesel::prelude::QueryableByName;
use diesel_async::RunQueryDsl;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;
use tokio::signal;
use tracing::info;

use crate::routers::main_router::build_router;
use crate::services::user_service::UserService;

use super::config::{DbConfig, ServerConfig};
use super::logging::init_logging;
use super::state::ServerState;

pub async fn server_init_proc(start: tokio::time::Instant) -> anyhow::Result<()> {
    let num_cores: u32 = num_cpus::get_physical() as u32;

    if std::env::var("IS_AWS").is_err() {
        dotenvy::dotenv()?;
    }

    let server_config = ServerConfig::from_env()?;
    let _log_guard = init_logging(&server_config)?;

    info!(
        env = server_config.deployment_environment.as_str(),
        cores = num_cores,
        "Initializing server..."
    );

    let db_url = DbConfig::from_env()?.to_url();

    let pool_config = AsyncDieselConnectionManager::<diesel_async::AsyncPgConnection>::new(db_url);

    let pool = Pool::builder()
        .min_idle(Some(num_cores))
        .max_size(num_cores * 10u32)
        .build(pool_config)
        .await?;

    let mut conn = pool.get().await?;

    #[derive(QueryableByName)]
    struct PgVersion {
        #[diesel(sql_type = diesel::sql_types::Text)]
        version: String,
    }

    let pg_version: PgVersion = diesel::sql_query("SELECT version()")
        .get_result(&mut conn)
        .await?;

    info!("PostgreSQL version: {}", pg_version.version);

    drop(conn);

    let state = Arc::new(
        ServerState::builder()
            .app_name_version(format!(
                "{} {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .server_start_time(start)
            .deployment_environment(server_config.deployment_environment)
            .user_service(UserService::new(pool))
            .build()?,
    );

    let listener = tokio::net::TcpListener::bind(server_config.socket_addr()).await?;

    info!(
        addr = %server_config.socket_addr(),
        elapsed = ?start.elapsed(),
        "Backend server starting..."
    );
    axum::serve(
        listener,
        build_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shut down.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
