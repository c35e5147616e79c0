use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use super::{config::ServerConfig, state::DeploymentEnvironment};

const LOG_FILE_PREFIX: &str = "cr-user-backend.log";

/// Installs the global subscriber: stdout always, plus a daily-rolling JSON file
/// outside of local runs. The returned guard must live as long as the server.
pub fn init_logging(config: &ServerConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false);

    match config.deployment_environment {
        DeploymentEnvironment::Local => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .try_init()?;
            Ok(None)
        }
        _ => {
            std::fs::create_dir_all(&config.logs_dir)?;
            let file_appender = tracing_appender::rolling::daily(&config.logs_dir, LOG_FILE_PREFIX);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer().json().with_ansi(false).with_writer(file_writer);

            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .with(file_layer)
                .try_init()?;
            Ok(Some(guard))
        }
    }
}
