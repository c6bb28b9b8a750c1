use chrono_tz::Tz;
use engine::{Engine, EngineError, SeaOrmStore};
use tokio::{sync::watch, task::JoinError};

use std::time::Duration;

use settings::Settings;
use supervisor::Supervisor;

mod settings;
mod shutdown;
mod supervisor;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("invalid settings: {0}")]
    Settings(#[from] config::ConfigError),
    #[error("unknown timezone \"{0}\"")]
    Timezone(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("background task failed: {0}")]
    Task(#[from] JoinError),
}

enum Stop {
    Signal,
    Server(Result<Result<(), std::io::Error>, JoinError>),
    Supervisor(Result<(), JoinError>),
}

fn joined<E: Into<BootstrapError>>(
    result: Result<Result<(), E>, JoinError>,
) -> Result<(), BootstrapError> {
    result?.map_err(Into::into)
}

#[tokio::main]
async fn main() -> Result<(), BootstrapError> {
    let settings = Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "money_manager={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let timezone: Tz = settings
        .app
        .timezone
        .parse()
        .map_err(|_| BootstrapError::Timezone(settings.app.timezone.clone()))?;

    let store = SeaOrmStore::new(settings.database.request_timeout());
    let engine = Engine::builder()
        .store(store.clone())
        .timezone(timezone)
        .build()
        .await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tracing::info!("Connecting to {}", settings.database.redacted_url());
    let supervisor = Supervisor::new(store.clone(), &settings.database);
    let mut supervisor_task = tokio::spawn(supervisor.run(shutdown_rx.clone()));

    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let mut server_task = tokio::spawn(server::run_with_listener(
        engine,
        listener,
        shutdown::requested(shutdown_rx),
    ));

    let stop = tokio::select! {
        _ = shutdown::signal() => Stop::Signal,
        result = &mut server_task => Stop::Server(result),
        result = &mut supervisor_task => Stop::Supervisor(result),
    };

    let _ = shutdown_tx.send(true);
    let grace = Duration::from_secs(settings.server.shutdown_grace_secs);

    let (server_result, supervisor_result) = match stop {
        Stop::Signal => (
            drain(server_task, grace).await,
            supervisor_task.await.map_err(BootstrapError::from),
        ),
        Stop::Server(result) => (
            joined(result),
            supervisor_task.await.map_err(BootstrapError::from),
        ),
        Stop::Supervisor(result) => {
            tracing::error!("Database supervisor stopped unexpectedly");
            (drain(server_task, grace).await, result.map_err(BootstrapError::from))
        }
    };

    store.close().await?;
    tracing::info!("Database connection closed");

    server_result.and(supervisor_result)
}

/// Wait for in-flight requests, giving up after `grace`.
async fn drain(
    mut server_task: tokio::task::JoinHandle<Result<(), std::io::Error>>,
    grace: Duration,
) -> Result<(), BootstrapError> {
    match tokio::time::timeout(grace, &mut server_task).await {
        Ok(result) => joined(result),
        Err(_) => {
            tracing::warn!("Shutdown grace period of {grace:?} elapsed, aborting requests");
            server_task.abort();
            Ok(())
        }
    }
}
