//! Database connection supervisor.
//!
//! Keeps the shared [`SeaOrmStore`] attached to a live connection: connect
//! with exponential backoff, migrate, attach, then ping on an interval and
//! start over after a failed ping.

use engine::SeaOrmStore;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tokio::sync::watch;

use std::time::Duration;

use crate::settings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    /// Delay before retrying after the `attempt`-th failure (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(20);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl From<&settings::Reconnect> for ReconnectPolicy {
    fn from(value: &settings::Reconnect) -> Self {
        Self {
            initial_backoff: Duration::from_millis(value.initial_backoff_ms),
            max_backoff: Duration::from_millis(value.max_backoff_ms),
            max_attempts: value.max_attempts,
        }
    }
}

pub struct Supervisor {
    store: SeaOrmStore,
    options: ConnectOptions,
    target: String,
    policy: ReconnectPolicy,
    health_interval: Duration,
}

impl Supervisor {
    pub fn new(store: SeaOrmStore, database: &settings::Database) -> Self {
        let mut options = ConnectOptions::new(database.url.clone());
        options
            .connect_timeout(Duration::from_secs(database.connect_timeout_secs))
            .acquire_timeout(database.request_timeout())
            .max_connections(database.max_connections)
            .sqlx_logging(false);

        Self {
            store,
            options,
            target: database.redacted_url(),
            policy: ReconnectPolicy::from(&database.reconnect),
            health_interval: Duration::from_secs(database.health_interval_secs.max(1)),
        }
    }

    /// Runs until `shutdown` flips to `true`. Outages never end the loop:
    /// the store stays detached while reconnecting.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            let Some(db) = self.connect(&mut shutdown).await else {
                return;
            };
            self.store.attach(db).await;
            tracing::info!("Database connected: {}", self.target);

            if !self.monitor(&mut shutdown).await {
                return;
            }
        }
    }

    /// `None` means shutdown was requested while retrying.
    ///
    /// Once the policy's attempts are used up, retries continue at
    /// `max_backoff`.
    async fn connect(&self, shutdown: &mut watch::Receiver<bool>) -> Option<DatabaseConnection> {
        let attempts = self.policy.attempts();
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            let err = match self.try_connect().await {
                Ok(db) => return Some(db),
                Err(err) => err,
            };

            let backoff = if attempt < attempts {
                self.policy.delay(attempt)
            } else {
                self.policy.max_backoff
            };

            if attempt == attempts {
                tracing::error!(
                    "Database {} still unreachable after {} attempts: {}. Retrying every {:?}",
                    self.target,
                    attempt,
                    err,
                    backoff
                );
            } else {
                tracing::warn!(
                    "Connection attempt {} to {} failed: {}. Retrying in {:?}",
                    attempt,
                    self.target,
                    err,
                    backoff
                );
            }

            tokio::select! {
                _ = shutdown.changed() => return None,
                _ = tokio::time::sleep(backoff) => {}
            }
        }
    }

    async fn try_connect(&self) -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect(self.options.clone()).await?;
        if let Err(err) = Migrator::up(&db, None).await {
            let _ = db.close().await;
            return Err(err);
        }
        Ok(db)
    }

    /// Returns `true` when the connection was lost and `false` on shutdown.
    async fn monitor(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let mut interval = tokio::time::interval(self.health_interval);
        interval.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.changed() => return false,
                _ = interval.tick() => {
                    let Err(err) = self.store.ping().await else {
                        continue;
                    };
                    tracing::warn!("Lost database connection: {err}");
                    if let Some(db) = self.store.detach().await {
                        let _ = db.close().await;
                    }
                    return true;
                }
            }
        }
    }
}
