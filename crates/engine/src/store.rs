//! Storage collaborator of the engine.
//!
//! The engine only talks to storage through [`TransactionStore`]. The
//! production implementation, [`SeaOrmStore`], wraps a sea-orm connection that
//! may be attached and detached at runtime by a connection supervisor: while
//! detached every call fails fast with [`EngineError::Unavailable`].

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, QueryOrder, QuerySelect, prelude::*};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction,
    filter::{ApplyTxFilters, TransactionFilter},
    transactions,
};

/// Upper bound for a single storage call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const NOT_CONNECTED: &str = "database connection not available";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreStatus {
    Connected,
    Disconnected,
}

#[async_trait]
pub trait TransactionStore: Send + Sync + std::fmt::Debug {
    async fn insert(&self, tx: &Transaction) -> ResultEngine<()>;

    async fn find_by_id(&self, id: Uuid) -> ResultEngine<Option<Transaction>>;

    /// Matching transactions, newest `date` first, at most `limit` of them.
    async fn find_many(
        &self,
        filter: &TransactionFilter,
        limit: Option<u64>,
    ) -> ResultEngine<Vec<Transaction>>;

    /// Overwrite the stored record. Returns `None` if `id` does not exist.
    async fn update_by_id(&self, id: Uuid, tx: &Transaction) -> ResultEngine<Option<Transaction>>;

    /// Returns `false` if `id` does not exist.
    async fn delete_by_id(&self, id: Uuid) -> ResultEngine<bool>;

    async fn status(&self) -> StoreStatus;
}

#[derive(Clone, Debug)]
pub struct SeaOrmStore {
    connection: Arc<RwLock<Option<DatabaseConnection>>>,
    request_timeout: Duration,
}

impl Default for SeaOrmStore {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

impl SeaOrmStore {
    /// A store without a connection. Attach one with [`SeaOrmStore::attach`].
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            connection: Arc::new(RwLock::new(None)),
            request_timeout,
        }
    }

    pub fn with_connection(db: DatabaseConnection, request_timeout: Duration) -> Self {
        Self {
            connection: Arc::new(RwLock::new(Some(db))),
            request_timeout,
        }
    }

    pub async fn attach(&self, db: DatabaseConnection) {
        *self.connection.write().await = Some(db);
    }

    /// Drop the current connection, returning it so the caller can close it.
    pub async fn detach(&self) -> Option<DatabaseConnection> {
        self.connection.write().await.take()
    }

    pub async fn is_attached(&self) -> bool {
        self.connection.read().await.is_some()
    }

    /// Round trip to the database, bounded by the request timeout.
    pub async fn ping(&self) -> ResultEngine<()> {
        let db = self.connection().await?;
        self.timed(async move { db.ping().await }).await
    }

    /// Detach and close the connection, if any.
    pub async fn close(&self) -> ResultEngine<()> {
        if let Some(db) = self.detach().await {
            db.close().await?;
        }
        Ok(())
    }

    async fn connection(&self) -> ResultEngine<DatabaseConnection> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or_else(|| EngineError::Unavailable(NOT_CONNECTED.to_string()))
    }

    async fn timed<T, F>(&self, fut: F) -> ResultEngine<T>
    where
        F: Future<Output = Result<T, DbErr>>,
    {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::warn!(
                    "database call exceeded {} ms",
                    self.request_timeout.as_millis()
                );
                Err(EngineError::Unavailable(
                    "database did not answer in time".to_string(),
                ))
            }
        }
    }
}

#[async_trait]
impl TransactionStore for SeaOrmStore {
    async fn insert(&self, tx: &Transaction) -> ResultEngine<()> {
        let db = self.connection().await?;
        let model = transactions::ActiveModel::from(tx);
        self.timed(async move { model.insert(&db).await }).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> ResultEngine<Option<Transaction>> {
        let db = self.connection().await?;
        self.timed(async move {
            transactions::Entity::find_by_id(id.to_string())
                .one(&db)
                .await
        })
        .await?
        .map(Transaction::try_from)
        .transpose()
    }

    async fn find_many(
        &self,
        filter: &TransactionFilter,
        limit: Option<u64>,
    ) -> ResultEngine<Vec<Transaction>> {
        let db = self.connection().await?;
        let mut query = transactions::Entity::find()
            .apply_tx_filters(filter)
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        self.timed(async move { query.all(&db).await })
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    async fn update_by_id(&self, id: Uuid, tx: &Transaction) -> ResultEngine<Option<Transaction>> {
        let db = self.connection().await?;
        let mut model = transactions::ActiveModel::from(tx);
        model.id = sea_orm::ActiveValue::Unchanged(id.to_string());

        self.timed(async move {
            match model.update(&db).await {
                Ok(model) => Ok(Some(model)),
                Err(DbErr::RecordNotUpdated) => Ok(None),
                Err(err) => Err(err),
            }
        })
        .await?
        .map(Transaction::try_from)
        .transpose()
    }

    async fn delete_by_id(&self, id: Uuid) -> ResultEngine<bool> {
        let db = self.connection().await?;
        let result = self
            .timed(async move {
                transactions::Entity::delete_by_id(id.to_string())
                    .exec(&db)
                    .await
            })
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn status(&self) -> StoreStatus {
        match self.ping().await {
            Ok(()) => StoreStatus::Connected,
            Err(_) => StoreStatus::Disconnected,
        }
    }
}
