use std::sync::Arc;

use chrono_tz::Tz;

use crate::{
    ResultEngine,
    store::{SeaOrmStore, StoreStatus, TransactionStore},
};

mod transactions;

pub use transactions::{LIST_LIMIT, TransactionQuery};

#[derive(Debug)]
pub struct Engine {
    store: Arc<dyn TransactionStore>,
    timezone: Tz,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Connectivity of the underlying store.
    pub async fn store_status(&self) -> StoreStatus {
        self.store.status().await
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    store: Arc<dyn TransactionStore>,
    timezone: Tz,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            store: Arc::new(SeaOrmStore::default()),
            timezone: Tz::UTC,
        }
    }
}

impl EngineBuilder {
    /// Pass the storage backend
    pub fn store(mut self, store: impl TransactionStore + 'static) -> EngineBuilder {
        self.store = Arc::new(store);
        self
    }

    /// Timezone for weekly/monthly/yearly windows (default UTC)
    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = timezone;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            store: self.store,
            timezone: self.timezone,
        })
    }
}
