use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    Division, EngineError, ResultEngine, Transaction, TransactionDraft, TransactionPatch,
    edit_window::can_edit,
    filter::TransactionFilter,
    summary::{Summary, summarize},
    window::{ViewType, resolve},
};

use super::Engine;

/// Maximum number of transactions returned by a listing.
pub const LIST_LIMIT: u64 = 1000;

/// Caller supplied scope of a listing or summary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub view: ViewType,
    /// Overrides `view` when present.
    pub start: Option<DateTime<Utc>>,
    /// Overrides `view` when present.
    pub end: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub division: Option<Division>,
}

impl Engine {
    fn filter_for(&self, query: &TransactionQuery, now: DateTime<Utc>) -> TransactionFilter {
        let window = resolve(query.view, query.start, query.end, now, self.timezone);
        TransactionFilter::new(window, query.category.as_deref(), query.division)
    }

    /// Lists transactions in the query window, newest first, capped at
    /// [`LIST_LIMIT`].
    pub async fn list_transactions(
        &self,
        query: &TransactionQuery,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<Transaction>> {
        let filter = self.filter_for(query, now);
        self.store.find_many(&filter, Some(LIST_LIMIT)).await
    }

    /// Income, expense and balance over every transaction in the query
    /// window. Not subject to [`LIST_LIMIT`].
    pub async fn transactions_summary(
        &self,
        query: &TransactionQuery,
        now: DateTime<Utc>,
    ) -> ResultEngine<Summary> {
        let filter = self.filter_for(query, now);
        let transactions = self.store.find_many(&filter, None).await?;
        Ok(summarize(&transactions))
    }

    /// Validates and stores a new transaction created at `now`.
    pub async fn create_transaction(
        &self,
        draft: TransactionDraft,
        now: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        let tx = Transaction::new(draft, now)?;
        self.store.insert(&tx).await?;
        tracing::debug!("created transaction {}", tx.id);
        Ok(tx)
    }

    /// Applies `patch` to a transaction still inside its edit window.
    pub async fn update_transaction(
        &self,
        id: Uuid,
        patch: TransactionPatch,
        now: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        let existing = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;

        if !can_edit(existing.created_at, now) {
            return Err(EngineError::Forbidden(
                "cannot edit transaction after 12 hours".to_string(),
            ));
        }

        let updated = existing.patched(patch, now)?;
        self.store
            .update_by_id(id, &updated)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }

    /// Removes a transaction regardless of its age.
    pub async fn delete_transaction(&self, id: Uuid) -> ResultEngine<()> {
        if !self.store.delete_by_id(id).await? {
            return Err(EngineError::KeyNotFound(id.to_string()));
        }
        tracing::debug!("deleted transaction {id}");
        Ok(())
    }
}
