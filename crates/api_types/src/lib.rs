use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod category {
    /// Categories offered to clients when recording a transaction.
    ///
    /// The list is advisory: the server stores any non-empty category.
    pub const CATEGORIES: [&str; 8] = [
        "fuel",
        "food",
        "medical",
        "shopping",
        "entertainment",
        "bills",
        "salary",
        "other",
    ];
}

pub mod health {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DatabaseState {
        Connected,
        Disconnected,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HealthResponse {
        /// Always `OK` while the process is able to answer.
        pub status: String,
        pub message: String,
        pub database: DatabaseState,
        pub timestamp: DateTime<Utc>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Division {
        Office,
        #[default]
        Personal,
    }

    /// Query string accepted by the list and summary endpoints.
    ///
    /// Every field is optional; empty values are treated as absent.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionQuery {
        pub category: Option<String>,
        /// `office` or `personal`.
        pub division: Option<String>,
        /// RFC3339 timestamp or `YYYY-MM-DD`. Overrides `view_type`.
        pub start_date: Option<String>,
        /// RFC3339 timestamp or `YYYY-MM-DD`. Overrides `view_type`.
        pub end_date: Option<String>,
        /// `weekly`, `monthly` or `yearly`. Anything else means `monthly`.
        pub view_type: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionNew {
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub amount: f64,
        pub description: String,
        pub category: Option<String>,
        pub division: Option<Division>,
        /// RFC3339 timestamp or `YYYY-MM-DD`. Defaults to the creation time.
        pub date: Option<String>,
        pub is_transfer: Option<bool>,
        pub transfer_to: Option<String>,
    }

    /// Partial update; absent fields keep their stored value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionUpdate {
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub amount: Option<f64>,
        pub description: Option<String>,
        pub category: Option<String>,
        pub division: Option<Division>,
        pub date: Option<String>,
        pub is_transfer: Option<bool>,
        pub transfer_to: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub amount: f64,
        pub description: String,
        pub category: Option<String>,
        pub division: Division,
        pub date: DateTime<Utc>,
        pub is_transfer: bool,
        pub transfer_to: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct Summary {
        pub income: f64,
        pub expense: f64,
        pub balance: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionDeleted {
        pub message: String,
    }
}
