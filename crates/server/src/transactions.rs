//! Transactions API endpoints

use api_types::transaction::{
    Division as ApiDivision, Summary, TransactionDeleted, TransactionKind as ApiKind,
    TransactionNew, TransactionQuery, TransactionUpdate, TransactionView,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Expense => ApiKind::Expense,
    }
}

fn engine_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
    }
}

fn map_division(division: engine::Division) -> ApiDivision {
    match division {
        engine::Division::Office => ApiDivision::Office,
        engine::Division::Personal => ApiDivision::Personal,
    }
}

fn engine_division(division: ApiDivision) -> engine::Division {
    match division {
        ApiDivision::Office => engine::Division::Office,
        ApiDivision::Personal => engine::Division::Personal,
    }
}

fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: map_kind(tx.kind),
        amount: tx.amount,
        category: tx.category().map(ToString::to_string),
        is_transfer: tx.is_transfer(),
        description: tx.description,
        division: map_division(tx.division),
        date: tx.date,
        transfer_to: tx.transfer_to,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(value: Option<&str>) -> Result<Option<DateTime<Utc>>, ServerError> {
    Ok(non_blank(value).map(engine::parse_instant).transpose()?)
}

fn engine_query(query: TransactionQuery) -> Result<engine::TransactionQuery, ServerError> {
    let division = non_blank(query.division.as_deref())
        .map(engine::Division::try_from)
        .transpose()?;

    Ok(engine::TransactionQuery {
        view: engine::ViewType::from_param(query.view_type.as_deref()),
        start: parse_date(query.start_date.as_deref())?,
        end: parse_date(query.end_date.as_deref())?,
        category: query.category,
        division,
    })
}

fn transaction_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ServerError> {
    path.map(|Path(id)| id)
        .map_err(|_| ServerError::Generic("invalid transaction id".to_string()))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ServerError::Generic(rejection.body_text()))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let query = engine_query(query)?;
    let transactions = state
        .engine
        .list_transactions(&query, Utc::now())
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();

    Ok(Json(transactions))
}

pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Summary>, ServerError> {
    let query = engine_query(query)?;
    let summary = state
        .engine
        .transactions_summary(&query, Utc::now())
        .await?;

    Ok(Json(Summary {
        income: summary.income,
        expense: summary.expense,
        balance: summary.balance,
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let payload = json_body(payload)?;
    let draft = engine::TransactionDraft {
        kind: engine_kind(payload.kind),
        amount: payload.amount,
        description: payload.description,
        category: payload.category,
        division: payload.division.map(engine_division),
        date: parse_date(payload.date.as_deref())?,
        is_transfer: payload.is_transfer.unwrap_or(false),
        transfer_to: payload.transfer_to,
    };

    let tx = state.engine.create_transaction(draft, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(map_transaction(tx))))
}

pub async fn update(
    State(state): State<ServerState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TransactionUpdate>, JsonRejection>,
) -> Result<Json<TransactionView>, ServerError> {
    let id = transaction_id(path)?;
    let payload = json_body(payload)?;
    let patch = engine::TransactionPatch {
        kind: payload.kind.map(engine_kind),
        amount: payload.amount,
        description: payload.description,
        category: payload.category,
        division: payload.division.map(engine_division),
        date: parse_date(payload.date.as_deref())?,
        is_transfer: payload.is_transfer,
        transfer_to: payload.transfer_to,
    };

    let tx = state
        .engine
        .update_transaction(id, patch, Utc::now())
        .await?;

    Ok(Json(map_transaction(tx)))
}

pub async fn delete(
    State(state): State<ServerState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TransactionDeleted>, ServerError> {
    let id = transaction_id(path)?;
    state.engine.delete_transaction(id).await?;

    Ok(Json(TransactionDeleted {
        message: "Transaction deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_values_are_absent() {
        let query = engine_query(TransactionQuery {
            category: Some(String::new()),
            division: Some(" ".to_string()),
            start_date: Some(String::new()),
            end_date: None,
            view_type: Some("weekly".to_string()),
        })
        .unwrap();

        assert_eq!(query.view, engine::ViewType::Weekly);
        assert_eq!(query.start, None);
        assert_eq!(query.division, None);
    }

    #[test]
    fn unknown_division_is_rejected() {
        let err = engine_query(TransactionQuery {
            division: Some("family".to_string()),
            ..Default::default()
        })
        .unwrap_err();

        assert!(matches!(
            err,
            ServerError::Engine(engine::EngineError::Validation(_))
        ));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let err = engine_query(TransactionQuery {
            end_date: Some("31/01/2024".to_string()),
            ..Default::default()
        })
        .unwrap_err();

        assert!(matches!(
            err,
            ServerError::Engine(engine::EngineError::Validation(_))
        ));
    }
}
