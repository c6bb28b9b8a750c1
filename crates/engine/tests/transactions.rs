use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    DEFAULT_REQUEST_TIMEOUT, Division, Engine, EngineError, LIST_LIMIT, SeaOrmStore, StoreStatus,
    Summary, TransactionDraft, TransactionKind, TransactionPatch, TransactionQuery, ViewType,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .store(SeaOrmStore::with_connection(
            db.clone(),
            DEFAULT_REQUEST_TIMEOUT,
        ))
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap()
}

fn draft(kind: TransactionKind, amount: f64, category: &str) -> TransactionDraft {
    TransactionDraft {
        kind,
        amount,
        description: format!("{category} entry"),
        category: Some(category.to_string()),
        division: None,
        date: None,
        is_transfer: false,
        transfer_to: None,
    }
}

fn lunch() -> TransactionDraft {
    TransactionDraft {
        kind: TransactionKind::Expense,
        amount: 42.50,
        description: "lunch".to_string(),
        category: Some("food".to_string()),
        division: Some(Division::Personal),
        date: None,
        is_transfer: false,
        transfer_to: None,
    }
}

#[tokio::test]
async fn lunch_shows_up_in_list_and_monthly_summary() {
    let (engine, _db) = engine_with_db().await;

    let created = engine.create_transaction(lunch(), now()).await.unwrap();

    let listed = engine
        .list_transactions(&TransactionQuery::default(), now())
        .await
        .unwrap();
    assert_eq!(listed, vec![created]);

    let summary = engine
        .transactions_summary(&TransactionQuery::default(), now())
        .await
        .unwrap();
    assert_eq!(
        summary,
        Summary {
            income: 0.0,
            expense: 42.50,
            balance: -42.50,
        }
    );
}

#[tokio::test]
async fn create_enforces_invariants() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_transaction(draft(TransactionKind::Expense, -1.0, "food"), now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let zero = engine
        .create_transaction(draft(TransactionKind::Expense, 0.0, "food"), now())
        .await
        .unwrap();
    assert_eq!(zero.amount, 0.0);

    let transfer = TransactionDraft {
        category: None,
        is_transfer: true,
        transfer_to: Some("savings".to_string()),
        ..lunch()
    };
    let stored = engine.create_transaction(transfer, now()).await.unwrap();
    assert!(stored.is_transfer());
    assert_eq!(stored.category(), None);

    let uncategorized = TransactionDraft {
        category: None,
        ..lunch()
    };
    let err = engine
        .create_transaction(uncategorized, now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let listed = engine
        .list_transactions(&TransactionQuery::default(), now())
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn list_is_newest_first_and_filtered() {
    let (engine, _db) = engine_with_db().await;

    for (days_ago, category, division) in [
        (3, "food", Division::Personal),
        (1, "fuel", Division::Office),
        (2, "food", Division::Office),
    ] {
        let draft = TransactionDraft {
            date: Some(now() - Duration::days(days_ago)),
            division: Some(division),
            ..draft(TransactionKind::Expense, 10.0, category)
        };
        engine.create_transaction(draft, now()).await.unwrap();
    }

    let all = engine
        .list_transactions(&TransactionQuery::default(), now())
        .await
        .unwrap();
    let dates: Vec<_> = all.iter().map(|tx| tx.date).collect();
    assert_eq!(
        dates,
        vec![
            now() - Duration::days(1),
            now() - Duration::days(2),
            now() - Duration::days(3),
        ]
    );

    let food = engine
        .list_transactions(
            &TransactionQuery {
                category: Some("food".to_string()),
                ..Default::default()
            },
            now(),
        )
        .await
        .unwrap();
    assert_eq!(food.len(), 2);

    let office_food = engine
        .list_transactions(
            &TransactionQuery {
                category: Some("food".to_string()),
                division: Some(Division::Office),
                ..Default::default()
            },
            now(),
        )
        .await
        .unwrap();
    assert_eq!(office_food.len(), 1);
    assert_eq!(office_food[0].date, now() - Duration::days(2));

    let blank_category = engine
        .list_transactions(
            &TransactionQuery {
                category: Some(String::new()),
                ..Default::default()
            },
            now(),
        )
        .await
        .unwrap();
    assert_eq!(blank_category.len(), 3);
}

#[tokio::test]
async fn windows_scope_list_and_summary() {
    let (engine, _db) = engine_with_db().await;

    let last_year = TransactionDraft {
        date: Some(now() - Duration::days(400)),
        ..draft(TransactionKind::Income, 500.0, "salary")
    };
    let earlier_this_year = TransactionDraft {
        date: Some(Utc.with_ymd_and_hms(2024, 1, 20, 9, 0, 0).unwrap()),
        ..draft(TransactionKind::Income, 1000.0, "salary")
    };
    let this_week = TransactionDraft {
        date: Some(now() - Duration::days(1)),
        ..draft(TransactionKind::Expense, 30.0, "fuel")
    };
    for draft in [last_year, earlier_this_year, this_week] {
        engine.create_transaction(draft, now()).await.unwrap();
    }

    let weekly = TransactionQuery {
        view: ViewType::Weekly,
        ..Default::default()
    };
    assert_eq!(
        engine.list_transactions(&weekly, now()).await.unwrap().len(),
        1
    );

    let yearly = TransactionQuery {
        view: ViewType::Yearly,
        ..Default::default()
    };
    assert_eq!(
        engine.transactions_summary(&yearly, now()).await.unwrap(),
        Summary {
            income: 1000.0,
            expense: 30.0,
            balance: 970.0,
        }
    );

    let explicit = TransactionQuery {
        view: ViewType::Weekly,
        start: Some(now() - Duration::days(500)),
        ..Default::default()
    };
    assert_eq!(
        engine.list_transactions(&explicit, now()).await.unwrap().len(),
        3
    );

    let until = TransactionQuery {
        end: Some(now() - Duration::days(300)),
        ..Default::default()
    };
    let old = engine.list_transactions(&until, now()).await.unwrap();
    assert_eq!(old.len(), 1);
    assert_eq!(old[0].amount, 500.0);
}

#[tokio::test]
async fn update_within_window_merges_fields() {
    let (engine, _db) = engine_with_db().await;
    let created = engine.create_transaction(lunch(), now()).await.unwrap();
    let later = now() + Duration::hours(11) + Duration::minutes(59);

    let updated = engine
        .update_transaction(
            created.id,
            TransactionPatch {
                amount: Some(38.0),
                description: Some(" lunch with team ".to_string()),
                division: Some(Division::Office),
                ..Default::default()
            },
            later,
        )
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.amount, 38.0);
    assert_eq!(updated.description, "lunch with team");
    assert_eq!(updated.division, Division::Office);
    assert_eq!(updated.category(), Some("food"));
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.updated_at, later);

    let listed = engine
        .list_transactions(&TransactionQuery::default(), later)
        .await
        .unwrap();
    assert_eq!(listed, vec![updated]);
}

#[tokio::test]
async fn update_rejects_invalid_patch() {
    let (engine, _db) = engine_with_db().await;
    let created = engine.create_transaction(lunch(), now()).await.unwrap();

    let err = engine
        .update_transaction(
            created.id,
            TransactionPatch {
                category: Some(" ".to_string()),
                ..Default::default()
            },
            now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn stale_update_is_forbidden_but_delete_is_not() {
    let (engine, _db) = engine_with_db().await;
    let created_at = now() - Duration::hours(13);
    let created = engine.create_transaction(lunch(), created_at).await.unwrap();

    let err = engine
        .update_transaction(
            created.id,
            TransactionPatch {
                amount: Some(1.0),
                ..Default::default()
            },
            now(),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("cannot edit transaction after 12 hours".to_string())
    );

    engine.delete_transaction(created.id).await.unwrap();

    let err = engine.delete_transaction(created.id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound(created.id.to_string()));
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (engine, _db) = engine_with_db().await;
    let id = Uuid::new_v4();

    let err = engine
        .update_transaction(id, TransactionPatch::default(), now())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound(id.to_string()));

    let err = engine.delete_transaction(id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound(id.to_string()));
}

#[tokio::test]
async fn detached_store_reports_unavailable() {
    let (connected, db) = engine_with_db().await;
    assert_eq!(connected.store_status().await, StoreStatus::Connected);

    let store = SeaOrmStore::with_connection(db, DEFAULT_REQUEST_TIMEOUT);
    let engine = Engine::builder()
        .store(store.clone())
        .build()
        .await
        .unwrap();
    store.detach().await;

    assert_eq!(engine.store_status().await, StoreStatus::Disconnected);
    let err = engine
        .list_transactions(&TransactionQuery::default(), now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unavailable(_)));
    let err = engine.create_transaction(lunch(), now()).await.unwrap_err();
    assert!(matches!(err, EngineError::Unavailable(_)));
}

#[tokio::test]
async fn list_is_capped_but_summary_is_not() {
    let (engine, _db) = engine_with_db().await;

    for _ in 0..=LIST_LIMIT {
        engine
            .create_transaction(draft(TransactionKind::Income, 1.0, "salary"), now())
            .await
            .unwrap();
    }

    let listed = engine
        .list_transactions(&TransactionQuery::default(), now())
        .await
        .unwrap();
    assert_eq!(listed.len() as u64, LIST_LIMIT);
    assert_eq!(listed.len(), 1000);

    let summary = engine
        .transactions_summary(&TransactionQuery::default(), now())
        .await
        .unwrap();
    assert_eq!(summary.income, 1001.0);
    assert_eq!(summary.balance, 1001.0);
}
