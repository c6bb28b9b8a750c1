//! Transaction primitives.
//!
//! A `Transaction` is a single income or expense booked on the office or the
//! personal ledger. Incoming data travels as a [`TransactionDraft`] (create)
//! or a [`TransactionPatch`] (update) and only becomes a `Transaction` once
//! every invariant holds.

use chrono::{DateTime, SubsecRound, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{normalize_optional_text, normalize_required_text, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::Validation(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

/// The ledger a transaction belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Division {
    Office,
    #[default]
    Personal,
}

impl Division {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Personal => "personal",
        }
    }
}

impl TryFrom<&str> for Division {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "office" => Ok(Self::Office),
            "personal" => Ok(Self::Personal),
            other => Err(EngineError::Validation(format!("invalid division: {other}"))),
        }
    }
}

/// Whether a transaction is a regular categorized booking or a transfer
/// between accounts. Only transfers may lack a category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    Categorized { category: String },
    Transfer { category: Option<String> },
}

impl Classification {
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Categorized { category } => Some(category),
            Self::Transfer { category } => category.as_deref(),
        }
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::Transfer { .. })
    }

    fn new(is_transfer: bool, category: Option<String>) -> ResultEngine<Self> {
        if is_transfer {
            return Ok(Self::Transfer { category });
        }
        let category = category.ok_or_else(|| {
            EngineError::Validation("category is required unless isTransfer is true".to_string())
        })?;
        Ok(Self::Categorized { category })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub classification: Classification,
    pub division: Division,
    pub date: DateTime<Utc>,
    pub transfer_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a transaction before validation.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub category: Option<String>,
    pub division: Option<Division>,
    /// Defaults to the creation time.
    pub date: Option<DateTime<Utc>>,
    pub is_transfer: bool,
    pub transfer_to: Option<String>,
}

/// Fields to overwrite on an existing transaction. `None` keeps the stored
/// value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionPatch {
    pub kind: Option<TransactionKind>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub division: Option<Division>,
    pub date: Option<DateTime<Utc>>,
    pub is_transfer: Option<bool>,
    pub transfer_to: Option<String>,
}

impl Transaction {
    /// Validates `draft` and stamps a fresh id plus creation timestamps.
    pub fn new(draft: TransactionDraft, now: DateTime<Utc>) -> ResultEngine<Self> {
        Self::from_draft(Uuid::new_v4(), draft, now, now)
    }

    /// Merges `patch` over `self` and validates the result again.
    ///
    /// `id` and `created_at` are preserved, `updated_at` becomes `now`.
    pub fn patched(&self, patch: TransactionPatch, now: DateTime<Utc>) -> ResultEngine<Self> {
        let draft = TransactionDraft {
            kind: patch.kind.unwrap_or(self.kind),
            amount: patch.amount.unwrap_or(self.amount),
            description: patch
                .description
                .unwrap_or_else(|| self.description.clone()),
            category: patch
                .category
                .or_else(|| self.classification.category().map(ToString::to_string)),
            division: Some(patch.division.unwrap_or(self.division)),
            date: Some(patch.date.unwrap_or(self.date)),
            is_transfer: patch
                .is_transfer
                .unwrap_or_else(|| self.classification.is_transfer()),
            transfer_to: patch.transfer_to.or_else(|| self.transfer_to.clone()),
        };
        Self::from_draft(self.id, draft, self.created_at, now)
    }

    pub fn category(&self) -> Option<&str> {
        self.classification.category()
    }

    pub fn is_transfer(&self) -> bool {
        self.classification.is_transfer()
    }

    fn from_draft(
        id: Uuid,
        draft: TransactionDraft,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        validate_amount(draft.amount)?;
        let description = normalize_required_text(&draft.description, "description")?;
        let category = normalize_optional_text(draft.category.as_deref());
        let classification = Classification::new(draft.is_transfer, category)?;
        // Stored timestamps keep millisecond precision on every backend.
        let created_at = created_at.trunc_subsecs(3);
        let updated_at = updated_at.trunc_subsecs(3);

        Ok(Self {
            id,
            kind: draft.kind,
            amount: draft.amount,
            description,
            classification,
            division: draft.division.unwrap_or_default(),
            date: draft.date.map_or(updated_at, |date| date.trunc_subsecs(3)),
            transfer_to: normalize_optional_text(draft.transfer_to.as_deref()),
            created_at,
            updated_at,
        })
    }
}

fn validate_amount(amount: f64) -> ResultEngine<()> {
    if !amount.is_finite() {
        return Err(EngineError::Validation(
            "amount must be a finite number".to_string(),
        ));
    }
    if amount < 0.0 {
        return Err(EngineError::Validation("amount must be >= 0".to_string()));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub amount: f64,
    pub description: String,
    pub category: Option<String>,
    pub division: String,
    pub date: DateTimeUtc,
    pub is_transfer: bool,
    pub transfer_to: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount: ActiveValue::Set(tx.amount),
            description: ActiveValue::Set(tx.description.clone()),
            category: ActiveValue::Set(tx.category().map(ToString::to_string)),
            division: ActiveValue::Set(tx.division.as_str().to_string()),
            date: ActiveValue::Set(tx.date),
            is_transfer: ActiveValue::Set(tx.is_transfer()),
            transfer_to: ActiveValue::Set(tx.transfer_to.clone()),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let corrupt = |err: EngineError| {
            EngineError::Database(DbErr::Custom(format!(
                "stored transaction {} is invalid: {err}",
                model.id
            )))
        };
        let kind = TransactionKind::try_from(model.kind.as_str()).map_err(corrupt)?;
        let division = Division::try_from(model.division.as_str()).map_err(corrupt)?;
        let classification =
            Classification::new(model.is_transfer, model.category.clone()).map_err(corrupt)?;

        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            kind,
            amount: model.amount,
            description: model.description,
            classification,
            division,
            date: model.date,
            transfer_to: model.transfer_to,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
