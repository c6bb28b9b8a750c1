//! Query predicate for listing and summarizing transactions.

use sea_orm::{QueryFilter, prelude::*};

use crate::{Division, transactions, util::normalize_optional_text, window::DateWindow};

/// Conjunction of a date window with optional category and division
/// equality. `None` matches any value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    window: DateWindow,
    category: Option<String>,
    division: Option<Division>,
}

impl TransactionFilter {
    /// Blank categories are treated as absent.
    pub fn new(window: DateWindow, category: Option<&str>, division: Option<Division>) -> Self {
        Self {
            window,
            category: normalize_optional_text(category),
            division,
        }
    }
}

pub(crate) trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionFilter) -> Self {
        if let Some(from) = filter.window.from {
            self = self.filter(transactions::Column::Date.gte(from));
        }
        if let Some(to) = filter.window.to {
            self = self.filter(transactions::Column::Date.lte(to));
        }
        if let Some(category) = &filter.category {
            self = self.filter(transactions::Column::Category.eq(category.as_str()));
        }
        if let Some(division) = filter.division {
            self = self.filter(transactions::Column::Division.eq(division.as_str()));
        }

        self
    }
}
