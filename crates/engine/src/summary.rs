//! Income/expense totals over a set of transactions.

use crate::{Transaction, TransactionKind};

/// Totals are plain `f64` sums, so long series can drift by binary rounding
/// error in the last decimal places.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Summary {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Fold transactions into income, expense and `balance = income - expense`.
pub fn summarize<'a, I>(transactions: I) -> Summary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let (income, expense) =
        transactions
            .into_iter()
            .fold((0.0, 0.0), |(income, expense), tx| match tx.kind {
                TransactionKind::Income => (income + tx.amount, expense),
                TransactionKind::Expense => (income, expense + tx.amount),
            });

    Summary {
        income,
        expense,
        balance: income - expense,
    }
}
