//! Transaction bookkeeping for the money manager.
//!
//! The [`Engine`] validates transactions, guards edits and answers listing
//! and summary queries on top of a [`TransactionStore`].

pub use edit_window::{EDIT_WINDOW, can_edit};
pub use error::EngineError;
pub use filter::TransactionFilter;
pub use ops::{Engine, EngineBuilder, LIST_LIMIT, TransactionQuery};
pub use store::{DEFAULT_REQUEST_TIMEOUT, SeaOrmStore, StoreStatus, TransactionStore};
pub use summary::{Summary, summarize};
pub use transactions::{
    Classification, Division, Transaction, TransactionDraft, TransactionKind, TransactionPatch,
};
pub use window::{DateWindow, ViewType, WEEK_START, parse_instant, resolve};

mod edit_window;
mod error;
mod filter;
mod ops;
mod store;
mod summary;
mod transactions;
mod util;
mod window;

type ResultEngine<T> = Result<T, EngineError>;
