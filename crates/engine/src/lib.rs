//! Core money-transfer engine.
//!
//! The engine owns the rules that decide whether a transfer between two
//! accounts may proceed, applies the balance change atomically, and answers
//! filtered/paginated queries over the transfer log. It holds no cross-call
//! state: every operation re-reads current records inside a database
//! transaction before acting on them.
//!
//! Accounts and users are created by outside collaborators; the engine only
//! reads them. Transactions are created exclusively by [`Engine::transfer`].

pub use account_number::AccountNumber;
pub use accounts::{Account, AccountType};
pub use commands::TransferCmd;
pub use error::EngineError;
pub use money::Money;
pub use ops::{Engine, EngineBuilder, TransactionFilter};
pub use page::{Page, PageRequest};
pub use transactions::Transaction;
pub use users::User;

mod account_number;
mod accounts;
mod commands;
mod error;
mod money;
mod ops;
mod page;
mod transactions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
