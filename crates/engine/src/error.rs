//! The module contains the errors the engine can throw.
//!
//! Every business rejection carries a human-readable message and a stable
//! reason code ([`EngineError::code`]) so callers can map it to a
//! user-facing message without parsing error strings.

use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("user \"{0}\" not found")]
    UserNotFound(String),
    #[error("account \"{0}\" not found")]
    AccountNotFound(String),
    #[error("transaction \"{0}\" not found")]
    TransactionNotFound(String),
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("transaction \"{0}\" already exists")]
    TransactionAlreadyExists(String),
    #[error("transfers to accounts of another bank are not supported")]
    ExternalTransferNotSupported,
    #[error("from and to account must differ")]
    SameAccount,
    #[error("user \"{0}\" is not authorized to transfer from this account")]
    NotAuthorized(String),
    #[error("a savings account only exchanges funds with accounts of its own owner")]
    SavingsTransferRestricted,
    #[error("transfer would push the balance below the absolute limit")]
    AbsoluteLimitExceeded,
    #[error("transfer would reach the daily limit")]
    DailyLimitExceeded,
    #[error("amount exceeds the per-transaction limit")]
    TransactionLimitExceeded,
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Stable reason code for the rejection.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "user_not_found",
            Self::AccountNotFound(_) => "account_not_found",
            Self::TransactionNotFound(_) => "transaction_not_found",
            Self::InvalidTransaction(_) => "invalid_transaction",
            Self::TransactionAlreadyExists(_) => "transaction_already_exists",
            Self::ExternalTransferNotSupported => "external_transfer_not_supported",
            Self::SameAccount => "same_account",
            Self::NotAuthorized(_) => "not_authorized",
            Self::SavingsTransferRestricted => "savings_transfer_restricted",
            Self::AbsoluteLimitExceeded => "absolute_limit_exceeded",
            Self::DailyLimitExceeded => "daily_limit_exceeded",
            Self::TransactionLimitExceeded => "transaction_limit_exceeded",
            Self::Database(_) => "database_error",
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::UserNotFound(a), Self::UserNotFound(b)) => a == b,
            (Self::AccountNotFound(a), Self::AccountNotFound(b)) => a == b,
            (Self::TransactionNotFound(a), Self::TransactionNotFound(b)) => a == b,
            (Self::InvalidTransaction(a), Self::InvalidTransaction(b)) => a == b,
            (Self::TransactionAlreadyExists(a), Self::TransactionAlreadyExists(b)) => a == b,
            (Self::ExternalTransferNotSupported, Self::ExternalTransferNotSupported) => true,
            (Self::SameAccount, Self::SameAccount) => true,
            (Self::NotAuthorized(a), Self::NotAuthorized(b)) => a == b,
            (Self::SavingsTransferRestricted, Self::SavingsTransferRestricted) => true,
            (Self::AbsoluteLimitExceeded, Self::AbsoluteLimitExceeded) => true,
            (Self::DailyLimitExceeded, Self::DailyLimitExceeded) => true,
            (Self::TransactionLimitExceeded, Self::TransactionLimitExceeded) => true,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
