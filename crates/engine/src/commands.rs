//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::AccountNumber;

/// Execute a transfer between two accounts.
///
/// `initiated_by` is the acting principal's username; it is resolved to a
/// user and authorized against the from-account during validation. A
/// client-supplied `transaction_id` is honored (and checked for duplicates)
/// so resubmissions are detectable; otherwise a fresh id is generated.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub from_account_number: AccountNumber,
    pub to_account_number: AccountNumber,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub transaction_id: Option<Uuid>,
    pub initiated_by: String,
    pub created_at: DateTime<Utc>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        from_account_number: AccountNumber,
        to_account_number: AccountNumber,
        amount_minor: i64,
        initiated_by: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            from_account_number,
            to_account_number,
            amount_minor,
            description: None,
            transaction_id: None,
            initiated_by: initiated_by.into(),
            created_at,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn transaction_id(mut self, id: Uuid) -> Self {
        self.transaction_id = Some(id);
        self
    }
}
