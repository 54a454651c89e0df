use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod transfer {
    use super::*;

    /// Request body for executing a transfer.
    ///
    /// `amount` is a decimal string (`"200"`, `"10.50"`); the server parses
    /// it into minor units. `id` lets clients supply their own transaction
    /// id so an accidental resubmission is rejected instead of re-applied.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub id: Option<Uuid>,
        pub amount: String,
        pub description: Option<String>,
        pub from: String,
        pub to: String,
    }
}

pub mod transaction {
    use super::*;

    /// A transfer as returned to clients.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        /// Decimal string in major units, e.g. `"200.00"`.
        pub amount: String,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
        pub from: String,
        pub to: String,
        pub initiator_id: Uuid,
    }

    /// Filter + pagination for transaction queries.
    ///
    /// All filter fields are optional and AND-combined. `page` is 1-based;
    /// non-positive page/page_size values fall back to the defaults.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionQuery {
        pub from: Option<String>,
        pub to: Option<String>,
        pub initiator_id: Option<Uuid>,
        /// Inclusive lower bound, decimal string.
        pub min_amount: Option<String>,
        /// Inclusive upper bound, decimal string.
        pub max_amount: Option<String>,
        pub created_before: Option<DateTime<FixedOffset>>,
        pub created_after: Option<DateTime<FixedOffset>>,
        pub page: Option<i64>,
        pub page_size: Option<i64>,
    }
}

pub mod page {
    use super::*;

    /// Page envelope for list responses.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PageResponse<T> {
        pub items: Vec<T>,
        pub total_items: u64,
        pub total_pages: u64,
        pub current_page: u64,
        pub page_size: u64,
    }
}

/// Error body returned for rejected requests.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Stable reason code, e.g. `daily_limit_exceeded`.
    pub code: String,
}
