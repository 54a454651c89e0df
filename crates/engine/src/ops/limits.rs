//! Daily spend aggregation.

use std::collections::HashSet;

use chrono::NaiveDate;
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, transactions};

use super::{Engine, with_tx};

impl Engine {
    /// Total amount a user sent as initiator on `date` (UTC calendar day),
    /// in minor units.
    ///
    /// Only transfers the user initiated **from one of their own accounts**
    /// count: a transfer initiated from someone else's account (an
    /// operator/ATM flow) is excluded from that user's total. Returns 0
    /// when nothing matches.
    pub async fn total_spent_by_user_on_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<i64> {
        with_tx!(self, |db_tx| {
            let total = self.spent_on_date(&db_tx, user_id, date).await?;
            Ok(total)
        })
    }

    pub(super) async fn spent_on_date(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<i64> {
        if user_id.is_nil() {
            return Err(EngineError::InvalidTransaction(
                "user id must not be nil".to_string(),
            ));
        }

        let owned: HashSet<String> = self
            .owned_account_numbers(db, user_id)
            .await?
            .into_iter()
            .collect();

        // Ordered by creation time for determinism; the sum itself does not
        // depend on order.
        let rows = transactions::Entity::find()
            .filter(transactions::Column::InitiatorId.eq(user_id.to_string()))
            .order_by_asc(transactions::Column::CreatedAt)
            .all(db)
            .await?;

        let mut total: i64 = 0;
        for row in rows {
            if row.created_at.date_naive() != date {
                continue;
            }
            if !owned.contains(&row.from_account_number) {
                continue;
            }
            total += row.amount_minor;
        }
        Ok(total)
    }
}
