//! Filtered, paginated queries over the transfer log.

use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, Select, prelude::*,
};
use uuid::Uuid;

use crate::{
    AccountNumber, EngineError, Page, PageRequest, ResultEngine, Transaction, transactions,
};

use super::{Engine, with_tx};

/// Filters for querying transactions.
///
/// All fields are optional and AND-combined; absent fields impose no
/// constraint. Amount bounds are inclusive, the timestamp bounds are
/// exclusive.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub from_account_number: Option<AccountNumber>,
    pub to_account_number: Option<AccountNumber>,
    pub initiator_id: Option<Uuid>,
    pub min_amount_minor: Option<i64>,
    pub max_amount_minor: Option<i64>,
    pub created_before: Option<DateTime<Utc>>,
    pub created_after: Option<DateTime<Utc>>,
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionFilter) -> Self {
        if let Some(from) = &filter.from_account_number {
            self = self.filter(transactions::Column::FromAccountNumber.eq(from.as_str()));
        }
        if let Some(to) = &filter.to_account_number {
            self = self.filter(transactions::Column::ToAccountNumber.eq(to.as_str()));
        }
        if let Some(initiator_id) = filter.initiator_id {
            self = self.filter(transactions::Column::InitiatorId.eq(initiator_id.to_string()));
        }
        if let Some(min) = filter.min_amount_minor {
            self = self.filter(transactions::Column::AmountMinor.gte(min));
        }
        if let Some(max) = filter.max_amount_minor {
            self = self.filter(transactions::Column::AmountMinor.lte(max));
        }
        if let Some(before) = filter.created_before {
            self = self.filter(transactions::Column::CreatedAt.lt(before));
        }
        if let Some(after) = filter.created_after {
            self = self.filter(transactions::Column::CreatedAt.gt(after));
        }

        self
    }
}

impl Engine {
    /// Looks up a single transaction by id.
    pub async fn transaction_by_id(&self, id: Uuid) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::TransactionNotFound(id.to_string()))?;
            Transaction::try_from(model)
        })
    }

    /// Lists transactions matching `filter`, paginated.
    ///
    /// An empty filter returns the whole log (subject to pagination).
    pub async fn transactions(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> ResultEngine<Page<Transaction>> {
        with_tx!(self, |db_tx| {
            let query = transactions::Entity::find().apply_tx_filters(filter);
            self.paged(&db_tx, query, page).await
        })
    }

    /// Lists transactions where the user owns the sending **or** the
    /// receiving account, AND-combined with `filter`.
    pub async fn transactions_by_user(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> ResultEngine<Page<Transaction>> {
        with_tx!(self, |db_tx| {
            self.require_user_by_id(&db_tx, user_id).await?;

            let owned = self.owned_account_numbers(&db_tx, user_id).await?;
            if owned.is_empty() {
                return Ok(Page::empty(page));
            }

            let query = transactions::Entity::find()
                .filter(
                    Condition::any()
                        .add(transactions::Column::FromAccountNumber.is_in(owned.clone()))
                        .add(transactions::Column::ToAccountNumber.is_in(owned)),
                )
                .apply_tx_filters(filter);
            self.paged(&db_tx, query, page).await
        })
    }

    /// Lists transactions where the account is sender **or** receiver,
    /// AND-combined with `filter`.
    pub async fn transactions_by_account(
        &self,
        number: &AccountNumber,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> ResultEngine<Page<Transaction>> {
        with_tx!(self, |db_tx| {
            self.require_account_by_number(&db_tx, number).await?;

            let query = transactions::Entity::find()
                .filter(
                    Condition::any()
                        .add(transactions::Column::FromAccountNumber.eq(number.as_str()))
                        .add(transactions::Column::ToAccountNumber.eq(number.as_str())),
                )
                .apply_tx_filters(filter);
            self.paged(&db_tx, query, page).await
        })
    }

    /// Replaces a whole transaction record by id (correction path).
    ///
    /// Balances are not touched: corrections adjust the record, not the
    /// ledger effect it had.
    pub async fn replace_transaction(&self, tx: Transaction) -> ResultEngine<Transaction> {
        if tx.amount_minor <= 0 {
            return Err(EngineError::InvalidTransaction(
                "amount_minor must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            transactions::Entity::find_by_id(tx.id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::TransactionNotFound(tx.id.to_string()))?;

            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            Ok(tx)
        })
    }

    async fn paged(
        &self,
        db: &DatabaseTransaction,
        query: Select<transactions::Entity>,
        page: PageRequest,
    ) -> ResultEngine<Page<Transaction>> {
        // Stable ordering for reproducible pagination across calls.
        let query = query
            .order_by_asc(transactions::Column::CreatedAt)
            .order_by_asc(transactions::Column::Id);

        let paginator = query.paginate(db, page.page_size());
        let totals = paginator.num_items_and_pages().await?;
        let models = paginator.fetch_page(page.index()).await?;

        let mut items = Vec::with_capacity(models.len());
        for model in models {
            items.push(Transaction::try_from(model)?);
        }

        Ok(Page {
            items,
            total_items: totals.number_of_items,
            total_pages: totals.number_of_pages,
            current_page: page.current_page(),
            page_size: page.page_size(),
        })
    }
}
