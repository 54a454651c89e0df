//! Transaction query API endpoints.

use api_types::{
    page::PageResponse,
    transaction::{TransactionQuery, TransactionView},
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use engine::{AccountNumber, Money, Page, PageRequest, Transaction, TransactionFilter};

use crate::{ServerError, server::ServerState};

pub(crate) fn view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        amount: Money::new(tx.amount_minor).to_string(),
        description: tx.description,
        created_at: tx.created_at,
        from: tx.from_account_number.to_string(),
        to: tx.to_account_number.to_string(),
        initiator_id: tx.initiator_id,
    }
}

fn view_page(page: Page<Transaction>) -> PageResponse<TransactionView> {
    PageResponse {
        items: page.items.into_iter().map(view).collect(),
        total_items: page.total_items,
        total_pages: page.total_pages,
        current_page: page.current_page,
        page_size: page.page_size,
    }
}

fn parse_query(payload: &TransactionQuery) -> Result<(TransactionFilter, PageRequest), ServerError> {
    let from = payload
        .from
        .as_deref()
        .map(AccountNumber::parse)
        .transpose()?;
    let to = payload.to.as_deref().map(AccountNumber::parse).transpose()?;
    let min_amount = payload
        .min_amount
        .as_deref()
        .map(str::parse::<Money>)
        .transpose()?;
    let max_amount = payload
        .max_amount
        .as_deref()
        .map(str::parse::<Money>)
        .transpose()?;

    let filter = TransactionFilter {
        from_account_number: from,
        to_account_number: to,
        initiator_id: payload.initiator_id,
        min_amount_minor: min_amount.map(Money::minor_units),
        max_amount_minor: max_amount.map(Money::minor_units),
        created_before: payload.created_before.map(|dt| dt.with_timezone(&Utc)),
        created_after: payload.created_after.map(|dt| dt.with_timezone(&Utc)),
    };
    let page = PageRequest::new(payload.page, payload.page_size);

    Ok((filter, page))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction_by_id(id).await?;
    Ok(Json(view(tx)))
}

pub async fn query(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionQuery>,
) -> Result<Json<PageResponse<TransactionView>>, ServerError> {
    let (filter, page) = parse_query(&payload)?;
    let result = state.engine.transactions(&filter, page).await?;
    Ok(Json(view_page(result)))
}

pub async fn query_by_user(
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<TransactionQuery>,
) -> Result<Json<PageResponse<TransactionView>>, ServerError> {
    let (filter, page) = parse_query(&payload)?;
    let result = state
        .engine
        .transactions_by_user(user_id, &filter, page)
        .await?;
    Ok(Json(view_page(result)))
}

pub async fn query_by_account(
    State(state): State<ServerState>,
    Path(number): Path<String>,
    Json(payload): Json<TransactionQuery>,
) -> Result<Json<PageResponse<TransactionView>>, ServerError> {
    let number = AccountNumber::parse(&number)?;
    let (filter, page) = parse_query(&payload)?;
    let result = state
        .engine
        .transactions_by_account(&number, &filter, page)
        .await?;
    Ok(Json(view_page(result)))
}
