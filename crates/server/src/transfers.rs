//! Transfer API endpoint.

use api_types::{transaction::TransactionView, transfer::TransferNew};
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::TypedHeader;
use chrono::Utc;

use engine::{AccountNumber, Money, TransferCmd};

use crate::{
    ServerError,
    server::{ActingUser, ServerState},
    transactions::view,
};

pub async fn create(
    TypedHeader(acting_user): TypedHeader<ActingUser>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let amount: Money = payload.amount.parse()?;
    let from = AccountNumber::parse(&payload.from)?;
    let to = AccountNumber::parse(&payload.to)?;

    let mut cmd = TransferCmd::new(from, to, amount.minor_units(), acting_user.0, Utc::now());
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(id) = payload.id {
        cmd = cmd.transaction_id(id);
    }

    let tx = state.engine.transfer(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}
