//! Transaction primitives.
//!
//! A `Transaction` is the record of one executed transfer between two
//! accounts. Records are immutable once created, except for the explicit
//! whole-record correction path ([`crate::Engine::replace_transaction`]).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccountNumber, EngineError};

/// One executed transfer.
///
/// `initiator_id` is the user who triggered the transfer; it may differ
/// from the from-account owner (e.g. an operator/ATM identity).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub from_account_number: AccountNumber,
    pub to_account_number: AccountNumber,
    pub initiator_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub from_account_number: String,
    pub to_account_number: String,
    pub initiator_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::InitiatorId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            description: ActiveValue::Set(tx.description.clone()),
            created_at: ActiveValue::Set(tx.created_at),
            from_account_number: ActiveValue::Set(tx.from_account_number.to_string()),
            to_account_number: ActiveValue::Set(tx.to_account_number.to_string()),
            initiator_id: ActiveValue::Set(tx.initiator_id.to_string()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::TransactionNotFound(model.id.clone()))?,
            amount_minor: model.amount_minor,
            description: model.description,
            created_at: model.created_at,
            from_account_number: AccountNumber::parse(&model.from_account_number)?,
            to_account_number: AccountNumber::parse(&model.to_account_number)?,
            initiator_id: Uuid::parse_str(&model.initiator_id)
                .map_err(|_| EngineError::TransactionNotFound(model.id.clone()))?,
        })
    }
}
