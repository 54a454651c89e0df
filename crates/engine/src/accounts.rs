//! Account primitives and storage model.
//!
//! Accounts are created by an outside collaborator before any transfer
//! references them; the engine reads them and only ever mutates
//! `balance_minor` when a validated transfer commits.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccountNumber, EngineError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Checking,
    Savings,
}

impl AccountType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
        }
    }
}

impl TryFrom<&str> for AccountType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            other => Err(EngineError::InvalidTransaction(format!(
                "invalid account type: {other}"
            ))),
        }
    }
}

/// A customer account holding a balance in minor units.
///
/// After every executed transfer `balance_minor >= absolute_limit_minor`
/// must hold; the absolute limit acts as an overdraft floor and may be
/// negative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub number: AccountNumber,
    pub kind: AccountType,
    pub balance_minor: i64,
    /// Minimum balance the account may reach (often <= 0).
    pub absolute_limit_minor: i64,
    /// Maximum amount a single transfer from this account may move.
    pub transaction_limit_minor: i64,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub number: String,
    pub kind: String,
    pub balance_minor: i64,
    pub absolute_limit_minor: i64,
    pub transaction_limit_minor: i64,
    pub user_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
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

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::AccountNotFound(model.number.clone()))?,
            number: AccountNumber::parse(&model.number)?,
            kind: AccountType::try_from(model.kind.as_str())?,
            balance_minor: model.balance_minor,
            absolute_limit_minor: model.absolute_limit_minor,
            transaction_limit_minor: model.transaction_limit_minor,
            user_id: Uuid::parse_str(&model.user_id)
                .map_err(|_| EngineError::AccountNotFound(model.number.clone()))?,
            created_at: model.created_at,
        })
    }
}
