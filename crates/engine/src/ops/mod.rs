use std::collections::HashSet;

use sea_orm::{DatabaseConnection, DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{Account, AccountNumber, EngineError, ResultEngine, User, accounts, users};

mod limits;
mod queries;
mod transfer;

pub use queries::TransactionFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        use sea_orm::TransactionTrait;
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The transfer engine.
///
/// Holds a database connection and the set of operator usernames (ATM and
/// other system identities allowed to initiate transfers from accounts
/// they do not own). Nothing else: all account/user/transaction state is
/// re-read from the store per operation.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    operators: HashSet<String>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) fn is_operator(&self, username: &str) -> bool {
        self.operators.contains(username)
    }

    /// Current state of an account, fetched by its number.
    pub async fn account_by_number(&self, number: &AccountNumber) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let account = self.require_account_by_number(&db_tx, number).await?;
            Ok(account)
        })
    }

    pub(crate) async fn require_account_by_number(
        &self,
        db: &DatabaseTransaction,
        number: &AccountNumber,
    ) -> ResultEngine<Account> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Number.eq(number.as_str()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::AccountNotFound(number.to_string()))?;
        Account::try_from(model)
    }

    pub(crate) async fn require_user_by_username(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(username.to_string()))?;
        User::try_from(model)
    }

    pub(crate) async fn require_user_by_id(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))?;
        User::try_from(model)
    }

    /// Numbers of all accounts owned by a user.
    pub(crate) async fn owned_account_numbers(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<Vec<String>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .all(db)
            .await?;
        Ok(models.into_iter().map(|model| model.number).collect())
    }
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    operators: HashSet<String>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Register a username allowed to transfer from accounts it does not own.
    pub fn operator(mut self, username: impl Into<String>) -> EngineBuilder {
        self.operators.insert(username.into());
        self
    }

    /// Register several operator usernames at once.
    pub fn operators<I, S>(mut self, usernames: I) -> EngineBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operators
            .extend(usernames.into_iter().map(Into::into));
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            operators: self.operators,
        })
    }
}
