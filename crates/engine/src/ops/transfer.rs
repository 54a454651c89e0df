//! Transfer validation and execution.
//!
//! The rule pipeline is ordered and fail-fast: every rejection happens
//! before any mutation, and the debit/credit/record writes ride a single
//! DB transaction, so a transfer either fully applies or has no effect.

use sea_orm::{ActiveValue, DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{
    Account, AccountNumber, AccountType, EngineError, ResultEngine, Transaction, TransferCmd,
    User, accounts, transactions,
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Validates and executes a transfer as one atomic unit.
    ///
    /// The checks run in a fixed order (identity, shape, duplicate id,
    /// bank locality, distinct accounts, authorization, savings
    /// restriction, absolute limit, daily limit, per-transaction limit)
    /// and short-circuit on the first failure. Validation reads and the
    /// balance/record writes share one DB transaction.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<Transaction> {
        let TransferCmd {
            from_account_number,
            to_account_number,
            amount_minor,
            description,
            transaction_id,
            initiated_by,
            created_at,
        } = cmd;
        let description = normalize_optional_text(description.as_deref());

        with_tx!(self, |db_tx| {
            let initiator = self.require_user_by_username(&db_tx, &initiated_by).await?;

            let tx = Transaction {
                id: transaction_id.unwrap_or_else(Uuid::new_v4),
                amount_minor,
                description,
                created_at,
                from_account_number,
                to_account_number,
                initiator_id: initiator.id,
            };

            check_shape(tx.amount_minor, &tx.from_account_number, &tx.to_account_number)?;
            self.require_vacant_transaction_id(&db_tx, tx.id).await?;
            check_bank_locality(&tx.from_account_number, &tx.to_account_number)?;
            check_distinct_accounts(&tx.from_account_number, &tx.to_account_number)?;

            let from = self
                .require_account_by_number(&db_tx, &tx.from_account_number)
                .await?;
            let to = self
                .require_account_by_number(&db_tx, &tx.to_account_number)
                .await?;

            check_authorization(&initiator, &from, self.is_operator(&initiator.username))?;
            check_savings_restriction(&from, &to)?;
            check_absolute_limit(&from, tx.amount_minor)?;

            let spent_today = self
                .spent_on_date(&db_tx, initiator.id, tx.created_at.date_naive())
                .await?;
            check_daily_limit(&initiator, spent_today, tx.amount_minor)?;
            check_transaction_limit(&from, tx.amount_minor)?;

            let debit = accounts::ActiveModel {
                id: ActiveValue::Set(from.id.to_string()),
                balance_minor: ActiveValue::Set(from.balance_minor - tx.amount_minor),
                ..Default::default()
            };
            debit.update(&db_tx).await?;

            let credit = accounts::ActiveModel {
                id: ActiveValue::Set(to.id.to_string()),
                balance_minor: ActiveValue::Set(to.balance_minor + tx.amount_minor),
                ..Default::default()
            };
            credit.update(&db_tx).await?;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

            Ok(tx)
        })
    }

    async fn require_vacant_transaction_id(
        &self,
        db: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultEngine<()> {
        let existing = transactions::Entity::find_by_id(id.to_string()).one(db).await?;
        if existing.is_some() {
            return Err(EngineError::TransactionAlreadyExists(id.to_string()));
        }
        Ok(())
    }
}

fn check_shape(
    amount_minor: i64,
    from: &AccountNumber,
    to: &AccountNumber,
) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidTransaction(
            "amount_minor must be > 0".to_string(),
        ));
    }
    if from == to {
        return Err(EngineError::InvalidTransaction(
            "from and to account must not be equal".to_string(),
        ));
    }
    Ok(())
}

fn check_bank_locality(from: &AccountNumber, to: &AccountNumber) -> ResultEngine<()> {
    if from.bank_code() != to.bank_code() {
        return Err(EngineError::ExternalTransferNotSupported);
    }
    Ok(())
}

// Redundant with check_shape; the pipeline keeps both checks.
fn check_distinct_accounts(from: &AccountNumber, to: &AccountNumber) -> ResultEngine<()> {
    if from == to {
        return Err(EngineError::SameAccount);
    }
    Ok(())
}

fn check_authorization(
    initiator: &User,
    from: &Account,
    initiator_is_operator: bool,
) -> ResultEngine<()> {
    if from.user_id != initiator.id && !initiator_is_operator {
        return Err(EngineError::NotAuthorized(initiator.username.clone()));
    }
    Ok(())
}

fn check_savings_restriction(from: &Account, to: &Account) -> ResultEngine<()> {
    let savings_involved =
        from.kind == AccountType::Savings || to.kind == AccountType::Savings;
    if from.user_id != to.user_id && savings_involved {
        return Err(EngineError::SavingsTransferRestricted);
    }
    Ok(())
}

fn check_absolute_limit(from: &Account, amount_minor: i64) -> ResultEngine<()> {
    if from.balance_minor - amount_minor < from.absolute_limit_minor {
        return Err(EngineError::AbsoluteLimitExceeded);
    }
    Ok(())
}

// Reaching the limit exactly is rejected (`>=`), matching the historical
// policy of the limit being exclusive.
fn check_daily_limit(
    initiator: &User,
    spent_today_minor: i64,
    amount_minor: i64,
) -> ResultEngine<()> {
    if spent_today_minor + amount_minor >= initiator.daily_limit_minor {
        return Err(EngineError::DailyLimitExceeded);
    }
    Ok(())
}

fn check_transaction_limit(from: &Account, amount_minor: i64) -> ResultEngine<()> {
    if amount_minor > from.transaction_limit_minor {
        return Err(EngineError::TransactionLimitExceeded);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn number(raw: &str) -> AccountNumber {
        AccountNumber::parse(raw).unwrap()
    }

    fn user(daily_limit_minor: i64) -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            daily_limit_minor,
            created_at: Utc::now(),
        }
    }

    fn account(owner: Uuid, kind: AccountType) -> Account {
        Account {
            id: Uuid::new_v4(),
            number: number("NL64KRCH0000000001"),
            kind,
            balance_minor: 100_000,
            absolute_limit_minor: 0,
            transaction_limit_minor: 50_000,
            user_id: owner,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn shape_rejects_non_positive_amounts_and_equal_accounts() {
        let a = number("NL64KRCH0000000001");
        let b = number("NL64KRCH0000000002");
        assert!(check_shape(0, &a, &b).is_err());
        assert!(check_shape(-1, &a, &b).is_err());
        assert!(check_shape(1, &a, &a).is_err());
        assert!(check_shape(1, &a, &b).is_ok());
    }

    #[test]
    fn locality_compares_bank_codes() {
        let local = check_bank_locality(
            &number("NL64KRCH0000000001"),
            &number("NL02KRCH0000000002"),
        );
        assert!(local.is_ok());

        let external = check_bank_locality(
            &number("NL64KRCH0000000001"),
            &number("NL91ABNA0000000002"),
        );
        assert_eq!(external.unwrap_err(), EngineError::ExternalTransferNotSupported);
    }

    #[test]
    fn owner_or_operator_is_authorized() {
        let initiator = user(1_000_00);
        let own = account(initiator.id, AccountType::Checking);
        let other = account(Uuid::new_v4(), AccountType::Checking);

        assert!(check_authorization(&initiator, &own, false).is_ok());
        assert!(check_authorization(&initiator, &other, true).is_ok());
        assert_eq!(
            check_authorization(&initiator, &other, false).unwrap_err(),
            EngineError::NotAuthorized("alice".to_string())
        );
    }

    #[test]
    fn savings_restriction_applies_in_both_directions() {
        let x = Uuid::new_v4();
        let y = Uuid::new_v4();

        // Same owner: fine, even with savings on both sides.
        assert!(check_savings_restriction(
            &account(x, AccountType::Savings),
            &account(x, AccountType::Savings),
        )
        .is_ok());

        // Different owners, checking only: fine.
        assert!(check_savings_restriction(
            &account(x, AccountType::Checking),
            &account(y, AccountType::Checking),
        )
        .is_ok());

        // Different owners, savings on either side: rejected.
        assert_eq!(
            check_savings_restriction(
                &account(x, AccountType::Savings),
                &account(y, AccountType::Checking),
            )
            .unwrap_err(),
            EngineError::SavingsTransferRestricted
        );
        assert_eq!(
            check_savings_restriction(
                &account(x, AccountType::Checking),
                &account(y, AccountType::Savings),
            )
            .unwrap_err(),
            EngineError::SavingsTransferRestricted
        );
    }

    #[test]
    fn absolute_limit_is_a_floor() {
        let mut from = account(Uuid::new_v4(), AccountType::Checking);
        from.balance_minor = 100;
        from.absolute_limit_minor = 0;

        assert!(check_absolute_limit(&from, 100).is_ok());
        assert_eq!(
            check_absolute_limit(&from, 101).unwrap_err(),
            EngineError::AbsoluteLimitExceeded
        );

        // A negative limit acts as an overdraft floor.
        from.absolute_limit_minor = -50;
        assert!(check_absolute_limit(&from, 150).is_ok());
        assert!(check_absolute_limit(&from, 151).is_err());
    }

    #[test]
    fn daily_limit_boundary_is_exclusive() {
        let initiator = user(1_000);

        assert!(check_daily_limit(&initiator, 0, 999).is_ok());
        assert_eq!(
            check_daily_limit(&initiator, 0, 1_000).unwrap_err(),
            EngineError::DailyLimitExceeded
        );
        assert_eq!(
            check_daily_limit(&initiator, 800, 200).unwrap_err(),
            EngineError::DailyLimitExceeded
        );
        assert!(check_daily_limit(&initiator, 800, 199).is_ok());
    }

    #[test]
    fn transaction_limit_is_inclusive() {
        let from = account(Uuid::new_v4(), AccountType::Checking);
        assert!(check_transaction_limit(&from, 50_000).is_ok());
        assert_eq!(
            check_transaction_limit(&from, 50_001).unwrap_err(),
            EngineError::TransactionLimitExceeded
        );
    }
}
