use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{AccountNumber, Engine, EngineError, PageRequest, TransactionFilter, TransferCmd};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .operator("atm")
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn seed_user(db: &DatabaseConnection, username: &str, daily_limit_minor: i64) -> Uuid {
    let id = Uuid::new_v4();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (id, username, daily_limit_minor, created_at) VALUES (?, ?, ?, ?)",
        vec![
            id.to_string().into(),
            username.into(),
            daily_limit_minor.into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();
    id
}

async fn seed_account(
    db: &DatabaseConnection,
    number: &str,
    kind: &str,
    balance_minor: i64,
    absolute_limit_minor: i64,
    transaction_limit_minor: i64,
    user_id: Uuid,
) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO accounts \
         (id, number, kind, balance_minor, absolute_limit_minor, transaction_limit_minor, user_id, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            number.into(),
            kind.into(),
            balance_minor.into(),
            absolute_limit_minor.into(),
            transaction_limit_minor.into(),
            user_id.to_string().into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();
}

fn num(raw: &str) -> AccountNumber {
    AccountNumber::parse(raw).unwrap()
}

fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
}

async fn balance_of(engine: &Engine, number: &str) -> i64 {
    engine
        .account_by_number(&num(number))
        .await
        .unwrap()
        .balance_minor
}

async fn transaction_count(engine: &Engine) -> u64 {
    engine
        .transactions(&TransactionFilter::default(), PageRequest::default())
        .await
        .unwrap()
        .total_items
}

const A: &str = "NL64KRCH0000000001";
const B: &str = "NL02KRCH0000000002";
const EXTERNAL: &str = "NL91ABNA0000000003";

#[tokio::test]
async fn valid_transfer_moves_balances_and_records_one_transaction() {
    let (engine, db) = engine_with_db().await;
    let alice = seed_user(&db, "alice", 100_000).await;
    let bob = seed_user(&db, "bob", 100_000).await;
    seed_account(&db, A, "checking", 100_000, 0, 50_000, alice).await;
    seed_account(&db, B, "checking", 10_000, 0, 50_000, bob).await;

    let tx = engine
        .transfer(
            TransferCmd::new(num(A), num(B), 20_000, "alice", day(14)).description("rent"),
        )
        .await
        .unwrap();

    assert_eq!(tx.amount_minor, 20_000);
    assert_eq!(tx.from_account_number, num(A));
    assert_eq!(tx.to_account_number, num(B));
    assert_eq!(tx.initiator_id, alice);
    assert_eq!(tx.description.as_deref(), Some("rent"));

    assert_eq!(balance_of(&engine, A).await, 80_000);
    assert_eq!(balance_of(&engine, B).await, 30_000);
    assert_eq!(transaction_count(&engine).await, 1);

    let stored = engine.transaction_by_id(tx.id).await.unwrap();
    assert_eq!(stored, tx);
}

#[tokio::test]
async fn amount_over_transaction_limit_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let alice = seed_user(&db, "alice", 1_000_000).await;
    let bob = seed_user(&db, "bob", 1_000_000).await;
    seed_account(&db, A, "checking", 100_000, 0, 50_000, alice).await;
    seed_account(&db, B, "checking", 0, 0, 50_000, bob).await;

    let err = engine
        .transfer(TransferCmd::new(num(A), num(B), 60_000, "alice", day(14)))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::TransactionLimitExceeded);
    assert_eq!(balance_of(&engine, A).await, 100_000);
    assert_eq!(balance_of(&engine, B).await, 0);
    assert_eq!(transaction_count(&engine).await, 0);
}

#[tokio::test]
async fn absolute_limit_is_an_overdraft_floor() {
    let (engine, db) = engine_with_db().await;
    let alice = seed_user(&db, "alice", 1_000_000).await;
    let bob = seed_user(&db, "bob", 1_000_000).await;
    seed_account(&db, A, "checking", 100, 0, 50_000, alice).await;
    seed_account(&db, B, "checking", 0, 0, 50_000, bob).await;

    let err = engine
        .transfer(TransferCmd::new(num(A), num(B), 101, "alice", day(14)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AbsoluteLimitExceeded);
    assert_eq!(balance_of(&engine, A).await, 100);

    // Draining exactly to the limit is allowed.
    engine
        .transfer(TransferCmd::new(num(A), num(B), 100, "alice", day(14)))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, A).await, 0);

    // A negative limit lets the balance go below zero.
    let carol = seed_user(&db, "carol", 1_000_000).await;
    const C: &str = "NL77KRCH0000000004";
    seed_account(&db, C, "checking", 100, -50, 50_000, carol).await;
    engine
        .transfer(TransferCmd::new(num(C), num(B), 150, "carol", day(14)))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, C).await, -50);
}

#[tokio::test]
async fn daily_limit_boundary_is_exclusive() {
    let (engine, db) = engine_with_db().await;
    let alice = seed_user(&db, "alice", 1_000).await;
    let bob = seed_user(&db, "bob", 1_000_000).await;
    seed_account(&db, A, "checking", 1_000_000, 0, 1_000_000, alice).await;
    seed_account(&db, B, "checking", 0, 0, 1_000_000, bob).await;

    engine
        .transfer(TransferCmd::new(num(A), num(B), 400, "alice", day(14)))
        .await
        .unwrap();

    // 400 + 600 reaches the limit exactly: rejected.
    let err = engine
        .transfer(TransferCmd::new(num(A), num(B), 600, "alice", day(14)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::DailyLimitExceeded);
    assert_eq!(balance_of(&engine, A).await, 1_000_000 - 400);

    // 400 + 599 stays strictly below: accepted.
    engine
        .transfer(TransferCmd::new(num(A), num(B), 599, "alice", day(14)))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, A).await, 1_000_000 - 999);

    // The next day starts a fresh budget.
    engine
        .transfer(TransferCmd::new(num(A), num(B), 900, "alice", day(15)))
        .await
        .unwrap();
}

#[tokio::test]
async fn transfers_between_banks_are_rejected() {
    let (engine, db) = engine_with_db().await;
    let alice = seed_user(&db, "alice", 1_000_000).await;
    let bob = seed_user(&db, "bob", 1_000_000).await;
    seed_account(&db, A, "checking", 100_000, 0, 50_000, alice).await;
    seed_account(&db, EXTERNAL, "checking", 0, 0, 50_000, bob).await;

    let err = engine
        .transfer(TransferCmd::new(num(A), num(EXTERNAL), 100, "alice", day(14)))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::ExternalTransferNotSupported);
    assert_eq!(balance_of(&engine, A).await, 100_000);
    assert_eq!(transaction_count(&engine).await, 0);
}

#[tokio::test]
async fn transfer_to_the_same_account_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let alice = seed_user(&db, "alice", 1_000_000).await;
    seed_account(&db, A, "checking", 100_000, 0, 50_000, alice).await;

    let err = engine
        .transfer(TransferCmd::new(num(A), num(A), 100, "alice", day(14)))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidTransaction(_)));
    assert_eq!(balance_of(&engine, A).await, 100_000);
    assert_eq!(transaction_count(&engine).await, 0);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let (engine, db) = engine_with_db().await;
    let alice = seed_user(&db, "alice", 1_000_000).await;
    let bob = seed_user(&db, "bob", 1_000_000).await;
    seed_account(&db, A, "checking", 100_000, 0, 50_000, alice).await;
    seed_account(&db, B, "checking", 0, 0, 50_000, bob).await;

    for amount in [0, -100] {
        let err = engine
            .transfer(TransferCmd::new(num(A), num(B), amount, "alice", day(14)))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransaction(_)));
    }
    assert_eq!(transaction_count(&engine).await, 0);
}

#[tokio::test]
async fn cross_owner_savings_transfers_are_rejected() {
    let (engine, db) = engine_with_db().await;
    let x = seed_user(&db, "x", 1_000_000).await;
    let y = seed_user(&db, "y", 1_000_000).await;
    const X_SAVINGS: &str = "NL64KRCH0000000010";
    const X_CHECKING: &str = "NL64KRCH0000000011";
    const Y_CHECKING: &str = "NL64KRCH0000000012";
    seed_account(&db, X_SAVINGS, "savings", 10_000, 0, 10_000, x).await;
    seed_account(&db, X_CHECKING, "checking", 10_000, 0, 10_000, x).await;
    seed_account(&db, Y_CHECKING, "checking", 10_000, 0, 10_000, y).await;

    // Savings to another owner's checking: rejected.
    let err = engine
        .transfer(TransferCmd::new(num(X_SAVINGS), num(Y_CHECKING), 5_000, "x", day(14)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::SavingsTransferRestricted);

    // Other direction is rejected too.
    let err = engine
        .transfer(TransferCmd::new(num(Y_CHECKING), num(X_SAVINGS), 5_000, "y", day(14)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::SavingsTransferRestricted);

    assert_eq!(balance_of(&engine, X_SAVINGS).await, 10_000);
    assert_eq!(balance_of(&engine, Y_CHECKING).await, 10_000);

    // Within the same owner a savings account moves freely.
    engine
        .transfer(TransferCmd::new(num(X_SAVINGS), num(X_CHECKING), 5_000, "x", day(14)))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, X_SAVINGS).await, 5_000);
    assert_eq!(balance_of(&engine, X_CHECKING).await, 15_000);
}

#[tokio::test]
async fn duplicate_transaction_id_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let alice = seed_user(&db, "alice", 1_000_000).await;
    let bob = seed_user(&db, "bob", 1_000_000).await;
    seed_account(&db, A, "checking", 100_000, 0, 50_000, alice).await;
    seed_account(&db, B, "checking", 0, 0, 50_000, bob).await;

    let id = Uuid::new_v4();
    engine
        .transfer(TransferCmd::new(num(A), num(B), 1_000, "alice", day(14)).transaction_id(id))
        .await
        .unwrap();

    let err = engine
        .transfer(TransferCmd::new(num(A), num(B), 1_000, "alice", day(14)).transaction_id(id))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::TransactionAlreadyExists(id.to_string()));
    // The ledger reflects only the first submission.
    assert_eq!(balance_of(&engine, A).await, 99_000);
    assert_eq!(balance_of(&engine, B).await, 1_000);
    assert_eq!(transaction_count(&engine).await, 1);
}

#[tokio::test]
async fn unknown_user_and_unknown_account_are_rejected() {
    let (engine, db) = engine_with_db().await;
    let alice = seed_user(&db, "alice", 1_000_000).await;
    seed_account(&db, A, "checking", 100_000, 0, 50_000, alice).await;

    let err = engine
        .transfer(TransferCmd::new(num(A), num(B), 100, "nobody", day(14)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::UserNotFound("nobody".to_string()));

    let err = engine
        .transfer(TransferCmd::new(num(A), num(B), 100, "alice", day(14)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AccountNotFound(B.to_string()));

    assert_eq!(balance_of(&engine, A).await, 100_000);
}

#[tokio::test]
async fn only_owner_or_operator_may_initiate() {
    let (engine, db) = engine_with_db().await;
    let alice = seed_user(&db, "alice", 1_000_000).await;
    let bob = seed_user(&db, "bob", 1_000_000).await;
    seed_user(&db, "atm", 1_000_000).await;
    seed_account(&db, A, "checking", 100_000, 0, 50_000, alice).await;
    seed_account(&db, B, "checking", 0, 0, 50_000, bob).await;

    // A stranger cannot move someone else's money.
    let err = engine
        .transfer(TransferCmd::new(num(A), num(B), 100, "bob", day(14)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotAuthorized("bob".to_string()));

    // The configured operator identity can.
    engine
        .transfer(TransferCmd::new(num(A), num(B), 100, "atm", day(14)))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, A).await, 99_900);
    assert_eq!(balance_of(&engine, B).await, 100);
}

#[tokio::test]
async fn operator_transfers_do_not_count_toward_daily_spend() {
    let (engine, db) = engine_with_db().await;
    let alice = seed_user(&db, "alice", 500).await;
    let bob = seed_user(&db, "bob", 1_000_000).await;
    let atm = seed_user(&db, "atm", 1_000_000).await;
    seed_account(&db, A, "checking", 1_000_000, 0, 1_000_000, alice).await;
    seed_account(&db, B, "checking", 0, 0, 1_000_000, bob).await;

    // An ATM withdrawal from alice's account, initiated by the operator.
    engine
        .transfer(TransferCmd::new(num(A), num(B), 400, "atm", day(14)))
        .await
        .unwrap();

    // It counts toward neither the operator's nor alice's daily total.
    let date = day(14).date_naive();
    assert_eq!(engine.total_spent_by_user_on_date(atm, date).await.unwrap(), 0);
    assert_eq!(
        engine.total_spent_by_user_on_date(alice, date).await.unwrap(),
        0
    );

    // Alice still has her full daily budget: 450 < 500 passes, which it
    // would not if the operator's 400 were attributed to her.
    engine
        .transfer(TransferCmd::new(num(A), num(B), 450, "alice", day(14)))
        .await
        .unwrap();
    assert_eq!(
        engine.total_spent_by_user_on_date(alice, date).await.unwrap(),
        450
    );
}

#[tokio::test]
async fn daily_spend_is_scoped_to_the_calendar_day() {
    let (engine, db) = engine_with_db().await;
    let alice = seed_user(&db, "alice", 1_000_000).await;
    let bob = seed_user(&db, "bob", 1_000_000).await;
    seed_account(&db, A, "checking", 1_000_000, 0, 1_000_000, alice).await;
    seed_account(&db, B, "checking", 0, 0, 1_000_000, bob).await;

    engine
        .transfer(TransferCmd::new(num(A), num(B), 100, "alice", day(14)))
        .await
        .unwrap();
    engine
        .transfer(TransferCmd::new(num(A), num(B), 200, "alice", day(14)))
        .await
        .unwrap();
    engine
        .transfer(TransferCmd::new(num(A), num(B), 400, "alice", day(15)))
        .await
        .unwrap();

    assert_eq!(
        engine
            .total_spent_by_user_on_date(alice, day(14).date_naive())
            .await
            .unwrap(),
        300
    );
    assert_eq!(
        engine
            .total_spent_by_user_on_date(alice, day(15).date_naive())
            .await
            .unwrap(),
        400
    );
    assert_eq!(
        engine
            .total_spent_by_user_on_date(alice, day(16).date_naive())
            .await
            .unwrap(),
        0
    );
    // Receiving money never counts as spend.
    assert_eq!(
        engine
            .total_spent_by_user_on_date(bob, day(14).date_naive())
            .await
            .unwrap(),
        0
    );
}
