pub use sea_orm_migration::prelude::*;

mod m20260301_000001_users;
mod m20260301_000002_accounts;
mod m20260301_000003_transactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_users::Migration),
            Box::new(m20260301_000002_accounts::Migration),
            Box::new(m20260301_000003_transactions::Migration),
        ]
    }
}
