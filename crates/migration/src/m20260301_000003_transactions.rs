use sea_orm_migration::prelude::*;

use crate::m20260301_000001_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    AmountMinor,
    Description,
    CreatedAt,
    FromAccountNumber,
    ToAccountNumber,
    InitiatorId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Description).string())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::FromAccountNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::ToAccountNumber)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::InitiatorId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-initiator_id")
                            .from(Transactions::Table, Transactions::InitiatorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-initiator_id-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::InitiatorId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-from_account_number")
                    .table(Transactions::Table)
                    .col(Transactions::FromAccountNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-to_account_number")
                    .table(Transactions::Table)
                    .col(Transactions::ToAccountNumber)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}
