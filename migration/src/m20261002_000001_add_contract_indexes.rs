use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Contracts {
    Table,
    MemberId,
    Status,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Member dashboards list their own contracts, newest first.
        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_member_created")
                    .table(Contracts::Table)
                    .col(Contracts::MemberId)
                    .col(Contracts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_status")
                    .table(Contracts::Table)
                    .col(Contracts::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_contracts_status")
                    .table(Contracts::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_contracts_member_created")
                    .table(Contracts::Table)
                    .to_owned(),
            )
            .await
    }
}
