use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ContractSignatures {
    Table,
    Id,
    ContractId,
    AdminSignatureData,
    AdminSignedAt,
    MemberSignatureData,
    MemberSignedAt,
    Status,
    DateSigned,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Contracts {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContractSignatures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContractSignatures::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContractSignatures::ContractId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContractSignatures::AdminSignatureData).text().null())
                    .col(
                        ColumnDef::new(ContractSignatures::AdminSignedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(ContractSignatures::MemberSignatureData).text().null())
                    .col(
                        ColumnDef::new(ContractSignatures::MemberSignedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ContractSignatures::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(ContractSignatures::DateSigned).string().null())
                    .col(
                        ColumnDef::new(ContractSignatures::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractSignatures::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contract_signatures_contract_id")
                            .from(ContractSignatures::Table, ContractSignatures::ContractId)
                            .to(Contracts::Table, Contracts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One signature record per contract; the upsert relies on it.
        manager
            .create_index(
                Index::create()
                    .name("idx_contract_signatures_contract_unique")
                    .table(ContractSignatures::Table)
                    .col(ContractSignatures::ContractId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContractSignatures::Table).to_owned())
            .await
    }
}
