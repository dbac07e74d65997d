use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RegistrationAttempts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RegistrationAttempts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RegistrationAttempts::Municipality).text())
                    .col(ColumnDef::new(RegistrationAttempts::PartySize).big_integer())
                    .col(
                        ColumnDef::new(RegistrationAttempts::Fingerprint)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RegistrationAttempts::DateKey)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RegistrationAttempts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RegistrationAttempts::Reason)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RegistrationAttempts::Errors).text().not_null())
                    .col(ColumnDef::new(RegistrationAttempts::DuplicateOf).uuid())
                    .col(ColumnDef::new(RegistrationAttempts::ClientIp).text())
                    .col(ColumnDef::new(RegistrationAttempts::UserAgent).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_registration_attempts_date_key")
                    .table(RegistrationAttempts::Table)
                    .col(RegistrationAttempts::DateKey)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RegistrationAttempts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RegistrationAttempts {
    Table,
    Id,
    Municipality,
    PartySize,
    Fingerprint,
    DateKey,
    CreatedAt,
    Reason,
    Errors,
    DuplicateOf,
    ClientIp,
    UserAgent,
}
