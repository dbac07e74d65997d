use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Registrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Registrations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Registrations::Municipality)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Registrations::PartySize).integer().not_null())
                    .col(
                        ColumnDef::new(Registrations::Fingerprint)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Registrations::DateKey).date().not_null())
                    .col(
                        ColumnDef::new(Registrations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one registration per visitor per day.
        manager
            .create_index(
                Index::create()
                    .name("ux_registrations_fingerprint_date_key")
                    .table(Registrations::Table)
                    .col(Registrations::Fingerprint)
                    .col(Registrations::DateKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_registrations_date_key")
                    .table(Registrations::Table)
                    .col(Registrations::DateKey)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Registrations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Registrations {
    Table,
    Id,
    Municipality,
    PartySize,
    Fingerprint,
    DateKey,
    CreatedAt,
}
