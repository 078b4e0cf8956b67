//! Create `company` table.
//!
//! `years_of_experience` stores the raw experience value in years.
//! The unique index on `name` is the authoritative duplicate guard; the
//! service pre-check only exists for a friendlier error message.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Company::Table)
                    .if_not_exists()
                    .col(uuid(Company::Id).primary_key())
                    .col(string_len(Company::Name, 255).not_null())
                    .col(string_len(Company::ImpactLevel, 16).not_null())
                    .col(integer(Company::YearsOfExperience).not_null())
                    .col(string_len(Company::Category, 128).not_null())
                    .col(boolean(Company::Status).not_null().default(true))
                    .col(timestamp_with_time_zone(Company::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Company::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_company_name")
                    .table(Company::Table)
                    .col(Company::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Company::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Company {
    Table,
    Id,
    Name,
    ImpactLevel,
    YearsOfExperience,
    Category,
    Status,
    CreatedAt,
    UpdatedAt,
}
