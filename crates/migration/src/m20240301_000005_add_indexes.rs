use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // UserCredentials: one credential row per user
        manager
            .create_index(
                Index::create()
                    .name("uniq_user_credentials_user")
                    .table(UserCredentials::Table)
                    .col(UserCredentials::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Company: listing filters hit category and impact_level most often
        manager
            .create_index(
                Index::create()
                    .name("idx_company_category")
                    .table(Company::Table)
                    .col(Company::Category)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_company_impact_level")
                    .table(Company::Table)
                    .col(Company::ImpactLevel)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uniq_user_credentials_user")
                    .table(UserCredentials::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_company_category").table(Company::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_company_impact_level")
                    .table(Company::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum UserCredentials { Table, UserId }

#[derive(DeriveIden)]
enum Company { Table, Category, ImpactLevel }
