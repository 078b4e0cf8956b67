//! One-shot fixup for the legacy experience contract.
//!
//! An earlier deployment stored a calendar foundation year (e.g. 1990) in
//! `years_of_experience` and derived the displayed value at read time.
//! The canonical contract stores the raw experience in years, so rows still
//! holding a foundation year are rewritten once to `current_year - value`.
//! Values >= 1800 cannot be legitimate raw experience and identify legacy
//! rows. The original values are not recoverable, so `down` is a no-op.
use chrono::{Datelike, Utc};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let current_year = Utc::now().year();
        let sql = format!(
            "UPDATE \"company\" SET \"years_of_experience\" = {current_year} - \"years_of_experience\" \
             WHERE \"years_of_experience\" >= 1800"
        );
        manager.get_connection().execute_unprepared(&sql).await?;
        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // The original foundation years are not recoverable once rewritten.
        Ok(())
    }
}
