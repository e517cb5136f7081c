//! Create `agency` table.
//!
//! Root entity for multi-tenancy; every other business table references it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Agency::Table)
                    .if_not_exists()
                    .col(uuid(Agency::Id).primary_key())
                    .col(string_len(Agency::Name, 128).unique_key().not_null())
                    .col(string_len(Agency::Address, 255).not_null())
                    .col(string_len(Agency::Phone, 32).not_null())
                    .col(string_len(Agency::Email, 255).not_null())
                    .col(boolean(Agency::IsActive).not_null())
                    .col(timestamp_with_time_zone(Agency::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Agency::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Agency { Table, Id, Name, Address, Phone, Email, IsActive, CreatedAt }
