//! Create `agency_point` table with FK to `agency`.
//!
//! Branches of an agency; removed together with their agency.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AgencyPoint::Table)
                    .if_not_exists()
                    .col(uuid(AgencyPoint::Id).primary_key())
                    .col(uuid(AgencyPoint::AgencyId).not_null())
                    .col(string_len(AgencyPoint::Name, 128).not_null())
                    .col(string_len(AgencyPoint::Address, 255).not_null())
                    .col(string_len(AgencyPoint::Phone, 32).not_null())
                    .col(string_len_null(AgencyPoint::Email, 255))
                    .col(boolean(AgencyPoint::IsActive).not_null())
                    .col(timestamp_with_time_zone(AgencyPoint::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_agency_point_agency")
                            .from(AgencyPoint::Table, AgencyPoint::AgencyId)
                            .to(Agency::Table, Agency::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AgencyPoint::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AgencyPoint { Table, Id, AgencyId, Name, Address, Phone, Email, IsActive, CreatedAt }

#[derive(DeriveIden)]
enum Agency { Table, Id }
