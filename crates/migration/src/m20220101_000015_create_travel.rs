//! Create `travel` table.
//! Prices are stored in minor units.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Travel::Table)
                    .if_not_exists()
                    .col(uuid(Travel::Id).primary_key())
                    .col(uuid(Travel::AgencyId).not_null())
                    .col(uuid_null(Travel::AgencyPointId))
                    .col(string_len(Travel::Departure, 128).not_null())
                    .col(string_len(Travel::Destination, 128).not_null())
                    .col(timestamp_with_time_zone(Travel::DepartureDate).not_null())
                    .col(timestamp_with_time_zone(Travel::ArrivalDate).not_null())
                    .col(big_integer(Travel::PriceCents).not_null())
                    .col(integer(Travel::AvailableSeats).not_null())
                    .col(boolean(Travel::IsActive).not_null())
                    .col(timestamp_with_time_zone(Travel::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_travel_agency")
                            .from(Travel::Table, Travel::AgencyId)
                            .to(Agency::Table, Agency::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_travel_agency_point")
                            .from(Travel::Table, Travel::AgencyPointId)
                            .to(AgencyPoint::Table, AgencyPoint::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Travel::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Travel {
    Table,
    Id,
    AgencyId,
    AgencyPointId,
    Departure,
    Destination,
    DepartureDate,
    ArrivalDate,
    PriceCents,
    AvailableSeats,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Agency { Table, Id }

#[derive(DeriveIden)]
enum AgencyPoint { Table, Id }
