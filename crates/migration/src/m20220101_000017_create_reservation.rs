//! Create `reservation` table linking travel, client and agency.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservation::Table)
                    .if_not_exists()
                    .col(uuid(Reservation::Id).primary_key())
                    .col(uuid(Reservation::TravelId).not_null())
                    .col(uuid(Reservation::ClientId).not_null())
                    .col(uuid(Reservation::AgencyId).not_null())
                    .col(uuid_null(Reservation::AgencyPointId))
                    .col(integer(Reservation::NumberOfPassengers).not_null())
                    .col(big_integer(Reservation::TotalPriceCents).not_null())
                    .col(string_len(Reservation::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Reservation::ReservationDate).not_null())
                    .col(
                        ColumnDef::new(Reservation::ConfirmationDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(uuid_null(Reservation::ConfirmedById))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservation_travel")
                            .from(Reservation::Table, Reservation::TravelId)
                            .to(Travel::Table, Travel::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservation_client")
                            .from(Reservation::Table, Reservation::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservation_agency")
                            .from(Reservation::Table, Reservation::AgencyId)
                            .to(Agency::Table, Agency::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservation_agency_point")
                            .from(Reservation::Table, Reservation::AgencyPointId)
                            .to(AgencyPoint::Table, AgencyPoint::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservation_confirmed_by")
                            .from(Reservation::Table, Reservation::ConfirmedById)
                            .to(AppUser::Table, AppUser::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Reservation::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Reservation {
    Table,
    Id,
    TravelId,
    ClientId,
    AgencyId,
    AgencyPointId,
    NumberOfPassengers,
    TotalPriceCents,
    Status,
    ReservationDate,
    ConfirmationDate,
    ConfirmedById,
}

#[derive(DeriveIden)]
enum Travel { Table, Id }

#[derive(DeriveIden)]
enum Client { Table, Id }

#[derive(DeriveIden)]
enum Agency { Table, Id }

#[derive(DeriveIden)]
enum AgencyPoint { Table, Id }

#[derive(DeriveIden)]
enum AppUser { Table, Id }
