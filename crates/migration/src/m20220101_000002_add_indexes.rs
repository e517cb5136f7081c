use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // AgencyPoint: composite unique (agency_id, name)
        manager
            .create_index(
                Index::create()
                    .name("uniq_agency_point_agency_name")
                    .table(AgencyPoint::Table)
                    .col(AgencyPoint::AgencyId)
                    .col(AgencyPoint::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Users: scope lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_app_user_agency")
                    .table(AppUser::Table)
                    .col(AppUser::AgencyId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_app_user_agency_point")
                    .table(AppUser::Table)
                    .col(AppUser::AgencyPointId)
                    .to_owned(),
            )
            .await?;

        // Travel: index on agency_id
        manager
            .create_index(
                Index::create()
                    .name("idx_travel_agency")
                    .table(Travel::Table)
                    .col(Travel::AgencyId)
                    .to_owned(),
            )
            .await?;

        // Reservation: index on agency_id and status
        manager
            .create_index(
                Index::create()
                    .name("idx_reservation_agency")
                    .table(Reservation::Table)
                    .col(Reservation::AgencyId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_reservation_status")
                    .table(Reservation::Table)
                    .col(Reservation::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_agency_point_agency_name").table(AgencyPoint::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_app_user_agency").table(AppUser::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_app_user_agency_point").table(AppUser::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_travel_agency").table(Travel::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_reservation_agency").table(Reservation::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_reservation_status").table(Reservation::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AgencyPoint { Table, AgencyId, Name }

#[derive(DeriveIden)]
enum AppUser { Table, AgencyId, AgencyPointId }

#[derive(DeriveIden)]
enum Travel { Table, AgencyId }

#[derive(DeriveIden)]
enum Reservation { Table, AgencyId, Status }
