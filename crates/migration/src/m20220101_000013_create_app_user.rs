//! Create `app_user` table with FKs to `agency`, `agency_point` and itself.
//!
//! Staff accounts. Tenant links are restricted so an agency with staff cannot
//! be removed by accident.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppUser::Table)
                    .if_not_exists()
                    .col(uuid(AppUser::Id).primary_key())
                    .col(string_len(AppUser::Email, 255).unique_key().not_null())
                    .col(string_len(AppUser::FirstName, 128).not_null())
                    .col(string_len(AppUser::LastName, 128).not_null())
                    .col(string_len(AppUser::PhoneNumber, 32).not_null())
                    .col(string_len(AppUser::Role, 32).not_null())
                    .col(boolean(AppUser::IsActive).not_null())
                    .col(boolean(AppUser::IsSuperAdmin).not_null())
                    .col(uuid_null(AppUser::AgencyId))
                    .col(uuid_null(AppUser::AgencyPointId))
                    .col(uuid_null(AppUser::CreatedById))
                    .col(timestamp_with_time_zone(AppUser::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(AppUser::UpdatedAt).not_null())
                    .col(
                        ColumnDef::new(AppUser::LastLoginAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_app_user_agency")
                            .from(AppUser::Table, AppUser::AgencyId)
                            .to(Agency::Table, Agency::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_app_user_agency_point")
                            .from(AppUser::Table, AppUser::AgencyPointId)
                            .to(AgencyPoint::Table, AgencyPoint::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_app_user_created_by")
                            .from(AppUser::Table, AppUser::CreatedById)
                            .to(AppUser::Table, AppUser::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AppUser::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AppUser {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    PhoneNumber,
    Role,
    IsActive,
    IsSuperAdmin,
    AgencyId,
    AgencyPointId,
    CreatedById,
    CreatedAt,
    UpdatedAt,
    LastLoginAt,
}

#[derive(DeriveIden)]
enum Agency { Table, Id }

#[derive(DeriveIden)]
enum AgencyPoint { Table, Id }
