//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20220101_000011_create_agency;
mod m20220101_000012_create_agency_point;
mod m20220101_000013_create_app_user;
mod m20220101_000014_create_user_credentials;
mod m20220101_000015_create_travel;
mod m20220101_000016_create_client;
mod m20220101_000017_create_reservation;
mod m20220101_000002_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220101_000011_create_agency::Migration),
            Box::new(m20220101_000012_create_agency_point::Migration),
            Box::new(m20220101_000013_create_app_user::Migration),
            Box::new(m20220101_000014_create_user_credentials::Migration),
            Box::new(m20220101_000015_create_travel::Migration),
            Box::new(m20220101_000016_create_client::Migration),
            Box::new(m20220101_000017_create_reservation::Migration),
            // Indexes should always be applied last
            Box::new(m20220101_000002_add_indexes::Migration),
        ]
    }
}
