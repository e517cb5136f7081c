#![cfg(test)]
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use uuid::Uuid;

use models::db::{connect_with_config, DatabaseConfig};
use models::{agency, agency_point, user};
use crate::scope::{CurrentUser, Role};

/// Migrated SQLite database private to the calling test.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let path = std::env::temp_dir().join(format!("service-test-{}.db", Uuid::new_v4()));
    let cfg = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// One agency with one point and an account per role.
pub struct Tenant {
    pub agency: agency::Model,
    pub point: agency_point::Model,
    pub super_admin: CurrentUser,
    pub global_admin: CurrentUser,
    pub point_admin: CurrentUser,
    pub operator: CurrentUser,
}

pub async fn insert_user(
    db: &DatabaseConnection,
    role: Role,
    agency_id: Option<Uuid>,
    agency_point_id: Option<Uuid>,
) -> Result<CurrentUser, anyhow::Error> {
    let u = user::create(db, user::NewUser {
        email: format!("{}-{}@travel.test", role.as_str().to_lowercase(), Uuid::new_v4()),
        first_name: "Test".into(),
        last_name: role.as_str().into(),
        phone_number: "+100".into(),
        role: role.to_string(),
        is_super_admin: role == Role::SuperAdmin,
        agency_id,
        agency_point_id,
        created_by_id: None,
    })
    .await?;
    Ok(CurrentUser::from_model(&u)?)
}

pub async fn seed_tenant(db: &DatabaseConnection, name: &str) -> Result<Tenant, anyhow::Error> {
    let agency = agency::create(db, name, "1 Harbour Rd", "+100", &format!("info@{}.test", name.to_lowercase())).await?;
    let point = agency_point::create(db, agency.id, "Main", "2 Harbour Rd", "+101", None).await?;
    let super_admin = insert_user(db, Role::SuperAdmin, None, None).await?;
    let global_admin = insert_user(db, Role::AgencyGlobalAdmin, Some(agency.id), None).await?;
    let point_admin = insert_user(db, Role::AgencyPointAdmin, Some(agency.id), Some(point.id)).await?;
    let operator = insert_user(db, Role::AgencyOperator, Some(agency.id), Some(point.id)).await?;
    Ok(Tenant { agency, point, super_admin, global_admin, point_admin, operator })
}

