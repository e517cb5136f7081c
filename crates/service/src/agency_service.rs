//! Agency CRUD. Creation, renaming and status changes belong to the global scope;
//! agency-scoped callers can only read their own agency.

use std::collections::BTreeMap;

use uuid::Uuid;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::{agency, agency_point, user};
use crate::errors::ServiceError;
use crate::non_blank;
use crate::scope::Scope;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgency {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

/// Partial update; blank fields are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgency {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyWithCounts {
    #[serde(flatten)]
    pub agency: agency::Model,
    pub agency_points_count: u64,
    pub users_count: u64,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UsersStats {
    pub active: u64,
    pub inactive: u64,
    pub roles: BTreeMap<String, u64>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyDetails {
    pub agency: agency::Model,
    pub agency_points: Vec<agency_point::Model>,
    pub users_stats: UsersStats,
}

fn require_global(scope: &Scope) -> Result<(), ServiceError> {
    if scope.is_global() { Ok(()) } else { Err(ServiceError::forbidden("super administrator only")) }
}

pub async fn list_agencies(db: &DatabaseConnection, scope: &Scope) -> Result<Vec<agency::Model>, ServiceError> {
    let mut q = agency::Entity::find().order_by_asc(agency::Column::Name);
    if let Some(id) = scope.agency_id() {
        q = q.filter(agency::Column::Id.eq(id));
    }
    Ok(q.all(db).await?)
}

/// Fetch an agency visible to `scope`; foreign agencies read as missing.
pub async fn get_agency(db: &DatabaseConnection, scope: &Scope, id: Uuid) -> Result<agency::Model, ServiceError> {
    agency::Entity::find_by_id(id)
        .one(db)
        .await?
        .filter(|a| scope.allows_agency(a.id))
        .ok_or_else(|| ServiceError::not_found("agency"))
}

async fn with_counts(db: &DatabaseConnection, agency: agency::Model) -> Result<AgencyWithCounts, ServiceError> {
    let agency_points_count = agency_point::Entity::find()
        .filter(agency_point::Column::AgencyId.eq(agency.id))
        .count(db)
        .await?;
    let users_count = user::Entity::find()
        .filter(user::Column::AgencyId.eq(agency.id))
        .count(db)
        .await?;
    Ok(AgencyWithCounts { agency, agency_points_count, users_count })
}

pub async fn list_agencies_with_counts(db: &DatabaseConnection, scope: &Scope) -> Result<Vec<AgencyWithCounts>, ServiceError> {
    let agencies = list_agencies(db, scope).await?;
    let mut out = Vec::with_capacity(agencies.len());
    for a in agencies {
        out.push(with_counts(db, a).await?);
    }
    Ok(out)
}

pub async fn get_agency_with_counts(db: &DatabaseConnection, scope: &Scope, id: Uuid) -> Result<AgencyWithCounts, ServiceError> {
    let agency = get_agency(db, scope, id).await?;
    with_counts(db, agency).await
}

pub async fn agency_details(db: &DatabaseConnection, scope: &Scope, id: Uuid) -> Result<AgencyDetails, ServiceError> {
    let agency = get_agency(db, scope, id).await?;
    let agency_points = agency_point::Entity::find()
        .filter(agency_point::Column::AgencyId.eq(id))
        .order_by_asc(agency_point::Column::Name)
        .all(db)
        .await?;
    let users = user::Entity::find()
        .filter(user::Column::AgencyId.eq(id))
        .all(db)
        .await?;
    let mut users_stats = UsersStats::default();
    for u in &users {
        if u.is_active { users_stats.active += 1 } else { users_stats.inactive += 1 }
        *users_stats.roles.entry(u.role.clone()).or_insert(0) += 1;
    }
    Ok(AgencyDetails { agency, agency_points, users_stats })
}

pub async fn create_agency(db: &DatabaseConnection, scope: &Scope, input: CreateAgency) -> Result<agency::Model, ServiceError> {
    require_global(scope)?;
    agency::validate_name(&input.name)?;
    if agency::find_by_name(db, &input.name).await?.is_some() {
        return Err(ServiceError::Conflict(format!("an agency named '{}' already exists", input.name.trim())));
    }
    let created = agency::create(db, &input.name, &input.address, &input.phone, &input.email).await?;
    info!(agency_id = %created.id, name = %created.name, "agency_created");
    Ok(created)
}

pub async fn update_agency(db: &DatabaseConnection, scope: &Scope, id: Uuid, input: UpdateAgency) -> Result<agency::Model, ServiceError> {
    require_global(scope)?;
    let current = get_agency(db, scope, id).await?;
    let mut am: agency::ActiveModel = current.clone().into();
    if let Some(name) = non_blank(input.name) {
        agency::validate_name(&name)?;
        if let Some(other) = agency::find_by_name(db, &name).await? {
            if other.id != id {
                return Err(ServiceError::Conflict(format!("an agency named '{}' already exists", name)));
            }
        }
        am.name = Set(name);
    }
    if let Some(address) = non_blank(input.address) { am.address = Set(address); }
    if let Some(phone) = non_blank(input.phone) { am.phone = Set(phone); }
    if let Some(email) = non_blank(input.email) {
        models::user::validate_email(&email)?;
        am.email = Set(email);
    }
    Ok(am.update(db).await?)
}

pub async fn set_agency_active(db: &DatabaseConnection, scope: &Scope, id: Uuid, active: bool) -> Result<agency::Model, ServiceError> {
    require_global(scope)?;
    let mut am: agency::ActiveModel = get_agency(db, scope, id).await?.into();
    am.is_active = Set(active);
    let updated = am.update(db).await?;
    info!(agency_id = %id, active, "agency_status_changed");
    Ok(updated)
}
