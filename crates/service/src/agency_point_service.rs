use uuid::Uuid;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::{agency, agency_point, reservation, user};
use crate::errors::ServiceError;
use crate::non_blank;
use crate::scope::{Role, Scope};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgencyPoint {
    /// Required for super administrators, ignored for agency admins.
    #[serde(default)]
    pub agency_id: Option<Uuid>,
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgencyPoint {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyPointWithCounts {
    #[serde(flatten)]
    pub agency_point: agency_point::Model,
    pub users_count: u64,
    pub operators_count: u64,
    pub reservations_count: u64,
}

pub async fn list_points(db: &DatabaseConnection, scope: &Scope) -> Result<Vec<agency_point::Model>, ServiceError> {
    let mut q = agency_point::Entity::find().order_by_asc(agency_point::Column::Name);
    match scope {
        Scope::Global => {}
        Scope::Agency { agency_id } => q = q.filter(agency_point::Column::AgencyId.eq(*agency_id)),
        Scope::Point { agency_point_id, .. } => q = q.filter(agency_point::Column::Id.eq(*agency_point_id)),
    }
    Ok(q.all(db).await?)
}

pub async fn get_point(db: &DatabaseConnection, scope: &Scope, id: Uuid) -> Result<agency_point::Model, ServiceError> {
    agency_point::Entity::find_by_id(id)
        .one(db)
        .await?
        .filter(|p| scope.allows_point(p.agency_id, p.id))
        .ok_or_else(|| ServiceError::not_found("agency point"))
}

pub async fn list_points_with_counts(db: &DatabaseConnection, scope: &Scope) -> Result<Vec<AgencyPointWithCounts>, ServiceError> {
    let points = list_points(db, scope).await?;
    let mut out = Vec::with_capacity(points.len());
    for p in points {
        out.push(with_counts(db, p).await?);
    }
    Ok(out)
}

pub async fn get_point_with_counts(db: &DatabaseConnection, scope: &Scope, id: Uuid) -> Result<AgencyPointWithCounts, ServiceError> {
    let agency_point = get_point(db, scope, id).await?;
    with_counts(db, agency_point).await
}

async fn with_counts(db: &DatabaseConnection, agency_point: agency_point::Model) -> Result<AgencyPointWithCounts, ServiceError> {
    let id = agency_point.id;
    let users_count = user::Entity::find()
        .filter(user::Column::AgencyPointId.eq(id))
        .count(db)
        .await?;
    let operators_count = user::Entity::find()
        .filter(user::Column::AgencyPointId.eq(id))
        .filter(user::Column::Role.eq(Role::AgencyOperator.as_str()))
        .count(db)
        .await?;
    let reservations_count = reservation::Entity::find()
        .filter(reservation::Column::AgencyPointId.eq(id))
        .count(db)
        .await?;
    Ok(AgencyPointWithCounts { agency_point, users_count, operators_count, reservations_count })
}

pub async fn create_point(db: &DatabaseConnection, scope: &Scope, input: CreateAgencyPoint) -> Result<agency_point::Model, ServiceError> {
    let agency_id = match scope {
        Scope::Global => {
            let id = input.agency_id.ok_or_else(|| ServiceError::validation("agencyId is required"))?;
            agency::Entity::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::validation("agency does not exist"))?
                .id
        }
        Scope::Agency { agency_id } => *agency_id,
        Scope::Point { .. } => return Err(ServiceError::forbidden("agency point admins cannot create agency points")),
    };
    agency_point::validate_name(&input.name)?;
    if agency_point::find_by_agency_and_name(db, agency_id, &input.name).await?.is_some() {
        return Err(ServiceError::Conflict(format!("agency point '{}' already exists in this agency", input.name.trim())));
    }
    let created = agency_point::create(db, agency_id, &input.name, &input.address, &input.phone, input.email.as_deref()).await?;
    info!(agency_point_id = %created.id, agency_id = %agency_id, "agency_point_created");
    Ok(created)
}

pub async fn update_point(db: &DatabaseConnection, scope: &Scope, id: Uuid, input: UpdateAgencyPoint) -> Result<agency_point::Model, ServiceError> {
    if matches!(scope, Scope::Point { .. }) {
        return Err(ServiceError::forbidden("agency point admins cannot edit agency points"));
    }
    let current = get_point(db, scope, id).await?;
    let agency_id = current.agency_id;
    let mut am: agency_point::ActiveModel = current.into();
    if let Some(name) = non_blank(input.name) {
        agency_point::validate_name(&name)?;
        if let Some(other) = agency_point::find_by_agency_and_name(db, agency_id, &name).await? {
            if other.id != id {
                return Err(ServiceError::Conflict(format!("agency point '{}' already exists in this agency", name)));
            }
        }
        am.name = Set(name);
    }
    if let Some(address) = non_blank(input.address) { am.address = Set(address); }
    if let Some(phone) = non_blank(input.phone) { am.phone = Set(phone); }
    if let Some(email) = non_blank(input.email) {
        models::user::validate_email(&email)?;
        am.email = Set(Some(email));
    }
    Ok(am.update(db).await?)
}

pub async fn set_point_active(db: &DatabaseConnection, scope: &Scope, id: Uuid, active: bool) -> Result<agency_point::Model, ServiceError> {
    if matches!(scope, Scope::Point { .. }) {
        return Err(ServiceError::forbidden("agency point admins cannot change agency point status"));
    }
    let mut am: agency_point::ActiveModel = get_point(db, scope, id).await?.into();
    am.is_active = Set(active);
    let updated = am.update(db).await?;
    info!(agency_point_id = %id, active, "agency_point_status_changed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_tenant};

    fn input(agency_id: Option<Uuid>, name: &str) -> CreateAgencyPoint {
        CreateAgencyPoint { agency_id, name: name.into(), address: "addr".into(), phone: "+2".into(), email: None }
    }

    #[tokio::test]
    async fn super_admin_creates_points_for_existing_agencies() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let t = seed_tenant(&db, "Alpha").await?;

        let p = create_point(&db, &Scope::Global, input(Some(t.agency.id), "North")).await?;
        assert_eq!(p.agency_id, t.agency.id);

        assert!(matches!(create_point(&db, &Scope::Global, input(Some(Uuid::new_v4()), "X")).await, Err(ServiceError::Validation(_))));
        assert!(matches!(create_point(&db, &Scope::Global, input(None, "X")).await, Err(ServiceError::Validation(_))));
        assert!(matches!(create_point(&db, &Scope::Global, input(Some(t.agency.id), "North")).await, Err(ServiceError::Conflict(_))));

        let (a, b) = tokio::join!(
            create_point(&db, &Scope::Global, input(Some(t.agency.id), "East")),
            create_point(&db, &Scope::Global, input(Some(t.agency.id), "East")),
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert!(matches!(a.err().or(b.err()), Some(ServiceError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn global_admin_is_confined_to_own_agency() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let t = seed_tenant(&db, "Alpha").await?;
        let other = seed_tenant(&db, "Beta").await?;
        let scope = t.global_admin.scope;

        // agency id in the body is ignored
        let p = create_point(&db, &scope, input(Some(other.agency.id), "South")).await?;
        assert_eq!(p.agency_id, t.agency.id);

        assert_eq!(list_points(&db, &scope).await?.len(), 2);
        assert!(matches!(get_point(&db, &scope, other.point.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            update_point(&db, &scope, other.point.id, UpdateAgencyPoint { name: Some("Hijack".into()), ..Default::default() }).await,
            Err(ServiceError::NotFound(_))
        ));

        let renamed = update_point(&db, &scope, p.id, UpdateAgencyPoint { name: Some("Main".into()), ..Default::default() }).await;
        assert!(matches!(renamed, Err(ServiceError::Conflict(_))));

        let off = set_point_active(&db, &scope, p.id, false).await?;
        assert!(!off.is_active);

        assert_eq!(list_points_with_counts(&db, &scope).await?.len(), 2);
        let counts = get_point_with_counts(&db, &scope, t.point.id).await?;
        assert_eq!(counts.users_count, 2);
        assert_eq!(counts.operators_count, 1);
        assert_eq!(counts.reservations_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn point_scope_sees_only_its_point() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let t = seed_tenant(&db, "Alpha").await?;
        let scope = t.point_admin.scope;
        create_point(&db, &t.global_admin.scope, input(None, "Other")).await?;
        let points = list_points(&db, &scope).await?;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, t.point.id);
        assert!(matches!(create_point(&db, &scope, input(None, "Mine")).await, Err(ServiceError::Forbidden(_))));
        Ok(())
    }
}
