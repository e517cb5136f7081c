//! Dashboard aggregates per role tier.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

use models::{agency, agency_point, reservation, travel, user};
use models::reservation::ReservationStatus;
use crate::errors::ServiceError;
use crate::scope::{CurrentUser, Role, Scope};
use crate::user_service::{self, UserView};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_agencies: u64,
    pub total_users: u64,
    pub total_reservations: u64,
    pub active_users: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyStats {
    pub total_users: u64,
    pub active_users: u64,
    pub total_agency_points: u64,
    pub active_agency_points: u64,
    pub total_reservations: u64,
    pub pending_reservations: u64,
    pub total_travels: u64,
    pub active_travels: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyDashboard {
    pub agency: agency::Model,
    pub stats: AgencyStats,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointStats {
    pub total_operators: u64,
    pub active_operators: u64,
    pub total_reservations: u64,
    pub pending_reservations: u64,
    pub confirmed_reservations: u64,
    pub total_travels: u64,
    pub active_travels: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointDashboard {
    pub agency_point: agency_point::Model,
    pub operators: Vec<UserView>,
    pub stats: PointStats,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorStats {
    pub total_reservations: u64,
    pub pending_reservations: u64,
    pub confirmed_reservations: u64,
    pub confirmed_by_me: u64,
    pub bookable_travels: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorDashboard {
    pub agency_point: agency_point::Model,
    pub stats: OperatorStats,
}

pub async fn platform_stats(db: &DatabaseConnection) -> Result<PlatformStats, ServiceError> {
    Ok(PlatformStats {
        total_agencies: agency::Entity::find().count(db).await?,
        total_users: user::Entity::find().count(db).await?,
        total_reservations: reservation::Entity::find().count(db).await?,
        active_users: user::Entity::find().filter(user::Column::IsActive.eq(true)).count(db).await?,
    })
}

pub async fn agency_dashboard(db: &DatabaseConnection, scope: &Scope) -> Result<AgencyDashboard, ServiceError> {
    let agency_id = match scope {
        Scope::Agency { agency_id } => *agency_id,
        _ => return Err(ServiceError::forbidden("agency dashboard requires an agency scope")),
    };
    let agency = agency::Entity::find_by_id(agency_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("agency"))?;

    let users = || user::Entity::find().filter(user::Column::AgencyId.eq(agency_id));
    let points = || agency_point::Entity::find().filter(agency_point::Column::AgencyId.eq(agency_id));
    let reservations = || reservation::Entity::find().filter(reservation::Column::AgencyId.eq(agency_id));
    let travels = || travel::Entity::find().filter(travel::Column::AgencyId.eq(agency_id));

    let stats = AgencyStats {
        total_users: users().count(db).await?,
        active_users: users().filter(user::Column::IsActive.eq(true)).count(db).await?,
        total_agency_points: points().count(db).await?,
        active_agency_points: points().filter(agency_point::Column::IsActive.eq(true)).count(db).await?,
        total_reservations: reservations().count(db).await?,
        pending_reservations: reservations()
            .filter(reservation::Column::Status.eq(ReservationStatus::Pending.as_str()))
            .count(db)
            .await?,
        total_travels: travels().count(db).await?,
        active_travels: travels().filter(travel::Column::IsActive.eq(true)).count(db).await?,
    };
    Ok(AgencyDashboard { agency, stats })
}

async fn own_point(db: &DatabaseConnection, scope: &Scope) -> Result<agency_point::Model, ServiceError> {
    let (_, point_id) = scope.require_point()?;
    agency_point::Entity::find_by_id(point_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("agency point"))
}

async fn point_reservation_counts(db: &DatabaseConnection, point_id: uuid::Uuid) -> Result<(u64, u64, u64), ServiceError> {
    let reservations = || reservation::Entity::find().filter(reservation::Column::AgencyPointId.eq(point_id));
    Ok((
        reservations().count(db).await?,
        reservations().filter(reservation::Column::Status.eq(ReservationStatus::Pending.as_str())).count(db).await?,
        reservations().filter(reservation::Column::Status.eq(ReservationStatus::Confirmed.as_str())).count(db).await?,
    ))
}

pub async fn point_dashboard(db: &DatabaseConnection, actor: &CurrentUser) -> Result<PointDashboard, ServiceError> {
    if actor.role != Role::AgencyPointAdmin {
        return Err(ServiceError::forbidden("point dashboard requires the AgencyPointAdmin role"));
    }
    let agency_point = own_point(db, &actor.scope).await?;
    let operators = user_service::to_views(db, user_service::list_users(db, actor).await?).await?;
    let (total_reservations, pending_reservations, confirmed_reservations) = point_reservation_counts(db, agency_point.id).await?;
    let travels = || travel::Entity::find().filter(travel::Column::AgencyPointId.eq(agency_point.id));

    let stats = PointStats {
        total_operators: operators.len() as u64,
        active_operators: operators.iter().filter(|o| o.user.is_active).count() as u64,
        total_reservations,
        pending_reservations,
        confirmed_reservations,
        total_travels: travels().count(db).await?,
        active_travels: travels().filter(travel::Column::IsActive.eq(true)).count(db).await?,
    };
    Ok(PointDashboard { agency_point, operators, stats })
}

pub async fn operator_dashboard(db: &DatabaseConnection, actor: &CurrentUser) -> Result<OperatorDashboard, ServiceError> {
    let agency_point = own_point(db, &actor.scope).await?;
    let (total_reservations, pending_reservations, confirmed_reservations) = point_reservation_counts(db, agency_point.id).await?;
    let stats = OperatorStats {
        total_reservations,
        pending_reservations,
        confirmed_reservations,
        confirmed_by_me: reservation::Entity::find()
            .filter(reservation::Column::ConfirmedById.eq(actor.id))
            .count(db)
            .await?,
        bookable_travels: travel::Entity::find()
            .filter(travel::Column::AgencyId.eq(agency_point.agency_id))
            .filter(travel::Column::IsActive.eq(true))
            .count(db)
            .await?,
    };
    Ok(OperatorDashboard { agency_point, stats })
}
