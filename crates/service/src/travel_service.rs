use uuid::Uuid;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Deserialize;
use tracing::info;

use models::{agency_point, travel};
use crate::errors::ServiceError;
use crate::non_blank;
use crate::scope::Scope;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTravel {
    pub departure: String,
    pub destination: String,
    pub departure_date: DateTimeWithTimeZone,
    pub arrival_date: DateTimeWithTimeZone,
    pub price_cents: i64,
    pub available_seats: i32,
    /// Only honoured for agency admins; point admins always get their own point.
    #[serde(default)]
    pub agency_point_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTravel {
    pub departure: Option<String>,
    pub destination: Option<String>,
    pub departure_date: Option<DateTimeWithTimeZone>,
    pub arrival_date: Option<DateTimeWithTimeZone>,
    pub price_cents: Option<i64>,
    pub available_seats: Option<i32>,
    pub agency_point_id: Option<Uuid>,
}

/// Travels managed by `scope`: the whole agency, or the caller's point only.
pub async fn list_travels(db: &DatabaseConnection, scope: &Scope) -> Result<Vec<travel::Model>, ServiceError> {
    let mut q = travel::Entity::find().order_by_asc(travel::Column::DepartureDate);
    match scope {
        Scope::Global => {}
        Scope::Agency { agency_id } => q = q.filter(travel::Column::AgencyId.eq(*agency_id)),
        Scope::Point { agency_id, agency_point_id } => {
            q = q
                .filter(travel::Column::AgencyId.eq(*agency_id))
                .filter(travel::Column::AgencyPointId.eq(*agency_point_id))
        }
    }
    Ok(q.all(db).await?)
}

/// Active travels of the caller's agency, open for booking.
pub async fn list_bookable_travels(db: &DatabaseConnection, scope: &Scope) -> Result<Vec<travel::Model>, ServiceError> {
    let agency_id = scope.require_agency()?;
    let travels = travel::Entity::find()
        .filter(
            Condition::all()
                .add(travel::Column::AgencyId.eq(agency_id))
                .add(travel::Column::IsActive.eq(true)),
        )
        .order_by_asc(travel::Column::DepartureDate)
        .all(db)
        .await?;
    Ok(travels)
}

/// Any travel of the caller's agency; foreign travels read as missing.
pub async fn get_travel(db: &DatabaseConnection, scope: &Scope, id: Uuid) -> Result<travel::Model, ServiceError> {
    travel::Entity::find_by_id(id)
        .one(db)
        .await?
        .filter(|t| scope.allows_agency(t.agency_id))
        .ok_or_else(|| ServiceError::not_found("travel"))
}

async fn point_in_agency(db: &DatabaseConnection, agency_id: Uuid, point_id: Uuid) -> Result<Uuid, ServiceError> {
    agency_point::Entity::find_by_id(point_id)
        .one(db)
        .await?
        .filter(|p| p.agency_id == agency_id)
        .map(|p| p.id)
        .ok_or_else(|| ServiceError::validation("agency point does not exist in this agency"))
}

pub async fn create_travel(db: &DatabaseConnection, scope: &Scope, input: CreateTravel) -> Result<travel::Model, ServiceError> {
    let (agency_id, agency_point_id) = match scope {
        Scope::Global => return Err(ServiceError::forbidden("travels are created by agency staff")),
        Scope::Agency { agency_id } => {
            let point = match input.agency_point_id {
                Some(p) => Some(point_in_agency(db, *agency_id, p).await?),
                None => None,
            };
            (*agency_id, point)
        }
        Scope::Point { agency_id, agency_point_id } => (*agency_id, Some(*agency_point_id)),
    };
    let created = travel::create(db, travel::NewTravel {
        agency_id,
        agency_point_id,
        departure: input.departure,
        destination: input.destination,
        departure_date: input.departure_date,
        arrival_date: input.arrival_date,
        price_cents: input.price_cents,
        available_seats: input.available_seats,
    })
    .await?;
    info!(travel_id = %created.id, agency_id = %agency_id, "travel_created");
    Ok(created)
}

pub async fn update_travel(db: &DatabaseConnection, scope: &Scope, id: Uuid, input: UpdateTravel) -> Result<travel::Model, ServiceError> {
    let current = get_travel(db, scope, id).await?;
    let departure = non_blank(input.departure).unwrap_or_else(|| current.departure.clone());
    let destination = non_blank(input.destination).unwrap_or_else(|| current.destination.clone());
    let departure_date = input.departure_date.unwrap_or(current.departure_date);
    let arrival_date = input.arrival_date.unwrap_or(current.arrival_date);
    let price_cents = input.price_cents.unwrap_or(current.price_cents);
    let available_seats = input.available_seats.unwrap_or(current.available_seats);
    travel::validate(&departure, &destination, &departure_date, &arrival_date, price_cents, available_seats)?;

    let agency_point_id = match input.agency_point_id {
        Some(p) => Some(point_in_agency(db, current.agency_id, p).await?),
        None => current.agency_point_id,
    };

    let mut am: travel::ActiveModel = current.into();
    am.departure = Set(departure);
    am.destination = Set(destination);
    am.departure_date = Set(departure_date);
    am.arrival_date = Set(arrival_date);
    am.price_cents = Set(price_cents);
    am.available_seats = Set(available_seats);
    am.agency_point_id = Set(agency_point_id);
    Ok(am.update(db).await?)
}

pub async fn set_travel_active(db: &DatabaseConnection, scope: &Scope, id: Uuid, active: bool) -> Result<travel::Model, ServiceError> {
    let mut am: travel::ActiveModel = get_travel(db, scope, id).await?.into();
    am.is_active = Set(active);
    let updated = am.update(db).await?;
    info!(travel_id = %id, active, "travel_status_changed");
    Ok(updated)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crate::test_support::{get_db, seed_tenant};

    pub(crate) fn trip(seats: i32) -> CreateTravel {
        let now = Utc::now();
        CreateTravel {
            departure: "Dakar".into(),
            destination: "Lisbon".into(),
            departure_date: (now + Duration::days(10)).into(),
            arrival_date: (now + Duration::days(11)).into(),
            price_cents: 45_000,
            available_seats: seats,
            agency_point_id: None,
        }
    }

    #[tokio::test]
    async fn travels_are_scoped_by_agency_and_point() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let t = seed_tenant(&db, "Alpha").await?;
        let other = seed_tenant(&db, "Beta").await?;

        let agency_wide = create_travel(&db, &t.global_admin.scope, trip(20)).await?;
        assert_eq!(agency_wide.agency_point_id, None);
        let at_point = create_travel(&db, &t.point_admin.scope, trip(5)).await?;
        assert_eq!(at_point.agency_point_id, Some(t.point.id));
        let foreign = create_travel(&db, &other.global_admin.scope, trip(5)).await?;

        assert_eq!(list_travels(&db, &t.global_admin.scope).await?.len(), 2);
        let point_list = list_travels(&db, &t.point_admin.scope).await?;
        assert_eq!(point_list.len(), 1);
        assert_eq!(point_list[0].id, at_point.id);

        assert!(matches!(get_travel(&db, &t.global_admin.scope, foreign.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(create_travel(&db, &Scope::Global, trip(1)).await, Err(ServiceError::Forbidden(_))));

        let mut bad_point = trip(1);
        bad_point.agency_point_id = Some(other.point.id);
        assert!(matches!(create_travel(&db, &t.global_admin.scope, bad_point).await, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn update_and_toggle_keep_invariants() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let t = seed_tenant(&db, "Alpha").await?;
        let scope = t.global_admin.scope;
        let tr = create_travel(&db, &scope, trip(20)).await?;

        let updated = update_travel(&db, &scope, tr.id, UpdateTravel { price_cents: Some(50_000), destination: Some(" ".into()), ..Default::default() }).await?;
        assert_eq!(updated.price_cents, 50_000);
        assert_eq!(updated.destination, "Lisbon");

        let backwards = update_travel(&db, &scope, tr.id, UpdateTravel {
            arrival_date: Some((Utc::now() - Duration::days(1)).into()),
            ..Default::default()
        }).await;
        assert!(matches!(backwards, Err(ServiceError::Model(_))));

        set_travel_active(&db, &scope, tr.id, false).await?;
        assert!(list_bookable_travels(&db, &t.operator.scope).await?.is_empty());
        set_travel_active(&db, &scope, tr.id, true).await?;
        assert_eq!(list_bookable_travels(&db, &t.operator.scope).await?.len(), 1);
        Ok(())
    }
}
