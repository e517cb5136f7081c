//! Bookings: seat accounting and the Pending → Confirmed / Cancelled lifecycle.
//!
//! Seats are taken and returned with guarded `UPDATE`s in the same transaction
//! as the reservation row, so concurrent requests cannot oversell or double-restore.

use uuid::Uuid;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::Deserialize;
use tracing::{info, instrument};

use models::{client, reservation, travel};
use models::reservation::ReservationStatus;
use crate::errors::ServiceError;
use crate::scope::{CurrentUser, Scope};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
    pub travel_id: Uuid,
    pub client_id: Uuid,
    pub number_of_passengers: i32,
}

pub async fn list_reservations(db: &DatabaseConnection, scope: &Scope) -> Result<Vec<reservation::Model>, ServiceError> {
    let mut q = reservation::Entity::find().order_by_desc(reservation::Column::ReservationDate);
    match scope {
        Scope::Global => {}
        Scope::Agency { agency_id } => q = q.filter(reservation::Column::AgencyId.eq(*agency_id)),
        Scope::Point { agency_id, agency_point_id } => {
            q = q
                .filter(reservation::Column::AgencyId.eq(*agency_id))
                .filter(reservation::Column::AgencyPointId.eq(*agency_point_id))
        }
    }
    Ok(q.all(db).await?)
}

pub async fn get_reservation(db: &DatabaseConnection, scope: &Scope, id: Uuid) -> Result<reservation::Model, ServiceError> {
    reservation::Entity::find_by_id(id)
        .one(db)
        .await?
        .filter(|r| match scope {
            Scope::Point { agency_id, agency_point_id } => {
                r.agency_id == *agency_id && r.agency_point_id == Some(*agency_point_id)
            }
            _ => scope.allows_agency(r.agency_id),
        })
        .ok_or_else(|| ServiceError::not_found("reservation"))
}

/// Book seats on an active travel of the caller's agency.
#[instrument(skip(db, actor, input), fields(actor = %actor.id, travel_id = %input.travel_id))]
pub async fn create_reservation(db: &DatabaseConnection, actor: &CurrentUser, input: CreateReservation) -> Result<reservation::Model, ServiceError> {
    let agency_id = actor.scope.require_agency()?;
    if input.number_of_passengers < 1 {
        return Err(ServiceError::validation("number of passengers must be >= 1"));
    }
    client::Entity::find_by_id(input.client_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::validation("client does not exist"))?;

    let txn = db.begin().await?;
    let trip = travel::Entity::find_by_id(input.travel_id)
        .one(&txn)
        .await?
        .filter(|t| t.agency_id == agency_id)
        .ok_or_else(|| ServiceError::not_found("travel"))?;
    if !trip.is_active {
        return Err(ServiceError::validation("travel is not open for booking"));
    }

    // seats are taken by a guarded decrement, never by writing back a value read earlier
    let taken = travel::Entity::update_many()
        .col_expr(
            travel::Column::AvailableSeats,
            Expr::col(travel::Column::AvailableSeats).sub(input.number_of_passengers),
        )
        .filter(travel::Column::Id.eq(trip.id))
        .filter(travel::Column::AvailableSeats.gte(input.number_of_passengers))
        .exec(&txn)
        .await?;
    if taken.rows_affected == 0 {
        return Err(ServiceError::validation(format!(
            "not enough seats: {} requested, {} available",
            input.number_of_passengers, trip.available_seats
        )));
    }

    let created = reservation::create(&txn, &trip, input.client_id, actor.scope.agency_point_id(), input.number_of_passengers).await?;
    txn.commit().await?;

    info!(reservation_id = %created.id, passengers = created.number_of_passengers, "reservation_created");
    Ok(created)
}

/// Move a reservation to `to` unless its status is one of `unless`. Returns
/// false when another request already moved it.
async fn transition<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    to: ReservationStatus,
    unless: &[ReservationStatus],
    extra: Vec<(reservation::Column, SimpleExpr)>,
) -> Result<bool, ServiceError> {
    let mut q = reservation::Entity::update_many()
        .col_expr(reservation::Column::Status, Expr::value(to.as_str()))
        .filter(reservation::Column::Id.eq(id))
        .filter(reservation::Column::Status.is_not_in(unless.iter().map(|s| s.as_str())));
    for (col, value) in extra {
        q = q.col_expr(col, value);
    }
    Ok(q.exec(conn).await?.rows_affected > 0)
}

async fn reload<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<reservation::Model, ServiceError> {
    reservation::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("reservation"))
}

#[instrument(skip(db, actor), fields(actor = %actor.id, reservation_id = %id))]
pub async fn confirm_reservation(db: &DatabaseConnection, actor: &CurrentUser, id: Uuid) -> Result<reservation::Model, ServiceError> {
    let current = get_reservation(db, &actor.scope, id).await?;
    let status = current.status()?;
    if !status.can_confirm() {
        return Err(ServiceError::validation(format!("a {} reservation cannot be confirmed", status)));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let moved = transition(
        db,
        id,
        ReservationStatus::Confirmed,
        &[ReservationStatus::Confirmed, ReservationStatus::Cancelled],
        vec![
            (reservation::Column::ConfirmationDate, Expr::value(Some(now))),
            (reservation::Column::ConfirmedById, Expr::value(Some(actor.id))),
        ],
    )
    .await?;
    if !moved {
        return Err(ServiceError::validation("reservation is no longer pending"));
    }
    info!(reservation_id = %id, "reservation_confirmed");
    reload(db, id).await
}

/// Cancel and give the seats back to the travel.
#[instrument(skip(db, actor), fields(actor = %actor.id, reservation_id = %id))]
pub async fn cancel_reservation(db: &DatabaseConnection, actor: &CurrentUser, id: Uuid) -> Result<reservation::Model, ServiceError> {
    let current = get_reservation(db, &actor.scope, id).await?;

    // the status flip decides which of several concurrent cancels restores the seats
    let txn = db.begin().await?;
    let moved = transition(&txn, id, ReservationStatus::Cancelled, &[ReservationStatus::Cancelled], Vec::new()).await?;
    if !moved {
        return Err(ServiceError::validation("reservation is already cancelled"));
    }
    travel::Entity::update_many()
        .col_expr(
            travel::Column::AvailableSeats,
            Expr::col(travel::Column::AvailableSeats).add(current.number_of_passengers),
        )
        .filter(travel::Column::Id.eq(current.travel_id))
        .exec(&txn)
        .await?;
    let updated = reload(&txn, id).await?;
    txn.commit().await?;

    info!(reservation_id = %id, "reservation_cancelled");
    Ok(updated)
}
