use std::fmt;
use std::str::FromStr;

use sea_orm::{entity::prelude::*, Set, ConnectionTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{agency, client, travel};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "reservation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub travel_id: Uuid,
    pub client_id: Uuid,
    pub agency_id: Uuid,
    pub agency_point_id: Option<Uuid>,
    pub number_of_passengers: i32,
    pub total_price_cents: i64,
    pub status: String,
    pub reservation_date: DateTimeWithTimeZone,
    pub confirmation_date: Option<DateTimeWithTimeZone>,
    pub confirmed_by_id: Option<Uuid>,
}

impl Model {
    pub fn status(&self) -> Result<ReservationStatus, ModelError> { self.status.parse() }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Travel,
    Client,
    Agency,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Travel => Entity::belongs_to(travel::Entity)
                .from(Column::TravelId)
                .to(travel::Column::Id)
                .into(),
            Relation::Client => Entity::belongs_to(client::Entity)
                .from(Column::ClientId)
                .to(client::Column::Id)
                .into(),
            Relation::Agency => Entity::belongs_to(agency::Entity)
                .from(Column::AgencyId)
                .to(agency::Column::Id)
                .into(),
        }
    }
}

impl Related<travel::Entity> for Entity {
    fn to() -> RelationDef { Relation::Travel.def() }
}

impl Related<client::Entity> for Entity {
    fn to() -> RelationDef { Relation::Client.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Reservation lifecycle. Stored as its name in the `status` column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "Pending",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::Cancelled => "Cancelled",
        }
    }

    pub fn can_confirm(&self) -> bool { matches!(self, ReservationStatus::Pending) }

    pub fn can_cancel(&self) -> bool { !matches!(self, ReservationStatus::Cancelled) }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ReservationStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ReservationStatus::Pending),
            "Confirmed" => Ok(ReservationStatus::Confirmed),
            "Cancelled" => Ok(ReservationStatus::Cancelled),
            other => Err(ModelError::Validation(format!("unknown reservation status: {}", other))),
        }
    }
}

pub fn total_price_cents(price_cents: i64, passengers: i32) -> Result<i64, ModelError> {
    price_cents
        .checked_mul(i64::from(passengers))
        .ok_or_else(|| ModelError::Validation("total price overflow".into()))
}

/// Insert a pending reservation. Generic over the connection so callers can
/// pass a transaction.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    travel: &travel::Model,
    client_id: Uuid,
    agency_point_id: Option<Uuid>,
    passengers: i32,
) -> Result<Model, ModelError> {
    if passengers < 1 {
        return Err(ModelError::Validation("number of passengers must be >= 1".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        travel_id: Set(travel.id),
        client_id: Set(client_id),
        agency_id: Set(travel.agency_id),
        agency_point_id: Set(agency_point_id),
        number_of_passengers: Set(passengers),
        total_price_cents: Set(total_price_cents(travel.price_cents, passengers)?),
        status: Set(ReservationStatus::Pending.to_string()),
        reservation_date: Set(Utc::now().into()),
        confirmation_date: Set(None),
        confirmed_by_id: Set(None),
    };
    am.insert(db).await.map_err(ModelError::db)
}
