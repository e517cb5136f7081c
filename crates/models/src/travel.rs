use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};
use crate::{agency, agency_point};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "travel")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub agency_id: Uuid,
    pub agency_point_id: Option<Uuid>,
    pub departure: String,
    pub destination: String,
    pub departure_date: DateTimeWithTimeZone,
    pub arrival_date: DateTimeWithTimeZone,
    pub price_cents: i64,
    pub available_seats: i32,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Agency,
    AgencyPoint,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Agency => Entity::belongs_to(agency::Entity)
                .from(Column::AgencyId)
                .to(agency::Column::Id)
                .into(),
            Relation::AgencyPoint => Entity::belongs_to(agency_point::Entity)
                .from(Column::AgencyPointId)
                .to(agency_point::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct NewTravel {
    pub agency_id: Uuid,
    pub agency_point_id: Option<Uuid>,
    pub departure: String,
    pub destination: String,
    pub departure_date: DateTimeWithTimeZone,
    pub arrival_date: DateTimeWithTimeZone,
    pub price_cents: i64,
    pub available_seats: i32,
}

/// Checks the itinerary and numeric invariants shared by create and update.
pub fn validate(
    departure: &str,
    destination: &str,
    departure_date: &DateTimeWithTimeZone,
    arrival_date: &DateTimeWithTimeZone,
    price_cents: i64,
    available_seats: i32,
) -> Result<(), ModelError> {
    errors::require(departure, "departure")?;
    errors::require(destination, "destination")?;
    if arrival_date < departure_date {
        return Err(ModelError::Validation("arrival date must not precede departure date".into()));
    }
    if price_cents < 0 { return Err(ModelError::Validation("price must be >= 0".into())); }
    if available_seats < 0 { return Err(ModelError::Validation("available seats must be >= 0".into())); }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, input: NewTravel) -> Result<Model, ModelError> {
    validate(
        &input.departure,
        &input.destination,
        &input.departure_date,
        &input.arrival_date,
        input.price_cents,
        input.available_seats,
    )?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        agency_id: Set(input.agency_id),
        agency_point_id: Set(input.agency_point_id),
        departure: Set(input.departure.trim().to_string()),
        destination: Set(input.destination.trim().to_string()),
        departure_date: Set(input.departure_date),
        arrival_date: Set(input.arrival_date),
        price_cents: Set(input.price_cents),
        available_seats: Set(input.available_seats),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(ModelError::db)
}
