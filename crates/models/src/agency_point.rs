use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};
use crate::agency;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "agency_point")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub agency_id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Agency,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Agency => Entity::belongs_to(agency::Entity)
                .from(Column::AgencyId)
                .to(agency::Column::Id)
                .into(),
        }
    }
}

impl Related<agency::Entity> for Entity {
    fn to() -> RelationDef { Relation::Agency.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    errors::require(name, "name")?;
    if name.trim().len() > 128 { return Err(ModelError::Validation("name too long (<=128)".into())); }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    agency_id: Uuid,
    name: &str,
    address: &str,
    phone: &str,
    email: Option<&str>,
) -> Result<Model, ModelError> {
    validate_name(name)?;
    errors::require(address, "address")?;
    errors::require(phone, "phone")?;
    let email = email.map(str::trim).filter(|e| !e.is_empty());
    if let Some(e) = email { errors::require_email(e)?; }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        agency_id: Set(agency_id),
        name: Set(name.trim().to_string()),
        address: Set(address.trim().to_string()),
        phone: Set(phone.trim().to_string()),
        email: Set(email.map(str::to_string)),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(ModelError::db)
}

/// Lookup by the composite (agency, name) key.
pub async fn find_by_agency_and_name(
    db: &DatabaseConnection,
    agency_id: Uuid,
    name: &str,
) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::AgencyId.eq(agency_id))
        .filter(Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(ModelError::db)
}
