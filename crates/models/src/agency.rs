use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};
use crate::agency_point;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "agency")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    AgencyPoint,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::AgencyPoint => Entity::has_many(agency_point::Entity).into() }
    }
}

impl Related<agency_point::Entity> for Entity {
    fn to() -> RelationDef { Relation::AgencyPoint.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    errors::require(name, "name")?;
    if name.trim().len() > 128 { return Err(ModelError::Validation("name too long (<=128)".into())); }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    address: &str,
    phone: &str,
    email: &str,
) -> Result<Model, ModelError> {
    validate_name(name)?;
    errors::require(address, "address")?;
    errors::require(phone, "phone")?;
    errors::require_email(email)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
        address: Set(address.trim().to_string()),
        phone: Set(phone.trim().to_string()),
        email: Set(email.trim().to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(ModelError::db)
}

pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(ModelError::db)
}
