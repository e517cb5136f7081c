use sea_orm::{entity::prelude::*, Set, ConnectionTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};
use crate::{agency, agency_point};

/// Staff account. `email` doubles as the login name and is stored lowercase.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "app_user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub role: String,
    pub is_active: bool,
    pub is_super_admin: bool,
    pub agency_id: Option<Uuid>,
    pub agency_point_id: Option<Uuid>,
    pub created_by_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub last_login_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
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

impl Related<agency::Entity> for Entity {
    fn to() -> RelationDef { Relation::Agency.def() }
}

impl Related<agency_point::Entity> for Entity {
    fn to() -> RelationDef { Relation::AgencyPoint.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Insert payload; the role string is validated by the service layer.
#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub role: String,
    pub is_super_admin: bool,
    pub agency_id: Option<Uuid>,
    pub agency_point_id: Option<Uuid>,
    pub created_by_id: Option<Uuid>,
}

pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

pub fn validate_email(email: &str) -> Result<(), ModelError> { errors::require_email(email) }

pub fn validate_name(first_name: &str, last_name: &str) -> Result<(), ModelError> {
    errors::require(first_name, "first name")?;
    errors::require(last_name, "last name")
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewUser) -> Result<Model, ModelError> {
    validate_email(&input.email)?;
    validate_name(&input.first_name, &input.last_name)?;
    errors::require(&input.role, "role")?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(normalize_email(&input.email)),
        first_name: Set(input.first_name.trim().to_string()),
        last_name: Set(input.last_name.trim().to_string()),
        phone_number: Set(input.phone_number.trim().to_string()),
        role: Set(input.role),
        is_active: Set(true),
        is_super_admin: Set(input.is_super_admin),
        agency_id: Set(input.agency_id),
        agency_point_id: Set(input.agency_point_id),
        created_by_id: Set(input.created_by_id),
        created_at: Set(now),
        updated_at: Set(now),
        last_login_at: Set(None),
    };
    am.insert(db).await.map_err(ModelError::db)
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(ModelError::db)
}

pub async fn set_active<C: ConnectionTrait>(db: &C, id: Uuid, active: bool) -> Result<Model, ModelError> {
    let mut am: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ModelError::db)?
        .ok_or_else(|| ModelError::Validation("user not found".into()))?
        .into();
    am.is_active = Set(active);
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(ModelError::db)
}

pub async fn touch_last_login<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ModelError> {
    let found = Entity::find_by_id(id).one(db).await.map_err(ModelError::db)?;
    if let Some(found) = found {
        let mut am: ActiveModel = found.into();
        am.last_login_at = Set(Some(Utc::now().into()));
        am.update(db).await.map_err(ModelError::db)?;
    }
    Ok(())
}
