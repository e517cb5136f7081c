use uuid::Uuid;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::Deserialize;
use tracing::info;

use models::client;
use crate::errors::ServiceError;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

pub async fn list_clients(db: &DatabaseConnection) -> Result<Vec<client::Model>, ServiceError> {
    let clients = client::Entity::find()
        .order_by_asc(client::Column::LastName)
        .order_by_asc(client::Column::FirstName)
        .all(db)
        .await?;
    Ok(clients)
}

pub async fn get_client(db: &DatabaseConnection, id: Uuid) -> Result<client::Model, ServiceError> {
    client::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("client"))
}

pub async fn create_client(db: &DatabaseConnection, input: CreateClient) -> Result<client::Model, ServiceError> {
    let created = client::create(db, &input.first_name, &input.last_name, &input.email, &input.phone).await?;
    info!(client_id = %created.id, "client_created");
    Ok(created)
}
