//! `/api/AgencyPointAdmin`: operators, travels and reservations of one point.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use common::types::MessageBody;
use models::{reservation, travel};
use service::reservation_service;
use service::errors::ServiceError;
use service::scope::{CurrentUser, Role};
use service::stats_service::{self, PointDashboard};
use service::travel_service::{self, CreateTravel};
use service::user_service::{self, CreateUser, UpdateUser, UserView};

use crate::auth::ServerState;
use crate::extract::{ApiJson, ApiPath};
use crate::errors::ApiResult;

/// New operator; placement comes from the caller. A role may be sent but
/// must be AgencyOperator.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOperator {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub role: Option<String>,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/operators", get(list_operators).post(create_operator))
        .route("/operators/:id", get(get_operator).put(update_operator).delete(suspend_operator))
        .route("/travels", get(list_travels).post(create_travel))
        .route("/reservations", get(list_reservations))
        .route("/dashboard", get(dashboard))
}

async fn list_operators(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<Vec<UserView>>> {
    let users = user_service::list_users(&state.db, &me).await?;
    Ok(Json(user_service::to_views(&state.db, users).await?))
}

async fn get_operator(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<UserView>> {
    let found = user_service::get_user(&state.db, &me, id).await?;
    Ok(Json(user_service::to_view(&state.db, found).await?))
}

async fn create_operator(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiJson(input): ApiJson<CreateOperator>,
) -> ApiResult<(StatusCode, Json<UserView>)> {
    let (agency_id, agency_point_id) = me.scope.require_point()?;
    if let Some(role) = input.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        if Role::parse(role).ok() != Some(Role::AgencyOperator) {
            return Err(ServiceError::validation("agency point admins can only create AgencyOperator users").into());
        }
    }
    let input = CreateUser {
        email: input.email,
        password: input.password,
        first_name: input.first_name,
        last_name: input.last_name,
        phone_number: input.phone_number,
        role: Role::AgencyOperator.to_string(),
        agency_id: Some(agency_id),
        agency_point_id: Some(agency_point_id),
    };
    let created = user_service::create_user(&state.db, &me, input).await?;
    Ok((StatusCode::CREATED, Json(user_service::to_view(&state.db, created).await?)))
}

async fn update_operator(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateUser>,
) -> ApiResult<Json<UserView>> {
    let updated = user_service::update_user(&state.db, &me, id, input).await?;
    Ok(Json(user_service::to_view(&state.db, updated).await?))
}

async fn suspend_operator(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MessageBody>> {
    user_service::set_user_active(&state.db, &me, id, false).await?;
    Ok(Json(MessageBody::new("operator suspended")))
}

async fn list_travels(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<Vec<travel::Model>>> {
    Ok(Json(travel_service::list_travels(&state.db, &me.scope).await?))
}

async fn create_travel(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiJson(input): ApiJson<CreateTravel>,
) -> ApiResult<(StatusCode, Json<travel::Model>)> {
    let created = travel_service::create_travel(&state.db, &me.scope, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_reservations(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<Vec<reservation::Model>>> {
    Ok(Json(reservation_service::list_reservations(&state.db, &me.scope).await?))
}

async fn dashboard(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<PointDashboard>> {
    Ok(Json(stats_service::point_dashboard(&state.db, &me).await?))
}
