//! `/api/AgencyGlobalAdmin`: everything inside the caller's agency.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use common::types::MessageBody;
use models::{agency, agency_point, reservation, travel};
use service::agency_point_service::{self, AgencyPointWithCounts, CreateAgencyPoint, UpdateAgencyPoint};
use service::agency_service;
use service::reservation_service;
use service::scope::CurrentUser;
use service::stats_service::{self, AgencyDashboard};
use service::travel_service::{self, CreateTravel, UpdateTravel};
use service::user_service::{self, CreateUser, UpdateUser, UserView};

use crate::auth::ServerState;
use crate::extract::{ApiJson, ApiPath};
use crate::errors::ApiResult;
use crate::routes::ToggleStatus;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/agency", get(own_agency))
        .route("/agency-points", get(list_points).post(create_point))
        .route("/agency-points/:id", get(get_point).put(update_point))
        .route("/agency-points/:id/toggle-status", put(toggle_point))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user).delete(suspend_user))
        .route("/travels", get(list_travels).post(create_travel))
        .route("/travels/:id", get(get_travel).put(update_travel))
        .route("/travels/:id/toggle-status", put(toggle_travel))
        .route("/reservations", get(list_reservations))
        .route("/dashboard", get(dashboard))
}

async fn own_agency(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<agency::Model>> {
    let agency_id = me.scope.require_agency()?;
    Ok(Json(agency_service::get_agency(&state.db, &me.scope, agency_id).await?))
}

async fn list_points(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<Vec<AgencyPointWithCounts>>> {
    Ok(Json(agency_point_service::list_points_with_counts(&state.db, &me.scope).await?))
}

async fn get_point(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<AgencyPointWithCounts>> {
    Ok(Json(agency_point_service::get_point_with_counts(&state.db, &me.scope, id).await?))
}

async fn create_point(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiJson(input): ApiJson<CreateAgencyPoint>,
) -> ApiResult<(StatusCode, Json<agency_point::Model>)> {
    let created = agency_point_service::create_point(&state.db, &me.scope, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_point(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateAgencyPoint>,
) -> ApiResult<Json<agency_point::Model>> {
    Ok(Json(agency_point_service::update_point(&state.db, &me.scope, id, input).await?))
}

async fn toggle_point(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ToggleStatus>,
) -> ApiResult<Json<agency_point::Model>> {
    Ok(Json(agency_point_service::set_point_active(&state.db, &me.scope, id, body.is_active).await?))
}

async fn list_users(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<Vec<UserView>>> {
    let users = user_service::list_users(&state.db, &me).await?;
    Ok(Json(user_service::to_views(&state.db, users).await?))
}

async fn get_user(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<UserView>> {
    let found = user_service::get_user(&state.db, &me, id).await?;
    Ok(Json(user_service::to_view(&state.db, found).await?))
}

async fn create_user(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiJson(input): ApiJson<CreateUser>,
) -> ApiResult<(StatusCode, Json<UserView>)> {
    let created = user_service::create_user(&state.db, &me, input).await?;
    Ok((StatusCode::CREATED, Json(user_service::to_view(&state.db, created).await?)))
}

async fn update_user(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateUser>,
) -> ApiResult<Json<UserView>> {
    let updated = user_service::update_user(&state.db, &me, id, input).await?;
    Ok(Json(user_service::to_view(&state.db, updated).await?))
}

/// DELETE keeps the row and suspends the account.
async fn suspend_user(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MessageBody>> {
    user_service::set_user_active(&state.db, &me, id, false).await?;
    Ok(Json(MessageBody::new("user suspended")))
}

async fn list_travels(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<Vec<travel::Model>>> {
    Ok(Json(travel_service::list_travels(&state.db, &me.scope).await?))
}

async fn get_travel(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<travel::Model>> {
    Ok(Json(travel_service::get_travel(&state.db, &me.scope, id).await?))
}

async fn create_travel(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiJson(input): ApiJson<CreateTravel>,
) -> ApiResult<(StatusCode, Json<travel::Model>)> {
    let created = travel_service::create_travel(&state.db, &me.scope, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_travel(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateTravel>,
) -> ApiResult<Json<travel::Model>> {
    Ok(Json(travel_service::update_travel(&state.db, &me.scope, id, input).await?))
}

async fn toggle_travel(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ToggleStatus>,
) -> ApiResult<Json<travel::Model>> {
    Ok(Json(travel_service::set_travel_active(&state.db, &me.scope, id, body.is_active).await?))
}

async fn list_reservations(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<Vec<reservation::Model>>> {
    Ok(Json(reservation_service::list_reservations(&state.db, &me.scope).await?))
}

async fn dashboard(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<AgencyDashboard>> {
    Ok(Json(stats_service::agency_dashboard(&state.db, &me.scope).await?))
}
