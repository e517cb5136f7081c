//! `/api/SuperAdmin`: platform-wide management of agencies, points and users.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use models::{agency, agency_point};
use service::agency_point_service::{self, AgencyPointWithCounts, CreateAgencyPoint, UpdateAgencyPoint};
use service::agency_service::{self, AgencyDetails, AgencyWithCounts, CreateAgency, UpdateAgency};
use service::pagination::{Page, Pagination};
use service::scope::CurrentUser;
use service::stats_service::{self, PlatformStats};
use service::user_service::{self, CreateUser, UpdateUser, UserView};

use crate::auth::ServerState;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::errors::ApiResult;
use crate::routes::ToggleStatus;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/agencies", get(list_agencies).post(create_agency))
        .route("/agencies/:id", get(get_agency).put(update_agency))
        .route("/agencies/:id/details", get(agency_details))
        .route("/agencies/:id/toggle-status", put(toggle_agency))
        .route("/agency-points", get(list_points).post(create_point))
        .route("/agency-points/:id", get(get_point).put(update_point))
        .route("/agency-points/:id/toggle-status", put(toggle_point))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user))
        .route("/users/:id/toggle-status", put(toggle_user))
}

async fn stats(State(state): State<ServerState>) -> ApiResult<Json<PlatformStats>> {
    Ok(Json(stats_service::platform_stats(&state.db).await?))
}

async fn list_agencies(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<Vec<AgencyWithCounts>>> {
    Ok(Json(agency_service::list_agencies_with_counts(&state.db, &me.scope).await?))
}

async fn get_agency(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<AgencyWithCounts>> {
    Ok(Json(agency_service::get_agency_with_counts(&state.db, &me.scope, id).await?))
}

async fn agency_details(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<AgencyDetails>> {
    Ok(Json(agency_service::agency_details(&state.db, &me.scope, id).await?))
}

async fn create_agency(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiJson(input): ApiJson<CreateAgency>,
) -> ApiResult<(StatusCode, Json<agency::Model>)> {
    let created = agency_service::create_agency(&state.db, &me.scope, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_agency(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateAgency>,
) -> ApiResult<Json<agency::Model>> {
    Ok(Json(agency_service::update_agency(&state.db, &me.scope, id, input).await?))
}

async fn toggle_agency(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ToggleStatus>,
) -> ApiResult<Json<agency::Model>> {
    Ok(Json(agency_service::set_agency_active(&state.db, &me.scope, id, body.is_active).await?))
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

async fn list_users(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiQuery(q): ApiQuery<UsersQuery>,
) -> ApiResult<Json<Page<UserView>>> {
    let defaults = Pagination::default();
    let opts = Pagination {
        page: q.page.unwrap_or(defaults.page),
        per_page: q.page_size.unwrap_or(defaults.per_page),
    };
    let Page { data, total, page, page_size, total_pages } =
        user_service::list_users_paginated(&state.db, &me, opts).await?;
    let data = user_service::to_views(&state.db, data).await?;
    Ok(Json(Page { data, total, page, page_size, total_pages }))
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

async fn toggle_user(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ToggleStatus>,
) -> ApiResult<Json<UserView>> {
    let updated = user_service::set_user_active(&state.db, &me, id, body.is_active).await?;
    Ok(Json(user_service::to_view(&state.db, updated).await?))
}
