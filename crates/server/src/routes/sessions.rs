//! Cookie-based dashboard logins and the per-role dashboard payloads.

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;

use service::auth::domain::LoginInput;
use service::scope::{CurrentUser, Role};
use service::stats_service::{self, AgencyDashboard, OperatorDashboard, PlatformStats, PointDashboard};

use crate::auth::ServerState;
use crate::extract::ApiJson;
use crate::errors::ApiResult;

/// Form body; missing fields deserialize empty and are rejected with 400.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SessionLogin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Redirect {
    pub redirect: String,
}

pub fn login_routes() -> Router<ServerState> {
    Router::new()
        .route("/Home/SuperAdminLogin", post(super_admin_login))
        .route("/Home/GlobalAdminLogin", post(global_admin_login))
        .route("/Home/PointAdminLogin", post(point_admin_login))
        .route("/Home/OperatorLogin", post(operator_login))
}

async fn session_login(state: ServerState, jar: CookieJar, input: SessionLogin, role: Role) -> ApiResult<(CookieJar, Json<Redirect>)> {
    let session = state
        .auth
        .login_with_role(LoginInput { email: input.email, password: input.password }, role)
        .await?;
    info!(user_id = %session.user.id, role = %role, "dashboard_session_started");
    let jar = jar.add(state.session_cookie(session.token));
    Ok((jar, Json(Redirect { redirect: role.dashboard_path().to_string() })))
}

pub async fn super_admin_login(State(state): State<ServerState>, jar: CookieJar, ApiJson(input): ApiJson<SessionLogin>) -> ApiResult<(CookieJar, Json<Redirect>)> {
    session_login(state, jar, input, Role::SuperAdmin).await
}

pub async fn global_admin_login(State(state): State<ServerState>, jar: CookieJar, ApiJson(input): ApiJson<SessionLogin>) -> ApiResult<(CookieJar, Json<Redirect>)> {
    session_login(state, jar, input, Role::AgencyGlobalAdmin).await
}

pub async fn point_admin_login(State(state): State<ServerState>, jar: CookieJar, ApiJson(input): ApiJson<SessionLogin>) -> ApiResult<(CookieJar, Json<Redirect>)> {
    session_login(state, jar, input, Role::AgencyPointAdmin).await
}

pub async fn operator_login(State(state): State<ServerState>, jar: CookieJar, ApiJson(input): ApiJson<SessionLogin>) -> ApiResult<(CookieJar, Json<Redirect>)> {
    session_login(state, jar, input, Role::AgencyOperator).await
}

pub fn super_admin_dashboard() -> Router<ServerState> {
    Router::new().route("/SuperAdmin/Dashboard", get(platform))
}

pub fn global_admin_dashboard() -> Router<ServerState> {
    Router::new().route("/GlobalAdmin/Dashboard", get(agency))
}

pub fn point_admin_dashboard() -> Router<ServerState> {
    Router::new().route("/PointAdmin/Dashboard", get(point))
}

pub fn operator_dashboard() -> Router<ServerState> {
    Router::new().route("/Operator/Dashboard", get(operator))
}

async fn platform(State(state): State<ServerState>) -> ApiResult<Json<PlatformStats>> {
    Ok(Json(stats_service::platform_stats(&state.db).await?))
}

async fn agency(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<AgencyDashboard>> {
    Ok(Json(stats_service::agency_dashboard(&state.db, &me.scope).await?))
}

async fn point(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<PointDashboard>> {
    Ok(Json(stats_service::point_dashboard(&state.db, &me).await?))
}

async fn operator(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<OperatorDashboard>> {
    Ok(Json(stats_service::operator_dashboard(&state.db, &me).await?))
}
