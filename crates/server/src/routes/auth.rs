use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use service::auth::domain::{AuthUser, LoginInput, RegisterSuperAdminInput};
use service::scope::CurrentUser;

use crate::auth::{expired_session_cookie, ServerState};
use crate::extract::ApiJson;
use crate::errors::ApiResult;

#[derive(Serialize)]
pub struct LoginOutput {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Serialize)]
pub struct TokenOutput {
    pub token: String,
}

pub fn public_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/Auth/login", post(login))
        .route("/api/Auth/register-superadmin", post(register_superadmin))
        .route("/api/Auth/logout", post(logout))
}

pub fn session_routes() -> Router<ServerState> {
    Router::new().route("/api/Auth/me", get(me))
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    ApiJson(input): ApiJson<LoginInput>,
) -> ApiResult<(CookieJar, Json<LoginOutput>)> {
    let session = state.auth.login(input).await?;
    let jar = jar.add(state.session_cookie(session.token.clone()));
    Ok((jar, Json(LoginOutput { token: session.token, user: session.user })))
}

/// Bootstrap endpoint; refused with 403 once a super administrator exists.
pub async fn register_superadmin(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<RegisterSuperAdminInput>,
) -> ApiResult<Json<TokenOutput>> {
    let session = state.auth.register_superadmin(input).await?;
    Ok(Json(TokenOutput { token: session.token }))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(expired_session_cookie());
    (jar, StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<AuthUser>> {
    let profile = state.auth.profile(current.id).await?;
    Ok(Json(profile))
}
