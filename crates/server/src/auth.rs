use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;

use service::auth::repo::SeaOrmAuthRepository;
use service::auth::{AuthConfig, AuthService};
use service::errors::ServiceError;
use service::scope::{resolve_scope, CurrentUser, Role};

use crate::errors::JsonApiError;

/// Name of the cookie carrying the session token.
pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub secure_cookies: bool,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, jwt: configs::JwtConfig, secure_cookies: bool) -> Self {
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        let auth = Arc::new(AuthService::new(repo, AuthConfig::new(jwt)));
        Self { db, auth, secure_cookies }
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        session_cookie(token, self.secure_cookies)
    }
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    cookie
}

/// Token from `Authorization: Bearer`, falling back to the session cookie.
fn extract_token(req: &Request) -> Result<Option<String>, JsonApiError> {
    if let Some(h) = req.headers().get(header::AUTHORIZATION) {
        let h = h.to_str().map_err(|_| JsonApiError::unauthorized("malformed Authorization header"))?;
        return match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(Some(t.trim().to_string())),
            _ => {
                tracing::warn!(path = %req.uri().path(), "invalid Authorization format (expect Bearer)");
                Err(JsonApiError::unauthorized("expected a Bearer token"))
            }
        };
    }
    let jar = CookieJar::from_headers(req.headers());
    Ok(jar
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty()))
}

/// Authenticates the request and stores the caller's [`CurrentUser`] in the
/// request extensions. The user is reloaded from the store so suspensions and
/// reassignments take effect before the token expires.
pub async fn require_session(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    let path = req.uri().path().to_string();

    let Some(token) = extract_token(&req)? else {
        tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
        return Err(JsonApiError::unauthorized("authentication required"));
    };

    let claims = state.auth.verify_token(&token).map_err(|e| {
        tracing::warn!(path = %path, err = %e, "token validation failed");
        JsonApiError::from(e)
    })?;
    let user_id = claims.user_id()?;

    let current = match resolve_scope(&state.db, user_id).await {
        Ok(u) => u,
        Err(ServiceError::Forbidden(msg)) => {
            tracing::warn!(path = %path, user_id = %user_id, reason = %msg, "session rejected");
            return Err(JsonApiError::unauthorized(msg));
        }
        Err(e) => return Err(e.into()),
    };

    req.extensions_mut().insert(current);
    Ok(next.run(req).await)
}

/// Role gate layered inside [`require_session`]; the role is the layer state.
pub async fn require_role(
    State(role): State<Role>,
    req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let actual = req.extensions().get::<CurrentUser>().map(|u| u.role);
    match actual {
        Some(r) if r == role => Ok(next.run(req).await),
        Some(r) => {
            tracing::debug!(path = %req.uri().path(), required = %role, actual = %r, "role mismatch");
            Err(JsonApiError::forbidden(format!("this area requires the {} role", role)))
        }
        None => Err(JsonApiError::unauthorized("authentication required")),
    }
}
