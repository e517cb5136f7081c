pub mod auth;
pub mod sessions;
pub mod super_admin;
pub mod global_admin;
pub mod point_admin;
pub mod operator;

use axum::{middleware, routing::get, Json, Router};
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::Health;
use service::scope::Role;

use crate::auth::{require_role, require_session, ServerState};

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Body of every `toggle-status` endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleStatus {
    pub is_active: bool,
}

fn role_gated(router: Router<ServerState>, role: Role) -> Router<ServerState> {
    router.route_layer(middleware::from_fn_with_state(role, require_role))
}

/// Build the full application router: public auth endpoints, then the
/// session-protected area split into one role-gated group per tier.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .merge(auth::public_routes())
        .merge(sessions::login_routes());

    let protected = Router::new()
        .merge(auth::session_routes())
        .nest("/api/SuperAdmin", role_gated(super_admin::router(), Role::SuperAdmin))
        .nest("/api/AgencyGlobalAdmin", role_gated(global_admin::router(), Role::AgencyGlobalAdmin))
        .nest("/api/AgencyPointAdmin", role_gated(point_admin::router(), Role::AgencyPointAdmin))
        .nest("/api/AgencyOperator", role_gated(operator::router(), Role::AgencyOperator))
        .merge(role_gated(sessions::super_admin_dashboard(), Role::SuperAdmin))
        .merge(role_gated(sessions::global_admin_dashboard(), Role::AgencyGlobalAdmin))
        .merge(role_gated(sessions::point_admin_dashboard(), Role::AgencyPointAdmin))
        .merge(role_gated(sessions::operator_dashboard(), Role::AgencyOperator))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    public
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx responses
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
