//! `/api/AgencyOperator`: day-to-day booking at one agency point.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use models::{client, reservation, travel};
use service::client_service::{self, CreateClient};
use service::reservation_service::{self, CreateReservation};
use service::scope::CurrentUser;
use service::stats_service::{self, OperatorDashboard};
use service::travel_service;

use crate::auth::ServerState;
use crate::extract::{ApiJson, ApiPath};
use crate::errors::ApiResult;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/travels", get(list_travels))
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/:id", get(get_client))
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route("/reservations/:id/confirm", put(confirm_reservation))
        .route("/reservations/:id/cancel", put(cancel_reservation))
        .route("/dashboard", get(dashboard))
}

async fn list_travels(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<Vec<travel::Model>>> {
    Ok(Json(travel_service::list_bookable_travels(&state.db, &me.scope).await?))
}

async fn list_clients(State(state): State<ServerState>) -> ApiResult<Json<Vec<client::Model>>> {
    Ok(Json(client_service::list_clients(&state.db).await?))
}

async fn get_client(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<client::Model>> {
    Ok(Json(client_service::get_client(&state.db, id).await?))
}

async fn create_client(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<CreateClient>,
) -> ApiResult<(StatusCode, Json<client::Model>)> {
    let created = client_service::create_client(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_reservations(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<Vec<reservation::Model>>> {
    Ok(Json(reservation_service::list_reservations(&state.db, &me.scope).await?))
}

async fn create_reservation(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiJson(input): ApiJson<CreateReservation>,
) -> ApiResult<(StatusCode, Json<reservation::Model>)> {
    let created = reservation_service::create_reservation(&state.db, &me, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn confirm_reservation(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<reservation::Model>> {
    Ok(Json(reservation_service::confirm_reservation(&state.db, &me, id).await?))
}

async fn cancel_reservation(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<reservation::Model>> {
    Ok(Json(reservation_service::cancel_reservation(&state.db, &me, id).await?))
}

async fn dashboard(State(state): State<ServerState>, Extension(me): Extension<CurrentUser>) -> ApiResult<Json<OperatorDashboard>> {
    Ok(Json(stats_service::operator_dashboard(&state.db, &me).await?))
}
