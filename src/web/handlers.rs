use crate::utils::validation::{parse_uuid, Validate};
use crate::web::dto::{
    BetResponse, EventsQuery, ListEventsResponse, PlaceBetRequest, RecordOutcomeRequest,
    UserBalanceResponse,
};
use crate::web::error::ApiError;
use crate::web::idempotency::IDEMPOTENCY_KEY_HEADER;
use crate::web::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};

type ApiResult<T> = std::result::Result<T, ApiError>;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_events(
    State(state): State<AppState>,
    query: std::result::Result<Query<EventsQuery>, QueryRejection>,
) -> ApiResult<Json<ListEventsResponse>> {
    let Query(query) = query?;
    let filter = query.filter()?;

    let page = state
        .list_events
        .list(&filter, query.page, query.size)
        .await?;
    Ok(Json(ListEventsResponse::from(page)))
}

pub async fn record_outcome(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    payload: std::result::Result<Json<RecordOutcomeRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = payload?;
    request.validate()?;
    let event_id = parse_uuid("eventId", &event_id)?;
    let winning_driver_id = request.winning_driver_id.unwrap_or_default();

    state
        .record_outcome
        .record(event_id, winning_driver_id.trim())?;
    Ok(StatusCode::OK)
}

pub async fn place_bet(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<PlaceBetRequest>, JsonRejection>,
) -> ApiResult<Json<BetResponse>> {
    let Json(request) = payload?;
    let idempotency_key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let command = request.into_command(idempotency_key)?;
    let bet = state.place_bet.place(&command)?;
    Ok(Json(BetResponse::from(&bet)))
}

pub async fn user_balance(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserBalanceResponse>> {
    let user_id = parse_uuid("userId", &user_id)?;
    let user = state.user_balance.balance(user_id);
    Ok(Json(UserBalanceResponse::from(&user)))
}
