use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::Html,
};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::{AddCoinRequest, AddOutcome, Coin, RemoveOutcome, StatusResponse},
    state::AppState,
};

const INDEX_HTML: &str = include_str!("../static/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn healthcheck() -> Json<StatusResponse<&'static str>> {
    Json(StatusResponse { status: "ok" })
}

pub async fn list_coins(State(state): State<AppState>) -> AppResult<Json<Vec<Coin>>> {
    let coins = state.repo.list().await?;
    Ok(Json(coins))
}

pub async fn add_coin(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<StatusResponse<AddOutcome>>> {
    let Json(payload) = payload.map_err(|rejection| {
        debug!(error = %rejection, "rejected coin payload");
        AppError::validation("No data provided")
    })?;

    let coin = AddCoinRequest::from_json(payload)
        .and_then(AddCoinRequest::validate)
        .map_err(AppError::validation)?;

    let status = state.repo.add(coin).await?;
    Ok(Json(StatusResponse { status }))
}

pub async fn delete_coin(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<StatusResponse<RemoveOutcome>>> {
    let id = parse_coin_id(&raw_id).ok_or_else(AppError::coin_not_found)?;

    let status = state.repo.remove(id).await?;
    Ok(Json(StatusResponse { status }))
}

/// Ids are positive integers; anything else cannot name a coin.
fn parse_coin_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}
