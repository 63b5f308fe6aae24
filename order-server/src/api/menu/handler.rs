//! Menu API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{MenuItem, MenuItemPatch};

use crate::core::ServerState;
use crate::menu::AvailabilityRequest;
use crate::utils::AppResult;

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<MenuItem>>> {
    Ok(Json(state.menu.list_items().await?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItem>> {
    Ok(Json(state.menu.get_item(id).await?))
}

/// Partial update; absent fields keep their value
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(patch): Json<MenuItemPatch>,
) -> AppResult<Json<MenuItem>> {
    Ok(Json(state.menu.patch_item(id, patch).await?))
}

pub async fn set_availability(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AvailabilityRequest>,
) -> AppResult<Json<MenuItem>> {
    Ok(Json(
        state
            .menu
            .set_availability(id, payload.is_available)
            .await?,
    ))
}
