//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::orders::service::parse_status;
use crate::orders::{CreateOrderRequest, OrderResponse, OrderSummary, UpdateStatusRequest};
use crate::storage::OrderFilter;
use crate::utils::AppResult;

/// Query params for listing orders
///
/// `tableId` wins when both are given.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub table_id: Option<i64>,
    pub status: Option<String>,
}

/// Create order
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<OrderResponse>)> {
    let order = state.orders.create_order(payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List orders (all, or filtered by query)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<OrderSummary>>> {
    let filter = match (query.table_id, query.status.as_deref()) {
        (Some(table_id), _) => OrderFilter::Table(table_id),
        (None, Some(status)) => OrderFilter::Status(parse_status(status)?),
        (None, None) => OrderFilter::All,
    };
    Ok(Json(state.orders.list_orders(filter).await?))
}

pub async fn list_by_table(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<Vec<OrderSummary>>> {
    Ok(Json(
        state.orders.list_orders(OrderFilter::Table(table_id)).await?,
    ))
}

pub async fn list_by_status(
    State(state): State<ServerState>,
    Path(status): Path<String>,
) -> AppResult<Json<Vec<OrderSummary>>> {
    let status = parse_status(&status)?;
    Ok(Json(
        state.orders.list_orders(OrderFilter::Status(status)).await?,
    ))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderResponse>> {
    Ok(Json(state.orders.get_order(id).await?))
}

/// Transition order status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<OrderResponse>> {
    let status = parse_status(&payload.status)?;
    Ok(Json(state.orders.update_status(id, status).await?))
}

/// Delete order (rejected while payments exist)
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.orders.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
