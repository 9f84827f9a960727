//! HTTP handlers for inventory endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::inventory::{RecordTransactionInput, StockTransactionRow, WarehouseStockRow};
use crate::AppState;

/// Response for a recorded stock transaction
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub message: String,
    pub new_quantity: i64,
    pub transaction_id: Uuid,
}

/// Record a stock transaction
pub async fn record_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordTransactionInput>,
) -> AppResult<(StatusCode, Json<TransactionResponse>)> {
    input
        .validate()
        .map_err(|e| AppError::validation("payload", e.to_string()))?;

    let service = state.inventory_service();
    let outcome = service
        .apply_transaction(current_user.0.user_id, input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            message: "Transaction completed".to_string(),
            new_quantity: outcome.new_quantity,
            transaction_id: outcome.transaction.id,
        }),
    ))
}

/// Inventory for one warehouse (cached)
pub async fn get_warehouse_inventory(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Vec<WarehouseStockRow>>> {
    let service = state.inventory_service();
    let rows = service.warehouse_inventory(warehouse_id).await?;
    Ok(Json(rows))
}

/// Stock rows at or below their minimum level (cached, short TTL)
pub async fn get_low_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<WarehouseStockRow>>> {
    let service = state.inventory_service();
    let rows = service.low_stock().await?;
    Ok(Json(rows))
}

/// Ledger history for one (warehouse, material) pair, newest first
pub async fn get_stock_history(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path((warehouse_id, material_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Vec<StockTransactionRow>>> {
    let service = state.inventory_service();
    let rows = service.pair_history(warehouse_id, material_id).await?;
    Ok(Json(rows))
}
