//! HTTP handlers for warehouse transfer endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::{PaginatedResponse, Pagination, TransferStatus};
use crate::services::transfer::{CreateTransferInput, TransferRow, TransferWithItems};
use crate::AppState;

/// Query parameters for listing transfers
#[derive(Debug, Deserialize)]
pub struct TransferListQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Response for a completed transfer
#[derive(Debug, Serialize)]
pub struct CompleteTransferResponse {
    pub message: String,
    #[serde(flatten)]
    pub transfer: TransferWithItems,
}

/// Create a transfer in `pending` state
pub async fn create_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateTransferInput>,
) -> AppResult<(StatusCode, Json<TransferWithItems>)> {
    input
        .validate()
        .map_err(|e| AppError::validation("payload", e.to_string()))?;

    let service = state.transfer_service();
    let transfer = service.create(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

/// Complete a pending transfer, moving stock for all items atomically
pub async fn complete_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transfer_id): Path<Uuid>,
) -> AppResult<Json<CompleteTransferResponse>> {
    let service = state.transfer_service();
    let transfer = service.complete(transfer_id, current_user.0.user_id).await?;
    Ok(Json(CompleteTransferResponse {
        message: "Transfer completed successfully".to_string(),
        transfer,
    }))
}

/// Get a single transfer with its items
pub async fn get_transfer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(transfer_id): Path<Uuid>,
) -> AppResult<Json<TransferWithItems>> {
    let service = state.transfer_service();
    let transfer = service.get(transfer_id).await?;
    Ok(Json(transfer))
}

/// List transfers, optionally filtered by status
pub async fn list_transfers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<TransferListQuery>,
) -> AppResult<Json<PaginatedResponse<TransferRow>>> {
    let status = match &query.status {
        Some(raw) => Some(
            raw.parse::<TransferStatus>()
                .map_err(|msg| AppError::validation("status", msg))?,
        ),
        None => None,
    };

    let mut pagination = Pagination::default();
    if let Some(page) = query.page {
        pagination.page = page.max(1);
    }
    if let Some(per_page) = query.per_page {
        pagination.per_page = per_page.clamp(1, 200);
    }

    let service = state.transfer_service();
    let transfers = service.list(status, pagination).await?;
    Ok(Json(transfers))
}
