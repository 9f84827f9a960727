//! HTTP handlers for alert endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::alert::{AlertRow, LowStockSweepReport};
use crate::AppState;

/// Query parameters for listing alerts
#[derive(Debug, Deserialize)]
pub struct AlertListQuery {
    #[serde(default)]
    pub unresolved_only: bool,
}

/// Response for the administrative low-stock sweep
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: LowStockSweepReport,
}

/// Administrative sweep: create alerts for every low-stock item that has
/// none open yet
pub async fn generate_low_stock_alerts(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<SweepResponse>> {
    let service = state.alert_service();
    let report = service.generate_low_stock().await?;
    Ok(Json(SweepResponse {
        message: format!("Generated {} new low stock alerts", report.alerts_created),
        report,
    }))
}

/// List alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<AlertListQuery>,
) -> AppResult<Json<Vec<AlertRow>>> {
    let service = state.alert_service();
    let alerts = service.list(query.unresolved_only).await?;
    Ok(Json(alerts))
}

/// Resolve an alert; the low-stock trigger is re-armed for its material
pub async fn resolve_alert(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(alert_id): Path<Uuid>,
) -> AppResult<Json<AlertRow>> {
    let service = state.alert_service();
    let alert = service.resolve(alert_id, current_user.0.user_id).await?;
    Ok(Json(alert))
}

/// Mark an alert as read
pub async fn mark_alert_read(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(alert_id): Path<Uuid>,
) -> AppResult<Json<AlertRow>> {
    let service = state.alert_service();
    let alert = service.mark_read(alert_id).await?;
    Ok(Json(alert))
}
