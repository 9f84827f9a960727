//! Route definitions for the SiteOps inventory backend

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes. The state is needed up front so the auth layer can
/// verify tokens against the configured secret.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - inventory ledger
        .nest("/inventory", inventory_routes(state.clone()))
        // Protected routes - warehouse transfers
        .nest("/transfers", transfer_routes(state.clone()))
        // Protected routes - alerts
        .nest("/alerts", alert_routes(state.clone()))
        // Protected routes - notifications
        .nest("/notifications", notification_routes(state))
}

/// Inventory ledger routes (protected)
fn inventory_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/transaction", post(handlers::record_transaction))
        .route(
            "/warehouse/:warehouse_id",
            get(handlers::get_warehouse_inventory),
        )
        .route("/low-stock", get(handlers::get_low_stock))
        .route(
            "/warehouse/:warehouse_id/material/:material_id/history",
            get(handlers::get_stock_history),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Warehouse transfer routes (protected)
fn transfer_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_transfers).post(handlers::create_transfer),
        )
        .route("/:transfer_id", get(handlers::get_transfer))
        .route("/:transfer_id/complete", put(handlers::complete_transfer))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Alert routes (protected)
fn alert_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts))
        .route(
            "/generate-low-stock",
            post(handlers::generate_low_stock_alerts),
        )
        .route("/:alert_id/resolve", put(handlers::resolve_alert))
        .route("/:alert_id/read", put(handlers::mark_alert_read))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Notification routes (protected)
fn notification_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_notifications))
        .route(
            "/preferences",
            get(handlers::get_preferences).put(handlers::update_preferences),
        )
        .route(
            "/:notification_id/read",
            post(handlers::mark_notification_read),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
