//! Low-stock alert service
//!
//! Alerts are derived from the stock projection after each successful
//! mutation and by an administrative sweep. At most one unresolved
//! `low_stock` alert exists per material; resolving it re-arms the trigger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{AlertSeverity, AlertType, EntityType, MaterialUnit};
use crate::services::notification::{LowStockNotice, NotificationService};

/// Alert service for low-stock detection and alert management
#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
    notifications: NotificationService,
}

/// An alert as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AlertRow {
    pub id: Uuid,
    #[sqlx(try_from = "String")]
    pub alert_type: AlertType,
    #[sqlx(try_from = "String")]
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub is_read: bool,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Uuid>,
}

/// Result of the administrative low-stock sweep
#[derive(Debug, Serialize)]
pub struct LowStockSweepReport {
    pub alerts_created: u64,
    pub total_low_stock_items: u64,
}

/// Material and warehouse context for one low-stock condition
#[derive(Debug, FromRow)]
struct LowStockContext {
    material_id: Uuid,
    material_name: String,
    material_sku: String,
    #[sqlx(try_from = "String")]
    unit: MaterialUnit,
    min_stock_level: i64,
    warehouse_name: String,
}

impl AlertService {
    /// Create a new AlertService instance
    pub fn new(db: PgPool, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Evaluate one (warehouse, material) pair after a stock mutation.
    ///
    /// Fires when the new quantity is at or below the material's minimum
    /// level and no unresolved low-stock alert exists for that material.
    /// Returns the created alert, if any.
    pub async fn evaluate_low_stock(
        &self,
        warehouse_id: Uuid,
        material_id: Uuid,
        new_quantity: i64,
    ) -> AppResult<Option<AlertRow>> {
        let context = sqlx::query_as::<_, LowStockContext>(
            r#"
            SELECT m.id AS material_id, m.name AS material_name, m.sku AS material_sku,
                   m.unit, m.min_stock_level, w.name AS warehouse_name
            FROM materials m, warehouses w
            WHERE m.id = $1 AND w.id = $2
            "#,
        )
        .bind(material_id)
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Material or warehouse".to_string()))?;

        if new_quantity > context.min_stock_level {
            return Ok(None);
        }

        self.create_if_absent(&context, new_quantity).await
    }

    /// Administrative sweep over every stock row at or below its minimum.
    ///
    /// Reconciliation path for alerts that should have fired but did not;
    /// applies the same dedup rule as the per-mutation trigger.
    pub async fn generate_low_stock(&self) -> AppResult<LowStockSweepReport> {
        let rows = sqlx::query_as::<_, LowStockSweepRow>(
            r#"
            SELECT s.quantity,
                   m.id AS material_id, m.name AS material_name, m.sku AS material_sku,
                   m.unit, m.min_stock_level, w.name AS warehouse_name
            FROM stock_levels s
            JOIN materials m ON s.material_id = m.id
            JOIN warehouses w ON s.warehouse_id = w.id
            WHERE s.quantity <= m.min_stock_level
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let total = rows.len() as u64;
        let mut created = 0u64;
        for row in rows {
            let context = LowStockContext {
                material_id: row.material_id,
                material_name: row.material_name,
                material_sku: row.material_sku,
                unit: row.unit,
                min_stock_level: row.min_stock_level,
                warehouse_name: row.warehouse_name,
            };
            if self.create_if_absent(&context, row.quantity).await?.is_some() {
                created += 1;
            }
        }

        tracing::info!(
            alerts_created = created,
            total_low_stock_items = total,
            "low-stock sweep finished"
        );

        Ok(LowStockSweepReport {
            alerts_created: created,
            total_low_stock_items: total,
        })
    }

    /// Create a low-stock alert unless one is already open for the material,
    /// then notify elevated roles. Notification failures never propagate.
    async fn create_if_absent(
        &self,
        context: &LowStockContext,
        quantity: i64,
    ) -> AppResult<Option<AlertRow>> {
        let open_exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM alerts
                WHERE alert_type = $1 AND entity_type = $2
                  AND entity_id = $3 AND is_resolved = FALSE
            )
            "#,
        )
        .bind(AlertType::LowStock.as_str())
        .bind(EntityType::Material.as_str())
        .bind(context.material_id)
        .fetch_one(&self.db)
        .await?;

        if open_exists {
            return Ok(None);
        }

        let severity = AlertSeverity::for_quantity(quantity);
        let title = if quantity == 0 {
            format!("Out of Stock: {}", context.material_name)
        } else {
            format!("Low Stock: {}", context.material_name)
        };
        let message = format!(
            "{} (SKU: {}) has {} {} remaining in {}. Minimum level: {}",
            context.material_name,
            context.material_sku,
            quantity,
            context.unit.as_str(),
            context.warehouse_name,
            context.min_stock_level
        );

        let alert = sqlx::query_as::<_, AlertRow>(
            r#"
            INSERT INTO alerts (alert_type, severity, title, message, entity_type, entity_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, alert_type, severity, title, message, entity_type, entity_id,
                      is_read, is_resolved, created_at, resolved_at, resolved_by
            "#,
        )
        .bind(AlertType::LowStock.as_str())
        .bind(severity.as_str())
        .bind(&title)
        .bind(&message)
        .bind(EntityType::Material.as_str())
        .bind(context.material_id)
        .fetch_one(&self.db)
        .await?;

        let notice = LowStockNotice {
            material_id: context.material_id,
            title: title.clone(),
            message: message.clone(),
        };
        if let Err(e) = self.notifications.notify_low_stock(&notice).await {
            tracing::warn!("Low-stock notification dispatch failed: {}", e);
        }

        Ok(Some(alert))
    }

    /// List alerts, optionally only unresolved ones, newest first
    pub async fn list(&self, unresolved_only: bool) -> AppResult<Vec<AlertRow>> {
        let alerts = sqlx::query_as::<_, AlertRow>(
            r#"
            SELECT id, alert_type, severity, title, message, entity_type, entity_id,
                   is_read, is_resolved, created_at, resolved_at, resolved_by
            FROM alerts
            WHERE ($1 = FALSE OR is_resolved = FALSE)
            ORDER BY created_at DESC
            "#,
        )
        .bind(unresolved_only)
        .fetch_all(&self.db)
        .await?;

        Ok(alerts)
    }

    /// Resolve an alert. A later low-stock event for the same material may
    /// then open a fresh alert.
    pub async fn resolve(&self, alert_id: Uuid, user_id: Uuid) -> AppResult<AlertRow> {
        let alert = sqlx::query_as::<_, AlertRow>(
            r#"
            UPDATE alerts
            SET is_resolved = TRUE,
                resolved_at = COALESCE(resolved_at, NOW()),
                resolved_by = COALESCE(resolved_by, $2)
            WHERE id = $1
            RETURNING id, alert_type, severity, title, message, entity_type, entity_id,
                      is_read, is_resolved, created_at, resolved_at, resolved_by
            "#,
        )
        .bind(alert_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Alert".to_string()))?;

        Ok(alert)
    }

    /// Mark an alert as read
    pub async fn mark_read(&self, alert_id: Uuid) -> AppResult<AlertRow> {
        let alert = sqlx::query_as::<_, AlertRow>(
            r#"
            UPDATE alerts
            SET is_read = TRUE
            WHERE id = $1
            RETURNING id, alert_type, severity, title, message, entity_type, entity_id,
                      is_read, is_resolved, created_at, resolved_at, resolved_by
            "#,
        )
        .bind(alert_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Alert".to_string()))?;

        Ok(alert)
    }
}

/// Row for the sweep query: stock quantity plus its material/warehouse context
#[derive(Debug, FromRow)]
struct LowStockSweepRow {
    quantity: i64,
    material_id: Uuid,
    material_name: String,
    material_sku: String,
    #[sqlx(try_from = "String")]
    unit: MaterialUnit,
    min_stock_level: i64,
    warehouse_name: String,
}
