//! Inventory service: the stock projection and its ledger
//!
//! Every quantity change goes through [`apply_movement`], which runs inside
//! a database transaction, locks the projection row, applies the per-kind
//! rule from the shared crate, and records the ledger entry. Either both
//! writes commit or neither does.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::cache::{CacheKeys, CacheService};
use crate::error::{AppError, AppResult};
use crate::models::{validate_quantity, TransactionKind};
use crate::services::alert::AlertService;

/// Inventory service for stock transactions and cached inventory views
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
    cache: CacheService,
    alerts: AlertService,
}

/// A stock ledger entry as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockTransactionRow {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub material_id: Uuid,
    #[sqlx(try_from = "String")]
    pub kind: TransactionKind,
    pub quantity: i64,
    pub unit_cost: Option<Decimal>,
    pub total_cost: Option<Decimal>,
    pub reference_id: Option<Uuid>,
    pub notes: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A stock row joined with material and warehouse names for API views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WarehouseStockRow {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub material_id: Uuid,
    pub quantity: i64,
    pub last_updated: DateTime<Utc>,
    pub material_name: String,
    pub material_sku: String,
    pub min_stock_level: i64,
    pub warehouse_name: String,
}

/// Input for recording a stock transaction
#[derive(Debug, Deserialize, Validate)]
pub struct RecordTransactionInput {
    pub warehouse_id: Uuid,
    pub material_id: Uuid,
    pub transaction_type: TransactionKind,
    #[validate(range(min = 1))]
    pub quantity: i64,
    pub unit_cost: Option<Decimal>,
    pub notes: Option<String>,
}

/// Result of applying a stock transaction
#[derive(Debug, Serialize)]
pub struct TransactionOutcome {
    pub transaction: StockTransactionRow,
    pub new_quantity: i64,
}

/// One quantity change against a single (warehouse, material) pair
#[derive(Debug, Clone)]
pub(crate) struct StockMovement {
    pub warehouse_id: Uuid,
    pub material_id: Uuid,
    pub kind: TransactionKind,
    pub quantity: i64,
    pub unit_cost: Option<Decimal>,
    pub reference_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Apply one stock movement inside an open transaction scope.
///
/// Locks the `stock_levels` row (`FOR UPDATE`) so that concurrent
/// check-then-act sequences on the same pair are serialized, then writes the
/// new projection and the ledger entry. Creates the projection row lazily at
/// quantity 0 on first touch. Callers own commit/rollback.
pub(crate) async fn apply_movement(
    tx: &mut Transaction<'_, Postgres>,
    movement: StockMovement,
    user_id: Uuid,
) -> AppResult<(i64, StockTransactionRow)> {
    sqlx::query(
        r#"
        INSERT INTO stock_levels (warehouse_id, material_id, quantity)
        VALUES ($1, $2, 0)
        ON CONFLICT (warehouse_id, material_id) DO NOTHING
        "#,
    )
    .bind(movement.warehouse_id)
    .bind(movement.material_id)
    .execute(&mut **tx)
    .await?;

    let current: i64 = sqlx::query_scalar(
        "SELECT quantity FROM stock_levels WHERE warehouse_id = $1 AND material_id = $2 FOR UPDATE",
    )
    .bind(movement.warehouse_id)
    .bind(movement.material_id)
    .fetch_one(&mut **tx)
    .await?;

    let new_quantity = movement.kind.apply(current, movement.quantity)?;

    if movement.kind == TransactionKind::Adjustment {
        // Absolute override: can mask drift between ledger and projection
        tracing::warn!(
            warehouse_id = %movement.warehouse_id,
            material_id = %movement.material_id,
            previous = current,
            new = new_quantity,
            "stock adjustment overrides current quantity"
        );
    }

    sqlx::query(
        r#"
        UPDATE stock_levels
        SET quantity = $3, last_updated = NOW()
        WHERE warehouse_id = $1 AND material_id = $2
        "#,
    )
    .bind(movement.warehouse_id)
    .bind(movement.material_id)
    .bind(new_quantity)
    .execute(&mut **tx)
    .await?;

    let total_cost = movement
        .unit_cost
        .map(|cost| cost * Decimal::from(movement.quantity));

    let transaction = sqlx::query_as::<_, StockTransactionRow>(
        r#"
        INSERT INTO stock_transactions (
            warehouse_id, material_id, kind, quantity,
            unit_cost, total_cost, reference_id, notes, user_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, warehouse_id, material_id, kind, quantity,
                  unit_cost, total_cost, reference_id, notes, user_id, created_at
        "#,
    )
    .bind(movement.warehouse_id)
    .bind(movement.material_id)
    .bind(movement.kind.as_str())
    .bind(movement.quantity)
    .bind(movement.unit_cost)
    .bind(total_cost)
    .bind(movement.reference_id)
    .bind(&movement.notes)
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok((new_quantity, transaction))
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool, cache: CacheService, alerts: AlertService) -> Self {
        Self { db, cache, alerts }
    }

    /// Record a stock transaction and return the resulting quantity.
    ///
    /// Cache invalidation and low-stock evaluation run after the commit and
    /// never fail the request.
    pub async fn apply_transaction(
        &self,
        user_id: Uuid,
        input: RecordTransactionInput,
    ) -> AppResult<TransactionOutcome> {
        validate_quantity(input.quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;

        let warehouse_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
                .bind(input.warehouse_id)
                .fetch_one(&self.db)
                .await?;
        if !warehouse_exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let material_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM materials WHERE id = $1)")
                .bind(input.material_id)
                .fetch_one(&self.db)
                .await?;
        if !material_exists {
            return Err(AppError::NotFound("Material".to_string()));
        }

        let mut tx = self.db.begin().await?;
        let (new_quantity, transaction) = apply_movement(
            &mut tx,
            StockMovement {
                warehouse_id: input.warehouse_id,
                material_id: input.material_id,
                kind: input.transaction_type,
                quantity: input.quantity,
                unit_cost: input.unit_cost,
                reference_id: None,
                notes: input.notes.clone(),
            },
            user_id,
        )
        .await?;
        tx.commit().await?;

        // Post-commit, best-effort: stale views and derived alerts
        self.cache
            .invalidate_stock_views(&[input.warehouse_id])
            .await;
        if let Err(e) = self
            .alerts
            .evaluate_low_stock(input.warehouse_id, input.material_id, new_quantity)
            .await
        {
            tracing::warn!("Low-stock evaluation failed: {}", e);
        }

        Ok(TransactionOutcome {
            transaction,
            new_quantity,
        })
    }

    /// Inventory view for one warehouse, read through the cache
    pub async fn warehouse_inventory(
        &self,
        warehouse_id: Uuid,
    ) -> AppResult<Vec<WarehouseStockRow>> {
        let cache_key = CacheKeys::inventory_warehouse(warehouse_id);
        if let Some(cached) = self.cache.get_json::<Vec<WarehouseStockRow>>(&cache_key).await {
            return Ok(cached);
        }

        let warehouse_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
                .bind(warehouse_id)
                .fetch_one(&self.db)
                .await?;
        if !warehouse_exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let rows = sqlx::query_as::<_, WarehouseStockRow>(
            r#"
            SELECT s.id, s.warehouse_id, s.material_id, s.quantity, s.last_updated,
                   m.name AS material_name, m.sku AS material_sku, m.min_stock_level,
                   w.name AS warehouse_name
            FROM stock_levels s
            JOIN materials m ON s.material_id = m.id
            JOIN warehouses w ON s.warehouse_id = w.id
            WHERE s.warehouse_id = $1
            ORDER BY m.name
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        self.cache
            .set_json(&cache_key, &rows, self.cache.inventory_ttl_secs())
            .await;

        Ok(rows)
    }

    /// Stock rows at or below their material's minimum level, read through
    /// the cache with a shorter TTL
    pub async fn low_stock(&self) -> AppResult<Vec<WarehouseStockRow>> {
        let cache_key = CacheKeys::inventory_low_stock();
        if let Some(cached) = self.cache.get_json::<Vec<WarehouseStockRow>>(&cache_key).await {
            return Ok(cached);
        }

        let rows = sqlx::query_as::<_, WarehouseStockRow>(
            r#"
            SELECT s.id, s.warehouse_id, s.material_id, s.quantity, s.last_updated,
                   m.name AS material_name, m.sku AS material_sku, m.min_stock_level,
                   w.name AS warehouse_name
            FROM stock_levels s
            JOIN materials m ON s.material_id = m.id
            JOIN warehouses w ON s.warehouse_id = w.id
            WHERE s.quantity <= m.min_stock_level
            ORDER BY s.quantity ASC, m.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        self.cache
            .set_json(&cache_key, &rows, self.cache.low_stock_ttl_secs())
            .await;

        Ok(rows)
    }

    /// Ledger history for one (warehouse, material) pair, newest first.
    /// Summing these entries per the reconciliation rule reproduces the
    /// projection; used for audits.
    pub async fn pair_history(
        &self,
        warehouse_id: Uuid,
        material_id: Uuid,
    ) -> AppResult<Vec<StockTransactionRow>> {
        let rows = sqlx::query_as::<_, StockTransactionRow>(
            r#"
            SELECT id, warehouse_id, material_id, kind, quantity,
                   unit_cost, total_cost, reference_id, notes, user_id, created_at
            FROM stock_transactions
            WHERE warehouse_id = $1 AND material_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(warehouse_id)
        .bind(material_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}
