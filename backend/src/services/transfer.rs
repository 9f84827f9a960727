//! Transfer service: two-warehouse stock movements
//!
//! A transfer is created `pending` with its items fixed, then completed
//! exactly once. Completion applies a `transfer_out`/`transfer_in` pair per
//! item through the same movement primitive as direct transactions, inside
//! one transaction scope: any insufficient line aborts the whole set.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::cache::CacheService;
use crate::error::{AppError, AppResult};
use crate::models::{
    format_transfer_number, validate_transfer_items, validate_warehouse_pair, CompletionBlocked,
    PaginatedResponse, Pagination, PaginationMeta, TransactionKind, TransferStatus,
};
use crate::services::alert::AlertService;
use crate::services::inventory::{apply_movement, StockMovement};

/// Transfer workflow service
#[derive(Clone)]
pub struct TransferService {
    db: PgPool,
    cache: CacheService,
    alerts: AlertService,
}

/// A transfer as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransferRow {
    pub id: Uuid,
    pub transfer_number: String,
    pub from_warehouse_id: Uuid,
    pub to_warehouse_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: TransferStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
}

/// A transfer line item as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransferItemRow {
    pub id: Uuid,
    pub transfer_id: Uuid,
    pub material_id: Uuid,
    pub quantity: i64,
}

/// A transfer with its line items
#[derive(Debug, Clone, Serialize)]
pub struct TransferWithItems {
    #[serde(flatten)]
    pub transfer: TransferRow,
    pub items: Vec<TransferItemRow>,
}

/// One line on a transfer creation request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TransferItemInput {
    pub material_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i64,
}

/// Input for creating a transfer
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransferInput {
    pub from_warehouse_id: Uuid,
    pub to_warehouse_id: Uuid,
    #[validate(length(min = 1))]
    pub items: Vec<TransferItemInput>,
    pub notes: Option<String>,
}

impl TransferService {
    /// Create a new TransferService instance
    pub fn new(db: PgPool, cache: CacheService, alerts: AlertService) -> Self {
        Self { db, cache, alerts }
    }

    /// Create a pending transfer with its items fixed at creation time.
    ///
    /// The transfer number comes from a database sequence, so concurrent
    /// creations never collide.
    pub async fn create(
        &self,
        user_id: Uuid,
        input: CreateTransferInput,
    ) -> AppResult<TransferWithItems> {
        validate_warehouse_pair(input.from_warehouse_id, input.to_warehouse_id)
            .map_err(|msg| AppError::validation("to_warehouse_id", msg))?;

        let item_pairs: Vec<(Uuid, i64)> = input
            .items
            .iter()
            .map(|item| (item.material_id, item.quantity))
            .collect();
        validate_transfer_items(&item_pairs).map_err(|msg| AppError::validation("items", msg))?;

        for warehouse_id in [input.from_warehouse_id, input.to_warehouse_id] {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
                    .bind(warehouse_id)
                    .fetch_one(&self.db)
                    .await?;
            if !exists {
                return Err(AppError::NotFound("Warehouse".to_string()));
            }
        }
        for (material_id, _) in &item_pairs {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM materials WHERE id = $1)")
                    .bind(material_id)
                    .fetch_one(&self.db)
                    .await?;
            if !exists {
                return Err(AppError::NotFound("Material".to_string()));
            }
        }

        let mut tx = self.db.begin().await?;

        let sequence: i64 = sqlx::query_scalar("SELECT nextval('transfer_number_seq')")
            .fetch_one(&mut *tx)
            .await?;
        let transfer_number = format_transfer_number(Utc::now().year(), sequence);

        let transfer = sqlx::query_as::<_, TransferRow>(
            r#"
            INSERT INTO transfers (transfer_number, from_warehouse_id, to_warehouse_id,
                                   status, notes, created_by)
            VALUES ($1, $2, $3, 'pending', $4, $5)
            RETURNING id, transfer_number, from_warehouse_id, to_warehouse_id, status,
                      notes, created_by, created_at, shipped_at, received_at
            "#,
        )
        .bind(&transfer_number)
        .bind(input.from_warehouse_id)
        .bind(input.to_warehouse_id)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let row = sqlx::query_as::<_, TransferItemRow>(
                r#"
                INSERT INTO transfer_items (transfer_id, material_id, quantity)
                VALUES ($1, $2, $3)
                RETURNING id, transfer_id, material_id, quantity
                "#,
            )
            .bind(transfer.id)
            .bind(item.material_id)
            .bind(item.quantity)
            .fetch_one(&mut *tx)
            .await?;
            items.push(row);
        }

        tx.commit().await?;

        tracing::info!(
            transfer_number = %transfer.transfer_number,
            items = items.len(),
            "transfer created"
        );

        Ok(TransferWithItems { transfer, items })
    }

    /// Complete a pending transfer, moving stock for every item or nothing.
    ///
    /// The transfer row is locked for the duration so a concurrent completion
    /// observes the final status, not the pre-completion one.
    pub async fn complete(&self, transfer_id: Uuid, user_id: Uuid) -> AppResult<TransferWithItems> {
        let mut tx = self.db.begin().await?;

        let transfer = sqlx::query_as::<_, TransferRow>(
            r#"
            SELECT id, transfer_number, from_warehouse_id, to_warehouse_id, status,
                   notes, created_by, created_at, shipped_at, received_at
            FROM transfers
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(transfer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Transfer".to_string()))?;

        match transfer.status.can_complete() {
            Ok(()) => {}
            Err(CompletionBlocked::AlreadyCompleted) => {
                return Err(AppError::AlreadyCompleted(format!(
                    "Transfer {} is already completed",
                    transfer.transfer_number
                )));
            }
            Err(CompletionBlocked::Cancelled) => {
                return Err(AppError::InvalidStateTransition(format!(
                    "Transfer {} is cancelled and cannot be completed",
                    transfer.transfer_number
                )));
            }
        }

        let items = sqlx::query_as::<_, TransferItemRow>(
            r#"
            SELECT id, transfer_id, material_id, quantity
            FROM transfer_items
            WHERE transfer_id = $1
            ORDER BY id
            "#,
        )
        .bind(transfer_id)
        .fetch_all(&mut *tx)
        .await?;

        // Any insufficient line aborts the whole transaction scope; no
        // partial movement is ever committed.
        let mut touched = Vec::with_capacity(items.len() * 2);
        for item in &items {
            let (out_quantity, _) = apply_movement(
                &mut tx,
                StockMovement {
                    warehouse_id: transfer.from_warehouse_id,
                    material_id: item.material_id,
                    kind: TransactionKind::TransferOut,
                    quantity: item.quantity,
                    unit_cost: None,
                    reference_id: Some(transfer.id),
                    notes: None,
                },
                user_id,
            )
            .await?;
            let (in_quantity, _) = apply_movement(
                &mut tx,
                StockMovement {
                    warehouse_id: transfer.to_warehouse_id,
                    material_id: item.material_id,
                    kind: TransactionKind::TransferIn,
                    quantity: item.quantity,
                    unit_cost: None,
                    reference_id: Some(transfer.id),
                    notes: None,
                },
                user_id,
            )
            .await?;
            touched.push((transfer.from_warehouse_id, item.material_id, out_quantity));
            touched.push((transfer.to_warehouse_id, item.material_id, in_quantity));
        }

        let completed = sqlx::query_as::<_, TransferRow>(
            r#"
            UPDATE transfers
            SET status = 'completed', received_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'in_transit')
            RETURNING id, transfer_number, from_warehouse_id, to_warehouse_id, status,
                      notes, created_by, created_at, shipped_at, received_at
            "#,
        )
        .bind(transfer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::AlreadyCompleted(format!(
                "Transfer {} is already completed",
                transfer.transfer_number
            ))
        })?;

        tx.commit().await?;

        tracing::info!(
            transfer_number = %completed.transfer_number,
            items = items.len(),
            "transfer completed"
        );

        // Post-commit, best-effort: both warehouses changed
        self.cache
            .invalidate_stock_views(&[completed.from_warehouse_id, completed.to_warehouse_id])
            .await;
        for (warehouse_id, material_id, new_quantity) in touched {
            if let Err(e) = self
                .alerts
                .evaluate_low_stock(warehouse_id, material_id, new_quantity)
                .await
            {
                tracing::warn!("Low-stock evaluation failed: {}", e);
            }
        }

        Ok(TransferWithItems {
            transfer: completed,
            items,
        })
    }

    /// Get a transfer with its items
    pub async fn get(&self, transfer_id: Uuid) -> AppResult<TransferWithItems> {
        let transfer = sqlx::query_as::<_, TransferRow>(
            r#"
            SELECT id, transfer_number, from_warehouse_id, to_warehouse_id, status,
                   notes, created_by, created_at, shipped_at, received_at
            FROM transfers
            WHERE id = $1
            "#,
        )
        .bind(transfer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Transfer".to_string()))?;

        let items = sqlx::query_as::<_, TransferItemRow>(
            r#"
            SELECT id, transfer_id, material_id, quantity
            FROM transfer_items
            WHERE transfer_id = $1
            ORDER BY id
            "#,
        )
        .bind(transfer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(TransferWithItems { transfer, items })
    }

    /// List transfers, optionally filtered by status, newest first
    pub async fn list(
        &self,
        status: Option<TransferStatus>,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<TransferRow>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transfers WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.db)
        .await?;

        let transfers = sqlx::query_as::<_, TransferRow>(
            r#"
            SELECT id, transfer_number, from_warehouse_id, to_warehouse_id, status,
                   notes, created_by, created_at, shipped_at, received_at
            FROM transfers
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(pagination.offset())
        .bind(pagination.limit())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: transfers,
            pagination: PaginationMeta {
                page: pagination.page,
                per_page: pagination.per_page,
                total: total as u64,
            },
        })
    }
}
