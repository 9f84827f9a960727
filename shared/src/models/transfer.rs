//! Warehouse transfer workflow models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Transfer lifecycle states
///
/// Only `Pending -> Completed` is driven by the engine; `InTransit` and
/// `Cancelled` exist as vocabulary for manual workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    InTransit,
    Completed,
    Cancelled,
}

/// Why a transfer cannot move to `completed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompletionBlocked {
    #[error("transfer is already completed")]
    AlreadyCompleted,

    #[error("transfer is cancelled")]
    Cancelled,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::InTransit => "in_transit",
            TransferStatus::Completed => "completed",
            TransferStatus::Cancelled => "cancelled",
        }
    }

    /// Whether stock may move for a transfer in this status.
    ///
    /// Completion is one-shot: a `completed` transfer reports
    /// [`CompletionBlocked::AlreadyCompleted`] so a second attempt can never
    /// move stock again, and a `cancelled` transfer is a dead end.
    pub fn can_complete(&self) -> Result<(), CompletionBlocked> {
        match self {
            TransferStatus::Pending | TransferStatus::InTransit => Ok(()),
            TransferStatus::Completed => Err(CompletionBlocked::AlreadyCompleted),
            TransferStatus::Cancelled => Err(CompletionBlocked::Cancelled),
        }
    }
}

impl std::str::FromStr for TransferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransferStatus::Pending),
            "in_transit" => Ok(TransferStatus::InTransit),
            "completed" => Ok(TransferStatus::Completed),
            "cancelled" => Ok(TransferStatus::Cancelled),
            other => Err(format!("unknown transfer status: {other}")),
        }
    }
}

impl TryFrom<String> for TransferStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A planned or completed movement of materials between two warehouses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: Uuid,
    pub transfer_number: String,
    pub from_warehouse_id: Uuid,
    pub to_warehouse_id: Uuid,
    pub status: TransferStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
}

/// One material line on a transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferItem {
    pub id: Uuid,
    pub transfer_id: Uuid,
    pub material_id: Uuid,
    pub quantity: i64,
}

/// Format a human-readable transfer number from a year and an allocated
/// sequence value, e.g. `TR-2026-00042`.
///
/// The sequence must come from an atomic allocator (a database sequence);
/// deriving it from a row count races under concurrent creation.
pub fn format_transfer_number(year: i32, sequence: i64) -> String {
    format!("TR-{}-{:05}", year, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_number_is_zero_padded() {
        assert_eq!(format_transfer_number(2026, 1), "TR-2026-00001");
        assert_eq!(format_transfer_number(2026, 42), "TR-2026-00042");
        assert_eq!(format_transfer_number(2027, 99999), "TR-2027-99999");
    }

    #[test]
    fn transfer_number_grows_past_padding() {
        assert_eq!(format_transfer_number(2026, 100000), "TR-2026-100000");
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            TransferStatus::Pending,
            TransferStatus::InTransit,
            TransferStatus::Completed,
            TransferStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<TransferStatus>(), Ok(status));
        }
    }

    #[test]
    fn only_pending_and_in_transit_can_complete() {
        assert_eq!(TransferStatus::Pending.can_complete(), Ok(()));
        assert_eq!(TransferStatus::InTransit.can_complete(), Ok(()));
        assert_eq!(
            TransferStatus::Completed.can_complete(),
            Err(CompletionBlocked::AlreadyCompleted)
        );
        assert_eq!(
            TransferStatus::Cancelled.can_complete(),
            Err(CompletionBlocked::Cancelled)
        );
    }
}
