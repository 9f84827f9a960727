//! Stock ledger models and the per-kind application rules
//!
//! The current quantity for a (warehouse, material) pair is a projection over
//! an append-only ledger of stock transactions. [`TransactionKind::apply`] is
//! the single place where a ledger entry maps onto a quantity change; both
//! the transaction endpoint and transfer completion go through it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Current on-hand quantity for one (warehouse, material) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLevel {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub material_id: Uuid,
    pub quantity: i64,
    pub last_updated: DateTime<Utc>,
}

/// An immutable stock ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransaction {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub material_id: Uuid,
    pub kind: TransactionKind,
    /// Unsigned magnitude; the signed effect depends on `kind`
    pub quantity: i64,
    pub unit_cost: Option<Decimal>,
    pub total_cost: Option<Decimal>,
    /// Links transfer movements back to their transfer
    pub reference_id: Option<Uuid>,
    pub notes: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Kinds of stock transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Purchase,
    TransferOut,
    TransferIn,
    Consumption,
    Return,
    Adjustment,
}

/// Errors raised by the pure stock application rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("quantity must be positive")]
    NonPositiveQuantity,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Purchase => "purchase",
            TransactionKind::TransferOut => "transfer_out",
            TransactionKind::TransferIn => "transfer_in",
            TransactionKind::Consumption => "consumption",
            TransactionKind::Return => "return",
            TransactionKind::Adjustment => "adjustment",
        }
    }

    /// Whether this kind adds stock
    pub fn is_inbound(&self) -> bool {
        matches!(
            self,
            TransactionKind::Purchase | TransactionKind::TransferIn | TransactionKind::Return
        )
    }

    /// Whether this kind removes stock and therefore requires sufficiency
    pub fn is_outbound(&self) -> bool {
        matches!(
            self,
            TransactionKind::TransferOut | TransactionKind::Consumption
        )
    }

    /// Apply this transaction kind to a current quantity.
    ///
    /// Inbound kinds add, outbound kinds subtract after a sufficiency check,
    /// and `Adjustment` sets the quantity absolutely. The returned quantity
    /// is never negative.
    pub fn apply(&self, current: i64, quantity: i64) -> Result<i64, StockError> {
        if quantity <= 0 {
            return Err(StockError::NonPositiveQuantity);
        }
        match self {
            TransactionKind::Purchase | TransactionKind::TransferIn | TransactionKind::Return => {
                Ok(current + quantity)
            }
            TransactionKind::TransferOut | TransactionKind::Consumption => {
                if current < quantity {
                    Err(StockError::InsufficientStock {
                        available: current,
                        requested: quantity,
                    })
                } else {
                    Ok(current - quantity)
                }
            }
            // Absolute override: sets the quantity rather than applying a delta
            TransactionKind::Adjustment => Ok(quantity),
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase" => Ok(TransactionKind::Purchase),
            "transfer_out" => Ok(TransactionKind::TransferOut),
            "transfer_in" => Ok(TransactionKind::TransferIn),
            "consumption" => Ok(TransactionKind::Consumption),
            "return" => Ok(TransactionKind::Return),
            "adjustment" => Ok(TransactionKind::Adjustment),
            other => Err(format!("unknown transaction kind: {other}")),
        }
    }
}

impl TryFrom<String> for TransactionKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Replay a ledger history into the quantity it projects to.
///
/// This is the reconciliation definition for auditing and tests, not a hot
/// path. `Adjustment` rows are set-points: they reset the running sum to
/// their quantity instead of contributing a delta, matching what
/// [`TransactionKind::apply`] does on the live projection.
pub fn reconcile<I>(history: I) -> i64
where
    I: IntoIterator<Item = (TransactionKind, i64)>,
{
    history.into_iter().fold(0, |acc, (kind, quantity)| {
        if kind == TransactionKind::Adjustment {
            quantity
        } else if kind.is_inbound() {
            acc + quantity
        } else {
            acc - quantity
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_kinds_add() {
        assert_eq!(TransactionKind::Purchase.apply(10, 5), Ok(15));
        assert_eq!(TransactionKind::TransferIn.apply(0, 50), Ok(50));
        assert_eq!(TransactionKind::Return.apply(3, 2), Ok(5));
    }

    #[test]
    fn outbound_kinds_check_sufficiency() {
        assert_eq!(TransactionKind::Consumption.apply(100, 30), Ok(70));
        assert_eq!(
            TransactionKind::TransferOut.apply(70, 80),
            Err(StockError::InsufficientStock {
                available: 70,
                requested: 80,
            })
        );
    }

    #[test]
    fn adjustment_is_absolute() {
        assert_eq!(TransactionKind::Adjustment.apply(0, 5), Ok(5));
        assert_eq!(TransactionKind::Adjustment.apply(1000, 5), Ok(5));
    }

    #[test]
    fn non_positive_quantities_rejected() {
        for kind in [
            TransactionKind::Purchase,
            TransactionKind::Consumption,
            TransactionKind::Adjustment,
        ] {
            assert_eq!(kind.apply(10, 0), Err(StockError::NonPositiveQuantity));
            assert_eq!(kind.apply(10, -1), Err(StockError::NonPositiveQuantity));
        }
    }

    #[test]
    fn reconcile_replays_history() {
        let history = [
            (TransactionKind::Purchase, 100),
            (TransactionKind::Consumption, 30),
            (TransactionKind::TransferOut, 50),
            (TransactionKind::TransferIn, 10),
        ];
        assert_eq!(reconcile(history), 30);
    }

    #[test]
    fn reconcile_treats_adjustment_as_set_point() {
        let history = [
            (TransactionKind::Purchase, 100),
            (TransactionKind::Adjustment, 5),
            (TransactionKind::Purchase, 2),
        ];
        assert_eq!(reconcile(history), 7);
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            TransactionKind::Purchase,
            TransactionKind::TransferOut,
            TransactionKind::TransferIn,
            TransactionKind::Consumption,
            TransactionKind::Return,
            TransactionKind::Adjustment,
        ] {
            assert_eq!(kind.as_str().parse::<TransactionKind>(), Ok(kind));
        }
    }
}
