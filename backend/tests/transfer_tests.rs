//! Warehouse transfer tests
//!
//! Covers transfer numbering, status vocabulary, creation-time validation,
//! and conservation of stock across a completed transfer.

use std::collections::HashMap;

use shared::models::{
    format_transfer_number, CompletionBlocked, StockError, TransactionKind, TransferStatus,
};
use shared::validation::{validate_transfer_items, validate_warehouse_pair};
use uuid::Uuid;

fn material(n: u8) -> Uuid {
    Uuid::from_u128(n as u128)
}

type Stock = HashMap<Uuid, i64>;

/// Apply every line of a transfer against source and destination stock, or
/// nothing: the first failing line discards all staged movement, mirroring
/// the transactional rollback in the service.
fn apply_transfer_items(
    source: &Stock,
    dest: &Stock,
    items: &[(Uuid, i64)],
) -> Result<(Stock, Stock), StockError> {
    let mut new_source = source.clone();
    let mut new_dest = dest.clone();
    for (material_id, quantity) in items {
        let current = new_source.get(material_id).copied().unwrap_or(0);
        new_source.insert(
            *material_id,
            TransactionKind::TransferOut.apply(current, *quantity)?,
        );
        let current = new_dest.get(material_id).copied().unwrap_or(0);
        new_dest.insert(
            *material_id,
            TransactionKind::TransferIn.apply(current, *quantity)?,
        );
    }
    Ok((new_source, new_dest))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_transfer_number_format() {
        assert_eq!(format_transfer_number(2026, 1), "TR-2026-00001");
        assert_eq!(format_transfer_number(2026, 42), "TR-2026-00042");
        assert_eq!(format_transfer_number(2027, 123_456), "TR-2027-123456");
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            TransferStatus::Pending,
            TransferStatus::InTransit,
            TransferStatus::Completed,
            TransferStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<TransferStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<TransferStatus>().is_err());
    }

    #[test]
    fn test_warehouse_pair_must_differ() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        assert!(validate_warehouse_pair(a, b).is_ok());
        assert!(validate_warehouse_pair(a, a).is_err());
    }

    #[test]
    fn test_items_must_be_non_empty() {
        assert!(validate_transfer_items(&[]).is_err());
        assert!(validate_transfer_items(&[(material(1), 5)]).is_ok());
    }

    #[test]
    fn test_items_reject_duplicate_materials() {
        let items = [(material(1), 5), (material(2), 3), (material(1), 7)];
        assert!(validate_transfer_items(&items).is_err());
    }

    #[test]
    fn test_items_reject_non_positive_quantities() {
        assert!(validate_transfer_items(&[(material(1), 0)]).is_err());
        assert!(validate_transfer_items(&[(material(1), -4)]).is_err());
    }

    /// Moving a quantity out of one warehouse and into another leaves the
    /// combined total unchanged
    #[test]
    fn test_completed_item_conserves_total() {
        let source = 120i64;
        let dest = 15i64;
        let moved = 40i64;

        let new_source = TransactionKind::TransferOut.apply(source, moved).unwrap();
        let new_dest = TransactionKind::TransferIn.apply(dest, moved).unwrap();

        assert_eq!(new_source + new_dest, source + dest);
        assert_eq!(new_source, 80);
        assert_eq!(new_dest, 55);
    }

    /// A short source rejects the outbound half before anything moves
    #[test]
    fn test_insufficient_source_blocks_the_pair() {
        let source = 10i64;
        assert!(TransactionKind::TransferOut.apply(source, 11).is_err());
    }

    #[test]
    fn test_completion_guard_per_status() {
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

    /// Completing twice moves stock exactly once: the first completion lands
    /// the movement and flips the status, the second is refused by the guard
    /// with the stock untouched
    #[test]
    fn test_second_completion_moves_nothing() {
        let m = material(1);
        let source = Stock::from([(m, 100)]);
        let dest = Stock::from([(m, 10)]);
        let items = [(m, 40)];

        let mut status = TransferStatus::Pending;
        assert_eq!(status.can_complete(), Ok(()));
        let (source, dest) = apply_transfer_items(&source, &dest, &items).unwrap();
        status = TransferStatus::Completed;

        assert_eq!(source[&m], 60);
        assert_eq!(dest[&m], 50);

        // Second attempt: guard refuses, stock stays where the first left it
        assert_eq!(
            status.can_complete(),
            Err(CompletionBlocked::AlreadyCompleted)
        );
        assert_eq!(source[&m], 60);
        assert_eq!(dest[&m], 50);
    }

    #[test]
    fn test_cancelled_transfer_never_moves_stock() {
        assert_eq!(
            TransferStatus::Cancelled.can_complete(),
            Err(CompletionBlocked::Cancelled)
        );
    }

    /// A failing line aborts the whole item set: earlier lines that would
    /// have succeeded are not applied
    #[test]
    fn test_failing_line_leaves_prior_lines_unapplied() {
        let m1 = material(1);
        let m2 = material(2);
        let source = Stock::from([(m1, 50), (m2, 5)]);
        let dest = Stock::from([(m1, 0), (m2, 0)]);

        // First line is coverable, second is not
        let result = apply_transfer_items(&source, &dest, &[(m1, 10), (m2, 999)]);
        assert!(matches!(
            result,
            Err(StockError::InsufficientStock {
                available: 5,
                requested: 999,
            })
        ));

        // Nothing moved, including the first line
        assert_eq!(source[&m1], 50);
        assert_eq!(source[&m2], 5);
        assert_eq!(dest[&m1], 0);
        assert_eq!(dest[&m2], 0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn quantity_strategy() -> impl Strategy<Value = i64> {
        1i64..=10_000
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Transfer numbers are unique per sequence value and sortable within
        /// a year
        #[test]
        fn prop_transfer_numbers_unique_and_ordered(
            year in 2020i32..=2099,
            a in 1i64..=99_999,
            b in 1i64..=99_999
        ) {
            let na = format_transfer_number(year, a);
            let nb = format_transfer_number(year, b);
            if a == b {
                prop_assert_eq!(na, nb);
            } else {
                prop_assert_ne!(na.clone(), nb.clone());
                prop_assert_eq!(a < b, na < nb);
            }
        }

        /// Completing a transfer item conserves the total across warehouses
        /// whenever the source is sufficient
        #[test]
        fn prop_completion_conserves_stock(
            source in 0i64..=10_000,
            dest in 0i64..=10_000,
            moved in quantity_strategy()
        ) {
            match TransactionKind::TransferOut.apply(source, moved) {
                Ok(new_source) => {
                    let new_dest = TransactionKind::TransferIn.apply(dest, moved).unwrap();
                    prop_assert_eq!(new_source + new_dest, source + dest);
                    prop_assert!(new_source >= 0);
                }
                Err(_) => prop_assert!(source < moved),
            }
        }

        /// A multi-item completion either moves every line (conserving stock
        /// per material) or moves nothing at all
        #[test]
        fn prop_multi_item_all_or_nothing(
            stocks in prop::collection::vec((0i64..=100, 0i64..=100), 1..6),
            moved in prop::collection::vec(1i64..=150, 1..6)
        ) {
            let len = stocks.len().min(moved.len());
            let source: Stock = stocks[..len]
                .iter()
                .enumerate()
                .map(|(i, (s, _))| (Uuid::from_u128(i as u128 + 1), *s))
                .collect();
            let dest: Stock = stocks[..len]
                .iter()
                .enumerate()
                .map(|(i, (_, d))| (Uuid::from_u128(i as u128 + 1), *d))
                .collect();
            let items: Vec<(Uuid, i64)> = moved[..len]
                .iter()
                .enumerate()
                .map(|(i, q)| (Uuid::from_u128(i as u128 + 1), *q))
                .collect();

            match apply_transfer_items(&source, &dest, &items) {
                Ok((new_source, new_dest)) => {
                    // Every line was coverable; totals are conserved per material
                    for (material_id, quantity) in &items {
                        prop_assert!(source[material_id] >= *quantity);
                        prop_assert_eq!(
                            new_source[material_id] + new_dest[material_id],
                            source[material_id] + dest[material_id]
                        );
                    }
                }
                Err(_) => {
                    // Some line was short; the inputs are untouched by staging
                    prop_assert!(items
                        .iter()
                        .any(|(material_id, quantity)| source[material_id] < *quantity));
                }
            }
        }

        /// Item validation accepts exactly the lists that are non-empty,
        /// positive, and duplicate-free
        #[test]
        fn prop_item_validation(
            quantities in prop::collection::vec(-100i64..=100, 0..8)
        ) {
            let items: Vec<(Uuid, i64)> = quantities
                .iter()
                .enumerate()
                .map(|(i, q)| (Uuid::from_u128(i as u128), *q))
                .collect();

            let expect_ok = !items.is_empty() && quantities.iter().all(|q| *q > 0);
            prop_assert_eq!(validate_transfer_items(&items).is_ok(), expect_ok);
        }
    }
}
