//! Stock ledger tests
//!
//! Covers the per-kind transaction rules, the non-negativity invariant,
//! and ledger reconciliation against the stock projection.

use shared::models::{reconcile, StockError, TransactionKind};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_inbound_kinds_add() {
        for kind in [
            TransactionKind::Purchase,
            TransactionKind::TransferIn,
            TransactionKind::Return,
        ] {
            assert_eq!(kind.apply(100, 25).unwrap(), 125);
            assert!(kind.is_inbound());
        }
    }

    #[test]
    fn test_outbound_kinds_subtract() {
        for kind in [TransactionKind::TransferOut, TransactionKind::Consumption] {
            assert_eq!(kind.apply(100, 25).unwrap(), 75);
            assert!(kind.is_outbound());
        }
    }

    /// Withdrawing exactly the available quantity drains to zero
    #[test]
    fn test_exact_withdrawal_reaches_zero() {
        assert_eq!(TransactionKind::Consumption.apply(40, 40).unwrap(), 0);
    }

    #[test]
    fn test_insufficient_stock_is_rejected() {
        let err = TransactionKind::Consumption.apply(10, 11).unwrap_err();
        match err {
            StockError::InsufficientStock {
                available,
                requested,
            } => {
                assert_eq!(available, 10);
                assert_eq!(requested, 11);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// An adjustment sets the quantity outright, ignoring the current value
    #[test]
    fn test_adjustment_is_absolute() {
        assert_eq!(TransactionKind::Adjustment.apply(500, 7).unwrap(), 7);
        assert_eq!(TransactionKind::Adjustment.apply(3, 7).unwrap(), 7);
    }

    #[test]
    fn test_non_positive_quantity_is_rejected() {
        for kind in [
            TransactionKind::Purchase,
            TransactionKind::Consumption,
            TransactionKind::Adjustment,
        ] {
            assert!(matches!(
                kind.apply(100, 0),
                Err(StockError::NonPositiveQuantity)
            ));
            assert!(matches!(
                kind.apply(100, -5),
                Err(StockError::NonPositiveQuantity)
            ));
        }
    }

    #[test]
    fn test_kind_string_round_trip() {
        for kind in [
            TransactionKind::Purchase,
            TransactionKind::TransferOut,
            TransactionKind::TransferIn,
            TransactionKind::Consumption,
            TransactionKind::Return,
            TransactionKind::Adjustment,
        ] {
            assert_eq!(kind.as_str().parse::<TransactionKind>().unwrap(), kind);
        }
        assert!("melt".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_reconcile_simple_history() {
        let history = vec![
            (TransactionKind::Purchase, 100),
            (TransactionKind::Consumption, 30),
            (TransactionKind::Return, 5),
        ];
        assert_eq!(reconcile(history), 75);
    }

    /// An adjustment in the history resets the running quantity
    #[test]
    fn test_reconcile_adjustment_resets() {
        let history = vec![
            (TransactionKind::Purchase, 100),
            (TransactionKind::Adjustment, 12),
            (TransactionKind::Purchase, 8),
        ];
        assert_eq!(reconcile(history), 20);
    }

    #[test]
    fn test_reconcile_empty_history_is_zero() {
        assert_eq!(reconcile(Vec::new()), 0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
        prop_oneof![
            Just(TransactionKind::Purchase),
            Just(TransactionKind::TransferOut),
            Just(TransactionKind::TransferIn),
            Just(TransactionKind::Consumption),
            Just(TransactionKind::Return),
            Just(TransactionKind::Adjustment),
        ]
    }

    fn quantity_strategy() -> impl Strategy<Value = i64> {
        1i64..=10_000
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A successful apply never produces a negative quantity
        #[test]
        fn prop_apply_never_negative(
            kind in kind_strategy(),
            current in 0i64..=10_000,
            quantity in quantity_strategy()
        ) {
            if let Ok(new_quantity) = kind.apply(current, quantity) {
                prop_assert!(new_quantity >= 0);
            }
        }

        /// Inbound kinds always add the exact quantity
        #[test]
        fn prop_inbound_adds_exactly(
            current in 0i64..=10_000,
            quantity in quantity_strategy()
        ) {
            for kind in [
                TransactionKind::Purchase,
                TransactionKind::TransferIn,
                TransactionKind::Return,
            ] {
                prop_assert_eq!(kind.apply(current, quantity).unwrap(), current + quantity);
            }
        }

        /// Outbound kinds succeed exactly when stock is sufficient
        #[test]
        fn prop_outbound_checked(
            current in 0i64..=10_000,
            quantity in quantity_strategy()
        ) {
            for kind in [TransactionKind::TransferOut, TransactionKind::Consumption] {
                match kind.apply(current, quantity) {
                    Ok(new_quantity) => {
                        prop_assert!(current >= quantity);
                        prop_assert_eq!(new_quantity, current - quantity);
                    }
                    Err(StockError::InsufficientStock { available, requested }) => {
                        prop_assert!(current < quantity);
                        prop_assert_eq!(available, current);
                        prop_assert_eq!(requested, quantity);
                    }
                    Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
                }
            }
        }

        /// The result of an adjustment is independent of the current quantity
        #[test]
        fn prop_adjustment_ignores_current(
            current_a in 0i64..=10_000,
            current_b in 0i64..=10_000,
            quantity in quantity_strategy()
        ) {
            prop_assert_eq!(
                TransactionKind::Adjustment.apply(current_a, quantity).unwrap(),
                TransactionKind::Adjustment.apply(current_b, quantity).unwrap()
            );
        }

        /// Replaying a history that applied cleanly reproduces the projection
        #[test]
        fn prop_reconcile_matches_replay(
            entries in prop::collection::vec(
                (kind_strategy(), quantity_strategy()),
                0..30
            )
        ) {
            let mut projected = 0i64;
            let mut accepted = Vec::new();
            for (kind, quantity) in entries {
                if let Ok(new_quantity) = kind.apply(projected, quantity) {
                    projected = new_quantity;
                    accepted.push((kind, quantity));
                }
            }

            prop_assert_eq!(reconcile(accepted), projected);
        }

        /// After an adjustment, earlier history no longer affects the result
        #[test]
        fn prop_reconcile_adjustment_is_a_barrier(
            prefix in prop::collection::vec(
                (kind_strategy(), quantity_strategy()),
                0..10
            ),
            set_point in quantity_strategy(),
            suffix_quantities in prop::collection::vec(quantity_strategy(), 0..10)
        ) {
            let suffix: Vec<(TransactionKind, i64)> = suffix_quantities
                .into_iter()
                .map(|q| (TransactionKind::Purchase, q))
                .collect();

            let mut with_prefix = prefix;
            with_prefix.push((TransactionKind::Adjustment, set_point));
            with_prefix.extend(suffix.iter().cloned());

            let mut without_prefix = vec![(TransactionKind::Adjustment, set_point)];
            without_prefix.extend(suffix);

            prop_assert_eq!(reconcile(with_prefix), reconcile(without_prefix));
        }
    }
}
