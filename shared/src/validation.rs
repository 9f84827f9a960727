//! Validation rules for stock and transfer operations
//!
//! Pure checks the backend services run before opening a database
//! transaction. Everything here is deterministic and side-effect free.

use uuid::Uuid;

/// Validate that a transaction or line-item quantity is positive
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate the warehouse pair of a transfer
pub fn validate_warehouse_pair(from: Uuid, to: Uuid) -> Result<(), &'static str> {
    if from == to {
        return Err("Source and destination warehouse must differ");
    }
    Ok(())
}

/// Validate a transfer's line items: non-empty, all quantities positive,
/// no duplicate materials
pub fn validate_transfer_items(items: &[(Uuid, i64)]) -> Result<(), &'static str> {
    if items.is_empty() {
        return Err("Transfer must contain at least one item");
    }
    for (_, quantity) in items {
        validate_quantity(*quantity)?;
    }
    for (i, (material, _)) in items.iter().enumerate() {
        if items[i + 1..].iter().any(|(m, _)| m == material) {
            return Err("Transfer lists the same material twice");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wh(n: u8) -> Uuid {
        Uuid::from_u128(n as u128)
    }

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
    }

    #[test]
    fn warehouses_must_differ() {
        assert!(validate_warehouse_pair(wh(1), wh(2)).is_ok());
        assert!(validate_warehouse_pair(wh(1), wh(1)).is_err());
    }

    #[test]
    fn transfer_items_must_be_non_empty_and_positive() {
        assert!(validate_transfer_items(&[]).is_err());
        assert!(validate_transfer_items(&[(wh(1), 10)]).is_ok());
        assert!(validate_transfer_items(&[(wh(1), 10), (wh(2), 0)]).is_err());
    }

    #[test]
    fn transfer_items_reject_duplicate_materials() {
        assert!(validate_transfer_items(&[(wh(1), 10), (wh(1), 5)]).is_err());
        assert!(validate_transfer_items(&[(wh(1), 10), (wh(2), 5)]).is_ok());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn quantity_accepts_exactly_positives(q in -1000i64..=1000) {
                prop_assert_eq!(validate_quantity(q).is_ok(), q > 0);
            }

            #[test]
            fn distinct_positive_items_always_validate(
                quantities in prop::collection::vec(1i64..=1000, 1..10)
            ) {
                let items: Vec<(Uuid, i64)> = quantities
                    .iter()
                    .enumerate()
                    .map(|(i, q)| (Uuid::from_u128(i as u128 + 1), *q))
                    .collect();
                prop_assert!(validate_transfer_items(&items).is_ok());
            }
        }
    }
}
