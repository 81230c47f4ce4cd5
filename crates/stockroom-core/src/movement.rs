//! # Stock Movements
//!
//! A movement document asks for one item's stock to be adjusted. This module
//! turns it into a signed delta and finds the item it refers to; applying the
//! delta against the remote store happens in stockroom-feed.

use crate::types::{InventoryItem, MovementKind, StockMovement};

impl StockMovement {
    /// Signed stock change: `-|quantity|` for `out`, `+|quantity|` otherwise.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::{MovementKind, StockMovement};
    ///
    /// let issue = StockMovement { kind: MovementKind::Out, quantity: 4, ..Default::default() };
    /// assert_eq!(issue.delta(), -4);
    ///
    /// // The sign of the stored quantity is ignored.
    /// let receipt = StockMovement { kind: MovementKind::In, quantity: -4, ..Default::default() };
    /// assert_eq!(receipt.delta(), 4);
    /// ```
    pub fn delta(&self) -> i64 {
        let magnitude = self.quantity.saturating_abs();
        match self.kind {
            MovementKind::Out => -magnitude,
            MovementKind::In => magnitude,
        }
    }
}

/// Finds the inventory id a movement applies to.
///
/// An explicit, non-empty `item_id` wins as-is. Otherwise the first item whose
/// product code matches is used. `None` means the movement cannot be applied.
pub fn resolve_item_id<'a>(
    movement: &'a StockMovement,
    items: &'a [InventoryItem],
) -> Option<&'a str> {
    if let Some(id) = movement.item_id.as_deref().filter(|id| !id.is_empty()) {
        return Some(id);
    }

    let code = movement.product_code.as_deref().filter(|c| !c.is_empty())?;
    items
        .iter()
        .find(|item| item.product_code == code)
        .map(|item| item.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<InventoryItem> {
        vec![
            InventoryItem {
                id: "doc-1".into(),
                product_code: "NAIL-2IN".into(),
                ..Default::default()
            },
            InventoryItem {
                id: "doc-2".into(),
                product_code: "NAIL-3IN".into(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_delta_sign_follows_kind() {
        let mut m = StockMovement {
            quantity: 7,
            ..Default::default()
        };
        assert_eq!(m.delta(), 7);
        m.kind = MovementKind::Out;
        assert_eq!(m.delta(), -7);
        m.quantity = i64::MIN;
        assert_eq!(m.delta(), -i64::MAX);
    }

    #[test]
    fn test_item_id_wins_over_product_code() {
        let items = items();
        let m = StockMovement {
            item_id: Some("elsewhere".into()),
            product_code: Some("NAIL-3IN".into()),
            ..Default::default()
        };
        assert_eq!(resolve_item_id(&m, &items), Some("elsewhere"));
    }

    #[test]
    fn test_falls_back_to_product_code() {
        let items = items();
        let m = StockMovement {
            item_id: Some(String::new()),
            product_code: Some("NAIL-3IN".into()),
            ..Default::default()
        };
        assert_eq!(resolve_item_id(&m, &items), Some("doc-2"));
    }

    #[test]
    fn test_unresolvable() {
        let items = items();
        let unknown = StockMovement {
            product_code: Some("SCREW".into()),
            ..Default::default()
        };
        assert_eq!(resolve_item_id(&unknown, &items), None);
        assert_eq!(resolve_item_id(&StockMovement::default(), &items), None);
    }
}
