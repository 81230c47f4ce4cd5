//! # Domain Types
//!
//! Typed records the dashboard works with.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InventoryItem  │   │      Order      │   │  ActivityEvent  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (opaque)    │   │  id (opaque)    │   │  id (opaque)    │       │
//! │  │  product_code   │   │  total          │   │  message        │       │
//! │  │  current_stock  │   │  items[]        │   │  entity_type    │       │
//! │  │  price / cost   │   │  status         │   │  actor          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    OrderLine    │   │   OrderStatus   │   │  StockMovement  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name           │   │  Completed      │   │  item_id?       │       │
//! │  │  quantity       │   │  Pending        │   │  product_code?  │       │
//! │  │  price          │   │  Cancelled      │   │  kind (in/out)  │       │
//! │  └─────────────────┘   │  Other(text)    │   │  quantity       │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Zero-Defaulted Schema
//! Records here are already well-typed: the ingestion boundary in
//! stockroom-feed turns absent or non-numeric fields into zero before a
//! record is built. Optional fields stay `Option` only where "absent" and
//! "zero" lead to different fallbacks (e.g. `maximum_stock`, `cost`).
//!
//! Identifiers are opaque document ids assigned by the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Inventory Item
// =============================================================================

/// One stocked product of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryItem {
    /// Document id.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Business product code printed on shelf labels.
    pub product_code: String,

    /// Category label ("Fasteners", "Paint", ...).
    pub category: Option<String>,

    /// Units currently on hand.
    pub current_stock: i64,

    /// Target stock; below this the item is understocked.
    pub minimum_stock: i64,

    /// Reorder threshold used by the list screen. Falls back to
    /// `minimum_stock` when absent or zero.
    pub reorder_point: Option<i64>,

    /// Upper stock bound. Falls back to twice `minimum_stock`.
    pub maximum_stock: Option<i64>,

    /// Shelf price per unit.
    pub price: Money,

    /// Purchase cost per unit.
    pub cost: Option<Money>,

    /// Legacy selling price field, second choice when valuing losses.
    pub selling_price: Option<Money>,

    /// Unit label ("pcs", "box", "m").
    pub unit: String,

    /// Cumulative units consumed or sold.
    pub usage: Option<i64>,

    /// Physical count minus recorded stock. Negative means shrinkage.
    pub inventory_variance: Option<i64>,

    /// When the document was last written.
    #[ts(as = "Option<String>")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl InventoryItem {
    /// Usage with "absent" treated as zero.
    #[inline]
    pub fn usage_or_zero(&self) -> i64 {
        self.usage.unwrap_or(0)
    }

    /// Variance with "absent" treated as zero.
    #[inline]
    pub fn variance_or_zero(&self) -> i64 {
        self.inventory_variance.unwrap_or(0)
    }

    /// Value of the stock on hand: `price × current_stock`.
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.price.multiply_quantity(self.current_stock)
    }

    /// Sales attributed to the item: `price × usage`.
    #[inline]
    pub fn sales_value(&self) -> Money {
        self.price.multiply_quantity(self.usage_or_zero())
    }

    /// Upper bound used by the stock-health buckets.
    ///
    /// `maximum_stock` when set to a non-zero value, otherwise
    /// `2 × minimum_stock`.
    pub fn effective_maximum(&self) -> i64 {
        match self.maximum_stock {
            Some(max) if max != 0 => max,
            _ => self.minimum_stock.saturating_mul(2),
        }
    }

    /// Threshold used by the list screen's stock status and filters.
    ///
    /// `reorder_point` when set to a non-zero value, otherwise
    /// `minimum_stock`.
    pub fn low_stock_threshold(&self) -> i64 {
        match self.reorder_point {
            Some(point) if point != 0 => point,
            _ => self.minimum_stock,
        }
    }

    /// Unit cost used to value shrinkage.
    ///
    /// First non-zero of `cost`, `selling_price`, `price`; zero otherwise.
    pub fn loss_unit_cost(&self) -> Money {
        [self.cost, self.selling_price, Some(self.price)]
            .into_iter()
            .flatten()
            .find(|m| !m.is_zero())
            .unwrap_or_default()
    }

    /// Value lost to negative variance: `|variance| × loss_unit_cost`.
    /// Zero when variance is zero or positive.
    pub fn lost_value(&self) -> Money {
        let variance = self.variance_or_zero();
        if variance >= 0 {
            return Money::zero();
        }
        self.loss_unit_cost()
            .multiply_quantity(variance.saturating_abs())
    }

    /// Non-empty category label, if any.
    pub fn category_label(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Status of an order, parsed case-insensitively from free text.
///
/// Serialized as its lower-case label so unknown statuses survive a
/// round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// Paid and handed over. Also the status assumed when none is stored.
    #[default]
    Completed,
    /// Awaiting payment or pickup.
    Pending,
    /// Cancelled before completion.
    Cancelled,
    /// Anything else, lower-cased.
    Other(String),
}

impl OrderStatus {
    /// Parses a status label. Never fails.
    pub fn parse(label: &str) -> Self {
        let lower = label.trim().to_lowercase();
        match lower.as_str() {
            "completed" => OrderStatus::Completed,
            "pending" => OrderStatus::Pending,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(lower),
        }
    }

    /// Lower-case label used as the breakdown key in reports.
    pub fn label(&self) -> &str {
        match self {
            OrderStatus::Completed => "completed",
            OrderStatus::Pending => "pending",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Other(label) => label,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(label: String) -> Self {
        OrderStatus::parse(&label)
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.label().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A line of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLine {
    pub name: String,
    pub quantity: i64,
    /// Unit price at time of sale.
    pub price: Money,
}

impl OrderLine {
    /// `price × quantity`.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// A customer order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub total: Money,
    pub items: Vec<OrderLine>,
    pub customer_name: String,
    pub payment_method: String,
    #[ts(as = "String")]
    pub status: OrderStatus,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Activity Event
// =============================================================================

/// An audit-trail entry shown under "Recent Activity". Display only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ActivityEvent {
    pub id: String,
    pub message: String,
    pub entity_type: String,
    /// Who performed the action; empty when unknown.
    pub actor: String,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ActivityEvent {
    /// The `limit` newest events, newest first. Undated events sort last and
    /// ties keep their input order.
    pub fn newest(events: &[ActivityEvent], limit: usize) -> Vec<ActivityEvent> {
        let mut sorted: Vec<&ActivityEvent> = events.iter().collect();
        // None < Some, so reversing the comparison puts undated events last
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted.into_iter().take(limit).cloned().collect()
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MovementKind {
    /// Goods received.
    #[default]
    In,
    /// Goods issued or sold.
    Out,
}

/// A stock movement document: a request to adjust one item's stock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockMovement {
    /// Inventory document id, when the producer knew it.
    pub item_id: Option<String>,
    /// Fallback lookup key when `item_id` is missing.
    pub product_code: Option<String>,
    pub kind: MovementKind,
    /// Magnitude of the movement; the sign comes from `kind`.
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> InventoryItem {
        InventoryItem {
            id: "hammer".into(),
            name: "Claw Hammer".into(),
            price: Money::from_pesos(250),
            current_stock: 4,
            minimum_stock: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_effective_maximum_fallback() {
        let mut it = item();
        assert_eq!(it.effective_maximum(), 10);

        it.maximum_stock = Some(0);
        assert_eq!(it.effective_maximum(), 10);

        it.maximum_stock = Some(40);
        assert_eq!(it.effective_maximum(), 40);
    }

    #[test]
    fn test_low_stock_threshold_fallback() {
        let mut it = item();
        assert_eq!(it.low_stock_threshold(), 5);

        it.reorder_point = Some(0);
        assert_eq!(it.low_stock_threshold(), 5);

        it.reorder_point = Some(2);
        assert_eq!(it.low_stock_threshold(), 2);
    }

    #[test]
    fn test_loss_unit_cost_chain() {
        let mut it = item();
        assert_eq!(it.loss_unit_cost(), Money::from_pesos(250));

        it.selling_price = Some(Money::from_pesos(240));
        assert_eq!(it.loss_unit_cost(), Money::from_pesos(240));

        it.cost = Some(Money::zero());
        assert_eq!(it.loss_unit_cost(), Money::from_pesos(240));

        it.cost = Some(Money::from_pesos(180));
        assert_eq!(it.loss_unit_cost(), Money::from_pesos(180));
    }

    #[test]
    fn test_lost_value_only_for_negative_variance() {
        let mut it = item();
        it.cost = Some(Money::from_pesos(100));

        it.inventory_variance = Some(3);
        assert_eq!(it.lost_value(), Money::zero());

        it.inventory_variance = Some(-3);
        assert_eq!(it.lost_value(), Money::from_pesos(300));
    }

    #[test]
    fn test_order_status_parsing() {
        assert_eq!(OrderStatus::parse("Completed"), OrderStatus::Completed);
        assert_eq!(OrderStatus::parse("PENDING"), OrderStatus::Pending);
        assert_eq!(OrderStatus::parse(" cancelled "), OrderStatus::Cancelled);
        assert_eq!(
            OrderStatus::parse("Refunded"),
            OrderStatus::Other("refunded".into())
        );
        assert_eq!(OrderStatus::parse("Refunded").label(), "refunded");
    }

    #[test]
    fn test_order_status_serde_as_label() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");

        let parsed: OrderStatus = serde_json::from_str("\"On Hold\"").unwrap();
        assert_eq!(parsed, OrderStatus::Other("on hold".into()));
    }

    #[test]
    fn test_newest_activity() {
        use chrono::TimeZone;

        let at = |id: &str, secs: Option<i64>| ActivityEvent {
            id: id.into(),
            created_at: secs.and_then(|s| Utc.timestamp_opt(s, 0).single()),
            ..Default::default()
        };
        let events = vec![
            at("undated", None),
            at("old", Some(100)),
            at("new", Some(300)),
            at("mid-a", Some(200)),
            at("mid-b", Some(200)),
        ];

        let ids: Vec<String> = ActivityEvent::newest(&events, 4)
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid-a", "mid-b", "old"]);
        assert_eq!(ActivityEvent::newest(&events, 10).len(), 5);
        assert!(ActivityEvent::newest(&events, 0).is_empty());
    }

    #[test]
    fn test_item_serializes_camel_case() {
        let json = serde_json::to_value(item()).unwrap();
        assert_eq!(json["currentStock"], 4);
        assert_eq!(json["productCode"], "");
    }
}
