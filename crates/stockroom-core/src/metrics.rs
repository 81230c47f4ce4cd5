//! # Metrics Aggregator
//!
//! Turns the current item and order snapshots into the numbers shown on the
//! dashboard home screen.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     compute(items, orders)                              │
//! │                                                                         │
//! │   items ──┬──► totals ──────────► total_items, total_value,            │
//! │           │                       out_of_stock, low_stock              │
//! │           ├──► shrinkage ────────► total_lost_amount                    │
//! │           ├──► stock health ─────► optimal / overstocked /              │
//! │           │                       understocked / dead_stock             │
//! │           ├──► value buckets ────► high / medium / low                  │
//! │           ├──► turnover ─────────► turnover_rate (%)                    │
//! │           ├──► categories ───────► count, top category, value by cat.  │
//! │           └──► ranking ──────────► top_performing_items (≤ 5)          │
//! │                                                                         │
//! │   orders ─────► totals ──────────► total_sales                          │
//! │                                                                         │
//! │   Output is a fresh DerivedStatistics every call. Nothing is cached.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totality
//! `compute` has no error path. Records arrive zero-defaulted, money math
//! saturates, and every division is guarded, so any pair of slices
//! (including two empty ones) yields a value.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{InventoryItem, Order};
use crate::{HIGH_VALUE_THRESHOLD, LOW_VALUE_THRESHOLD, TOP_RANKING_LIMIT};

// =============================================================================
// Output Types
// =============================================================================

/// Stock-health bucket counts.
///
/// ## Overlapping Buckets
/// Each bucket is evaluated on its own; they are NOT an exhaustive,
/// mutually exclusive classification and no priority order exists between
/// them. A slow-moving item with `0 < stock < minimum` counts as both
/// `understocked` and `dead_stock`; an item with usage 0 inside its band is
/// both `optimal` and `dead_stock`; an item with stock 0 and a positive
/// minimum is in no bucket at all. Consumers must not assume the counts
/// add up to the number of items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockHealth {
    /// `minimum_stock ≤ stock ≤ effective_maximum`.
    pub optimal: usize,
    /// `stock > effective_maximum`.
    pub overstocked: usize,
    /// `0 < stock < minimum_stock`.
    pub understocked: usize,
    /// `usage == 0` and `stock > 0`.
    pub dead_stock: usize,
}

/// Items in one value band and their summed stock value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValueBucket {
    pub count: usize,
    pub value: Money,
}

impl ValueBucket {
    fn add(&mut self, value: Money) {
        self.count += 1;
        self.value += value;
    }
}

/// Items split by stock value (`price × current_stock`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValueDistribution {
    /// Value above ₱1,000.
    pub high: ValueBucket,
    /// Value from ₱100 to ₱1,000 inclusive.
    pub medium: ValueBucket,
    /// Value below ₱100.
    pub low: ValueBucket,
}

/// One entry of the "Top Performing Items" card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TopItem {
    pub id: String,
    pub name: String,
    /// `price × usage`.
    pub sales: Money,
    /// Current stock on hand.
    pub stock: i64,
}

/// Everything the dashboard derives from one `(items, orders)` pair.
///
/// Has no identity of its own: it is a value, rebuilt from scratch on every
/// snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DerivedStatistics {
    pub total_items: usize,
    /// Σ `price × current_stock`.
    pub total_value: Money,
    /// Items with exactly zero stock.
    pub out_of_stock: usize,
    /// Items with `0 < stock < minimum_stock`.
    pub low_stock: usize,
    /// Σ `order.total`.
    pub total_sales: Money,
    /// Σ over negative variances of `|variance| × loss_unit_cost`.
    pub total_lost_amount: Money,
    pub stock_health: StockHealth,
    pub value_distribution: ValueDistribution,
    /// `Σ usage / average stock × 100`; zero when the average is zero.
    pub turnover_rate: f64,
    /// Up to five items ranked by `price × usage`, highest first.
    pub top_performing_items: Vec<TopItem>,
    /// Σ `price × usage` over all items.
    pub potential_sales: Money,
    /// Mean shelf price; zero with no items.
    pub average_price: Money,
    /// Number of distinct non-empty categories.
    pub category_count: usize,
    /// Category with the highest mean price.
    pub top_category: Option<String>,
    /// Stock value summed per category.
    pub stock_value_by_category: BTreeMap<String, Money>,
}

// =============================================================================
// Aggregator
// =============================================================================

/// Computes the dashboard statistics for the current snapshots.
///
/// Either slice may be empty (for instance when its collection has not
/// delivered a first snapshot yet).
///
/// ## Example
/// ```rust
/// use stockroom_core::metrics::compute;
/// use stockroom_core::{InventoryItem, Money};
///
/// let items = vec![
///     InventoryItem {
///         price: Money::from_pesos(10),
///         current_stock: 5,
///         usage: Some(2),
///         ..Default::default()
///     },
///     InventoryItem {
///         price: Money::from_pesos(100),
///         current_stock: 0,
///         usage: Some(0),
///         ..Default::default()
///     },
/// ];
/// let stats = compute(&items, &[]);
///
/// assert_eq!(stats.total_value, Money::from_pesos(50));
/// assert_eq!(stats.out_of_stock, 1);
/// assert_eq!(stats.top_performing_items[0].sales, Money::from_pesos(20));
/// ```
pub fn compute(items: &[InventoryItem], orders: &[Order]) -> DerivedStatistics {
    let mut stats = DerivedStatistics {
        total_items: items.len(),
        total_sales: orders.iter().map(|o| o.total).sum(),
        ..Default::default()
    };

    let mut total_price = Money::zero();
    let mut total_usage: i128 = 0;
    let mut total_stock: i128 = 0;

    for item in items {
        let stock = item.current_stock;
        let value = item.stock_value();

        stats.total_value += value;
        stats.total_lost_amount += item.lost_value();
        stats.potential_sales += item.sales_value();
        total_price += item.price;
        total_usage += item.usage_or_zero() as i128;
        total_stock += stock as i128;

        if stock == 0 {
            stats.out_of_stock += 1;
        }
        if stock > 0 && stock < item.minimum_stock {
            stats.low_stock += 1;
        }

        classify_health(item, &mut stats.stock_health);

        if value > HIGH_VALUE_THRESHOLD {
            stats.value_distribution.high.add(value);
        } else if value >= LOW_VALUE_THRESHOLD {
            stats.value_distribution.medium.add(value);
        } else {
            stats.value_distribution.low.add(value);
        }

        if let Some(category) = item.category_label() {
            *stats
                .stock_value_by_category
                .entry(category.to_string())
                .or_default() += value;
        }
    }

    stats.average_price = total_price.average_over(items.len());
    stats.turnover_rate = turnover_rate(total_usage, total_stock, items.len());
    stats.category_count = stats.stock_value_by_category.len();
    stats.top_category = top_category_by_average_price(items);
    stats.top_performing_items = top_performing_items(items);

    stats
}

/// Adds one item to every stock-health bucket it satisfies.
fn classify_health(item: &InventoryItem, health: &mut StockHealth) {
    let stock = item.current_stock;
    let minimum = item.minimum_stock;
    let maximum = item.effective_maximum();

    if stock >= minimum && stock <= maximum {
        health.optimal += 1;
    }
    if stock > maximum {
        health.overstocked += 1;
    }
    if stock > 0 && stock < minimum {
        health.understocked += 1;
    }
    if item.usage_or_zero() == 0 && stock > 0 {
        health.dead_stock += 1;
    }
}

/// `Σ usage / (Σ stock / n) × 100`, guarded to zero.
fn turnover_rate(total_usage: i128, total_stock: i128, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let average_stock = total_stock as f64 / count as f64;
    if average_stock <= 0.0 {
        return 0.0;
    }
    total_usage as f64 / average_stock * 100.0
}

/// Category whose items have the highest mean price.
///
/// Ties keep the category seen first in the snapshot.
fn top_category_by_average_price(items: &[InventoryItem]) -> Option<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut sums: HashMap<&str, (i128, i128)> = HashMap::new();

    for item in items {
        let Some(category) = item.category_label() else {
            continue;
        };
        let entry = sums.entry(category).or_insert_with(|| {
            order.push(category);
            (0, 0)
        });
        entry.0 += item.price.centavos() as i128;
        entry.1 += 1;
    }

    let mut best: Option<(&str, f64)> = None;
    for category in order {
        let (sum, count) = sums[category];
        let mean = sum as f64 / count as f64;
        if best.map_or(true, |(_, top)| mean > top) {
            best = Some((category, mean));
        }
    }
    best.map(|(category, _)| category.to_string())
}

/// Top items by `price × usage`, highest first.
///
/// The sort is stable: ties keep their snapshot order.
fn top_performing_items(items: &[InventoryItem]) -> Vec<TopItem> {
    let mut ranked: Vec<&InventoryItem> = items.iter().collect();
    ranked.sort_by(|a, b| b.sales_value().cmp(&a.sales_value()));

    ranked
        .into_iter()
        .take(TOP_RANKING_LIMIT)
        .map(|item| TopItem {
            id: item.id.clone(),
            name: item.name.clone(),
            sales: item.sales_value(),
            stock: item.current_stock,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
