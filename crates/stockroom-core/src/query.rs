//! # Inventory Query
//!
//! Search, filters and sorting for the inventory list screen, plus the
//! per-item stock status badge.
//!
//! ```text
//! items ──► search ──► category ──► stock filter ──► sort ──► Vec<&InventoryItem>
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::InventoryItem;

// =============================================================================
// Stock Status
// =============================================================================

/// Badge shown on each inventory card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockStatus {
    /// Classifies an item against its low-stock threshold.
    ///
    /// Zero stock is `OutOfStock`; stock at or below the threshold is
    /// `LowStock`; anything above is `InStock`.
    pub fn of(item: &InventoryItem) -> Self {
        let stock = item.current_stock;
        if stock == 0 {
            StockStatus::OutOfStock
        } else if stock <= item.low_stock_threshold() {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

// =============================================================================
// Filter Options
// =============================================================================

/// Stock filter chip on the inventory screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StockFilter {
    #[default]
    All,
    /// Positive stock at or above the threshold.
    InStock,
    /// Positive stock below the threshold.
    LowStock,
    /// Exactly zero stock.
    OutOfStock,
}

impl StockFilter {
    const NAMES: [&'static str; 4] = ["all", "in_stock", "low_stock", "out_of_stock"];

    /// Whether an item passes the filter.
    pub fn matches(&self, item: &InventoryItem) -> bool {
        let stock = item.current_stock;
        let threshold = item.low_stock_threshold();
        match self {
            StockFilter::All => true,
            StockFilter::InStock => stock >= threshold && stock > 0,
            StockFilter::LowStock => stock > 0 && stock < threshold,
            StockFilter::OutOfStock => stock == 0,
        }
    }
}

impl FromStr for StockFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match normalize(s).as_str() {
            "all" => Ok(StockFilter::All),
            "instock" => Ok(StockFilter::InStock),
            "lowstock" => Ok(StockFilter::LowStock),
            "outofstock" => Ok(StockFilter::OutOfStock),
            _ => Err(CoreError::not_allowed("stock_filter", s, &StockFilter::NAMES)),
        }
    }
}

/// Sort order of the inventory list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SortKey {
    /// Name, A to Z, ignoring case.
    #[default]
    Name,
    /// Highest stock first.
    Stock,
    /// Highest price first.
    Price,
}

impl SortKey {
    const NAMES: [&'static str; 3] = ["name", "stock", "price"];

    fn compare(&self, a: &InventoryItem, b: &InventoryItem) -> Ordering {
        match self {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Stock => b.current_stock.cmp(&a.current_stock),
            SortKey::Price => b.price.cmp(&a.price),
        }
    }
}

impl FromStr for SortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match normalize(s).as_str() {
            "name" => Ok(SortKey::Name),
            "stock" => Ok(SortKey::Stock),
            "price" => Ok(SortKey::Price),
            _ => Err(CoreError::not_allowed("sort", s, &SortKey::NAMES)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SortKey::NAMES[*self as usize])
    }
}

/// Accepts `in_stock`, `inStock`, `In Stock` alike.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

// =============================================================================
// Inventory Query
// =============================================================================

/// The inventory screen's current search/filter/sort state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryQuery {
    /// Case-insensitive substring of name, product code or category.
    /// Empty matches everything.
    pub search: String,
    /// Exact category, `None` for all categories.
    pub category: Option<String>,
    pub stock_filter: StockFilter,
    pub sort: SortKey,
}

impl InventoryQuery {
    /// Applies the query to a snapshot, returning matching items in display
    /// order. Sorting is stable.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::query::{InventoryQuery, StockFilter};
    /// use stockroom_core::InventoryItem;
    ///
    /// let items = vec![
    ///     InventoryItem { name: "Wood Screw".into(), current_stock: 0, ..Default::default() },
    ///     InventoryItem { name: "Wall Plug".into(), current_stock: 9, ..Default::default() },
    /// ];
    /// let query = InventoryQuery {
    ///     search: "w".into(),
    ///     stock_filter: StockFilter::OutOfStock,
    ///     ..Default::default()
    /// };
    /// let hits = query.apply(&items);
    /// assert_eq!(hits.len(), 1);
    /// assert_eq!(hits[0].name, "Wood Screw");
    /// ```
    pub fn apply<'a>(&self, items: &'a [InventoryItem]) -> Vec<&'a InventoryItem> {
        let needle = self.search.trim().to_lowercase();

        let mut hits: Vec<&InventoryItem> = items
            .iter()
            .filter(|item| needle.is_empty() || matches_search(item, &needle))
            .filter(|item| match &self.category {
                None => true,
                Some(category) => item.category.as_ref() == Some(category),
            })
            .filter(|item| self.stock_filter.matches(item))
            .collect();

        hits.sort_by(|a, b| self.sort.compare(a, b));
        hits
    }
}

fn matches_search(item: &InventoryItem, needle: &str) -> bool {
    [
        Some(item.name.as_str()),
        Some(item.product_code.as_str()),
        item.category.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Distinct non-empty categories in first-seen order.
pub fn categories(items: &[InventoryItem]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for category in items.iter().filter_map(InventoryItem::category_label) {
        if !seen.iter().any(|c| c == category) {
            seen.push(category.to_string());
        }
    }
    seen
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn item(
        name: &str,
        code: &str,
        category: Option<&str>,
        stock: i64,
        minimum: i64,
    ) -> InventoryItem {
        InventoryItem {
            id: code.into(),
            name: name.into(),
            product_code: code.into(),
            category: category.map(str::to_string),
            current_stock: stock,
            minimum_stock: minimum,
            ..Default::default()
        }
    }

    fn catalog() -> Vec<InventoryItem> {
        vec![
            item("Paint Roller", "PR-9", Some("Paint"), 12, 5),
            item("angle bracket", "AB-2", Some("Hardware"), 3, 10),
            item("Masonry Drill Bit", "DB-6", Some("Tools"), 0, 4),
            item("Latex Paint 4L", "LP-4", Some("Paint"), 5, 5),
        ]
    }

    fn codes(hits: &[&InventoryItem]) -> Vec<String> {
        hits.iter().map(|i| i.product_code.clone()).collect()
    }

    #[test]
    fn test_stock_status() {
        let items = catalog();
        assert_eq!(StockStatus::of(&items[0]), StockStatus::InStock);
        assert_eq!(StockStatus::of(&items[1]), StockStatus::LowStock);
        assert_eq!(StockStatus::of(&items[2]), StockStatus::OutOfStock);
        // At the threshold is still low.
        assert_eq!(StockStatus::of(&items[3]), StockStatus::LowStock);
    }

    #[test]
    fn test_search_covers_name_code_and_category() {
        let items = catalog();
        let by = |s: &str| {
            let q = InventoryQuery {
                search: s.into(),
                ..Default::default()
            };
            codes(&q.apply(&items))
        };
        assert_eq!(by("drill"), vec!["DB-6"]);
        assert_eq!(by("ab-2"), vec!["AB-2"]);
        assert_eq!(by("PAINT"), vec!["LP-4", "PR-9"]);
        assert_eq!(by("   ").len(), 4);
    }

    #[test]
    fn test_category_filter_is_exact() {
        let items = catalog();
        let q = InventoryQuery {
            category: Some("Paint".into()),
            ..Default::default()
        };
        assert_eq!(codes(&q.apply(&items)), vec!["LP-4", "PR-9"]);

        let q = InventoryQuery {
            category: Some("paint".into()),
            ..Default::default()
        };
        assert!(q.apply(&items).is_empty());
    }

    #[test]
    fn test_stock_filters() {
        let items = catalog();
        let by = |f: StockFilter| {
            let q = InventoryQuery {
                stock_filter: f,
                ..Default::default()
            };
            codes(&q.apply(&items))
        };
        assert_eq!(by(StockFilter::InStock), vec!["LP-4", "PR-9"]);
        assert_eq!(by(StockFilter::LowStock), vec!["AB-2"]);
        assert_eq!(by(StockFilter::OutOfStock), vec!["DB-6"]);
        assert_eq!(by(StockFilter::All).len(), 4);
    }

    #[test]
    fn test_reorder_point_overrides_minimum_in_filters() {
        let mut it = item("Cable Tie", "CT-1", None, 3, 10);
        it.reorder_point = Some(2);
        assert!(StockFilter::InStock.matches(&it));
        assert!(!StockFilter::LowStock.matches(&it));
    }

    #[test]
    fn test_sorting() {
        let mut items = catalog();
        items[0].price = Money::from_pesos(150);
        items[3].price = Money::from_pesos(900);

        let sorted = |s: SortKey| {
            let q = InventoryQuery {
                sort: s,
                ..Default::default()
            };
            codes(&q.apply(&items))
        };
        assert_eq!(sorted(SortKey::Name), vec!["AB-2", "LP-4", "DB-6", "PR-9"]);
        assert_eq!(sorted(SortKey::Stock), vec!["PR-9", "LP-4", "AB-2", "DB-6"]);
        assert_eq!(sorted(SortKey::Price), vec!["LP-4", "PR-9", "AB-2", "DB-6"]);
    }

    #[test]
    fn test_option_parsing() {
        assert_eq!("inStock".parse::<StockFilter>().unwrap(), StockFilter::InStock);
        assert_eq!("out_of_stock".parse::<StockFilter>().unwrap(), StockFilter::OutOfStock);
        assert!("sold".parse::<StockFilter>().is_err());
        assert_eq!("Price".parse::<SortKey>().unwrap(), SortKey::Price);
        assert_eq!(SortKey::Stock.to_string(), "stock");
    }

    #[test]
    fn test_categories_first_seen_order() {
        let mut items = catalog();
        items.push(item("Mystery", "MY-0", Some(""), 1, 0));
        items.push(item("No Category", "NC-0", None, 1, 0));
        assert_eq!(categories(&items), vec!["Paint", "Hardware", "Tools"]);
    }
}
