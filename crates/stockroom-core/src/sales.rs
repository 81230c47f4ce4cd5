//! # Sales Report
//!
//! The numbers behind the "Sales Report" screen: revenue, order counts and
//! breakdowns over a selectable period.
//!
//! ## Period Windows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ReportPeriod      window start (UTC)            orders without date    │
//! │  ─────────────     ──────────────────────────    ───────────────────    │
//! │  All               none (every order)            included               │
//! │  Today             00:00 of now's day            excluded               │
//! │  Week              now - 7 days                  excluded               │
//! │  Month             00:00 on day 1 of now's month excluded               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rankings keep first-seen order on ties, like the metrics aggregator.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Order;
use crate::TOP_RANKING_LIMIT;

// =============================================================================
// Report Period
// =============================================================================

/// Time window of a sales report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ReportPeriod {
    /// Every order ever recorded.
    #[default]
    All,
    /// Since midnight today.
    Today,
    /// The last seven days.
    Week,
    /// Since the first of the current month.
    Month,
}

impl ReportPeriod {
    const NAMES: [&'static str; 4] = ["all", "today", "week", "month"];

    /// Earliest `created_at` included in the period, `None` for [`ReportPeriod::All`].
    pub fn window_start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let midnight = |date: NaiveDate| {
            date.and_hms_opt(0, 0, 0)
                .map(|start| Utc.from_utc_datetime(&start))
        };

        match self {
            ReportPeriod::All => None,
            ReportPeriod::Today => midnight(now.date_naive()),
            ReportPeriod::Week => Some(now - Duration::days(7)),
            ReportPeriod::Month => now.date_naive().with_day(1).and_then(midnight),
        }
    }

    /// Whether an order falls inside the period.
    pub fn contains(&self, order: &Order, now: DateTime<Utc>) -> bool {
        match self.window_start(now) {
            None => true,
            Some(start) => order.created_at.is_some_and(|at| at >= start),
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportPeriod::All => "all",
            ReportPeriod::Today => "today",
            ReportPeriod::Week => "week",
            ReportPeriod::Month => "month",
        };
        f.write_str(name)
    }
}

impl FromStr for ReportPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" | "all_time" => Ok(ReportPeriod::All),
            "today" | "day" => Ok(ReportPeriod::Today),
            "week" => Ok(ReportPeriod::Week),
            "month" => Ok(ReportPeriod::Month),
            other => Err(CoreError::not_allowed(
                "report_period",
                other,
                &ReportPeriod::NAMES,
            )),
        }
    }
}

// =============================================================================
// Report Types
// =============================================================================

/// Quantity and revenue of one product name across order lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductSales {
    pub name: String,
    pub quantity: i64,
    pub revenue: Money,
}

/// Order count and revenue of one customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerSales {
    pub name: String,
    pub orders: usize,
    pub revenue: Money,
}

/// The sales report for one period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesReport {
    pub period: ReportPeriod,
    pub total_revenue: Money,
    pub total_orders: usize,
    /// Zero when there are no orders in the period.
    pub average_order_value: Money,
    /// Orders per lower-case status label.
    pub status_breakdown: BTreeMap<String, usize>,
    /// Revenue per payment method label.
    pub payment_breakdown: BTreeMap<String, Money>,
    /// Top five products by line revenue.
    pub top_products: Vec<ProductSales>,
    /// Top five customers by order revenue.
    pub top_customers: Vec<CustomerSales>,
}

impl SalesReport {
    /// Builds the report for `period` as seen at `now`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use stockroom_core::sales::{ReportPeriod, SalesReport};
    /// use stockroom_core::{Money, Order};
    ///
    /// let orders = vec![
    ///     Order { total: Money::from_pesos(300), ..Default::default() },
    ///     Order { total: Money::from_pesos(100), ..Default::default() },
    /// ];
    /// let report = SalesReport::build(&orders, ReportPeriod::All, Utc::now());
    /// assert_eq!(report.total_orders, 2);
    /// assert_eq!(report.average_order_value, Money::from_pesos(200));
    /// ```
    pub fn build(orders: &[Order], period: ReportPeriod, now: DateTime<Utc>) -> Self {
        let selected: Vec<&Order> = orders.iter().filter(|o| period.contains(o, now)).collect();

        let total_revenue: Money = selected.iter().map(|o| o.total).sum();
        let mut status_breakdown = BTreeMap::new();
        let mut payment_breakdown = BTreeMap::new();
        let mut products = Ranking::default();
        let mut customers = Ranking::default();

        for order in &selected {
            *status_breakdown
                .entry(order.status.label().to_string())
                .or_insert(0) += 1;
            *payment_breakdown
                .entry(order.payment_method.clone())
                .or_insert_with(Money::zero) += order.total;

            for line in &order.items {
                let entry = products.entry(&line.name, || ProductSales {
                    name: line.name.clone(),
                    ..Default::default()
                });
                entry.quantity = entry.quantity.saturating_add(line.quantity);
                entry.revenue += line.line_total();
            }

            let entry = customers.entry(&order.customer_name, || CustomerSales {
                name: order.customer_name.clone(),
                ..Default::default()
            });
            entry.orders += 1;
            entry.revenue += order.total;
        }

        SalesReport {
            period,
            total_revenue,
            total_orders: selected.len(),
            average_order_value: total_revenue.average_over(selected.len()),
            status_breakdown,
            payment_breakdown,
            top_products: products.top_by(|p| p.revenue),
            top_customers: customers.top_by(|c| c.revenue),
        }
    }
}

/// Accumulator that remembers first-seen order for stable rankings.
struct Ranking<T> {
    index: HashMap<String, usize>,
    entries: Vec<T>,
}

impl<T> Default for Ranking<T> {
    fn default() -> Self {
        Ranking {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<T> Ranking<T> {
    fn entry(&mut self, key: &str, init: impl FnOnce() -> T) -> &mut T {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.entries.push(init());
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[slot]
    }

    fn top_by(mut self, revenue: impl Fn(&T) -> Money) -> Vec<T> {
        self.entries.sort_by(|a, b| revenue(b).cmp(&revenue(a)));
        self.entries.truncate(TOP_RANKING_LIMIT);
        self.entries
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderLine, OrderStatus};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn order(total: i64, created_at: Option<DateTime<Utc>>) -> Order {
        Order {
            total: Money::from_pesos(total),
            customer_name: "Walk-in Customer".into(),
            payment_method: "Cash".into(),
            created_at,
            ..Default::default()
        }
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("Today".parse::<ReportPeriod>().unwrap(), ReportPeriod::Today);
        assert_eq!("all".parse::<ReportPeriod>().unwrap(), ReportPeriod::All);
        assert!("year".parse::<ReportPeriod>().is_err());
        assert_eq!(ReportPeriod::Month.to_string(), "month");
    }

    #[test]
    fn test_window_starts() {
        let now = at(2026, 3, 18, 15);
        assert_eq!(ReportPeriod::All.window_start(now), None);
        assert_eq!(ReportPeriod::Today.window_start(now), Some(at(2026, 3, 18, 0)));
        assert_eq!(ReportPeriod::Week.window_start(now), Some(at(2026, 3, 11, 15)));
        assert_eq!(ReportPeriod::Month.window_start(now), Some(at(2026, 3, 1, 0)));
    }

    #[test]
    fn test_period_filtering() {
        let now = at(2026, 3, 18, 15);
        let orders = vec![
            order(10, Some(at(2026, 3, 18, 9))),
            order(20, Some(at(2026, 3, 14, 9))),
            order(40, Some(at(2026, 3, 2, 9))),
            order(80, Some(at(2026, 2, 27, 9))),
            order(160, None),
        ];

        let revenue = |p| SalesReport::build(&orders, p, now).total_revenue;
        assert_eq!(revenue(ReportPeriod::All), Money::from_pesos(310));
        assert_eq!(revenue(ReportPeriod::Today), Money::from_pesos(10));
        assert_eq!(revenue(ReportPeriod::Week), Money::from_pesos(30));
        assert_eq!(revenue(ReportPeriod::Month), Money::from_pesos(70));
    }

    #[test]
    fn test_empty_report() {
        let report = SalesReport::build(&[], ReportPeriod::Week, Utc::now());
        assert_eq!(report.total_orders, 0);
        assert_eq!(report.average_order_value, Money::zero());
        assert!(report.top_products.is_empty());
    }

    #[test]
    fn test_breakdowns() {
        let mut a = order(100, None);
        a.status = OrderStatus::Pending;
        a.payment_method = "GCash".into();
        let b = order(50, None);
        let mut c = order(25, None);
        c.status = OrderStatus::parse("On Hold");

        let report = SalesReport::build(&[a, b, c], ReportPeriod::All, Utc::now());
        assert_eq!(report.status_breakdown["pending"], 1);
        assert_eq!(report.status_breakdown["completed"], 1);
        assert_eq!(report.status_breakdown["on hold"], 1);
        assert_eq!(report.payment_breakdown["GCash"], Money::from_pesos(100));
        assert_eq!(report.payment_breakdown["Cash"], Money::from_pesos(75));
    }

    #[test]
    fn test_top_products_aggregate_lines_by_name() {
        let line = |name: &str, qty: i64, price: i64| OrderLine {
            name: name.into(),
            quantity: qty,
            price: Money::from_pesos(price),
        };
        let mut a = order(0, None);
        a.items = vec![line("Nails 1kg", 2, 80), line("Hinge", 1, 45)];
        let mut b = order(0, None);
        b.items = vec![line("Nails 1kg", 1, 80), line("Sandpaper", 10, 12)];

        let report = SalesReport::build(&[a, b], ReportPeriod::All, Utc::now());
        let top = &report.top_products;
        assert_eq!(top[0].name, "Nails 1kg");
        assert_eq!(top[0].quantity, 3);
        assert_eq!(top[0].revenue, Money::from_pesos(240));
        assert_eq!(top[1].name, "Sandpaper");
        assert_eq!(top[2].name, "Hinge");
    }

    #[test]
    fn test_top_customers_capped() {
        let orders: Vec<Order> = (0..7)
            .map(|i| Order {
                customer_name: format!("customer-{i}"),
                ..order(10 * (i + 1), None)
            })
            .collect();
        let mut repeat = order(5, None);
        repeat.customer_name = "customer-0".into();

        let mut all = orders;
        all.push(repeat);
        let report = SalesReport::build(&all, ReportPeriod::All, Utc::now());

        assert_eq!(report.top_customers.len(), TOP_RANKING_LIMIT);
        assert_eq!(report.top_customers[0].name, "customer-6");
        assert!(report
            .top_customers
            .iter()
            .all(|c| c.name != "customer-0"));
    }

    #[test]
    fn test_customer_order_counts() {
        let mut a = order(30, None);
        a.customer_name = "Mang Jose".into();
        let mut b = order(20, None);
        b.customer_name = "Mang Jose".into();

        let report = SalesReport::build(&[a, b], ReportPeriod::All, Utc::now());
        assert_eq!(report.top_customers[0].orders, 2);
        assert_eq!(report.top_customers[0].revenue, Money::from_pesos(50));
    }
}
