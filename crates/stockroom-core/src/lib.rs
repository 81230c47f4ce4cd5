//! # stockroom-core: Pure Dashboard Logic for Stockroom
//!
//! This crate holds everything the inventory-and-sales dashboard derives on
//! the client side, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Stockroom Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Managed document database (external)               │   │
//! │  │        inventory / orders / activity / stockMovements           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ full-collection snapshots              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockroom-feed (ingest + agent)                 │   │
//! │  │   raw documents ──► typed records ──► DashboardAgent            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ &[InventoryItem], &[Order]             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ stockroom-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │ metrics  │ │  sales   │ │  query   │ │ movement │          │   │
//! │  │   │ compute  │ │ report   │ │ filters  │ │  deltas  │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Typed records (InventoryItem, Order, ActivityEvent, ...)
//! - [`money`] - Money type with integer centavo arithmetic
//! - [`metrics`] - The dashboard metrics aggregator
//! - [`sales`] - Sales report over a period
//! - [`query`] - Inventory list search, filters and sorting
//! - [`movement`] - Stock movement deltas
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Total Functions**: the aggregators never fail; missing numbers are
//!    already zero by the time records reach this crate
//! 2. **No I/O**: listeners, files and logging live in stockroom-feed
//! 3. **Integer Money**: all amounts are centavos (i64)
//! 4. **Recompute From Scratch**: no state survives between calls
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::metrics;
//! use stockroom_core::{InventoryItem, Money, Order};
//!
//! let items = vec![InventoryItem {
//!     price: Money::from_pesos(10),
//!     current_stock: 5,
//!     usage: Some(2),
//!     ..Default::default()
//! }];
//! let orders = vec![Order {
//!     total: Money::from_decimal(150.5),
//!     ..Default::default()
//! }];
//!
//! let stats = metrics::compute(&items, &orders);
//! assert_eq!(stats.total_value, Money::from_pesos(50));
//! assert_eq!(stats.total_sales.centavos(), 15050);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod metrics;
pub mod money;
pub mod movement;
pub mod query;
pub mod sales;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult};
pub use metrics::DerivedStatistics;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of entries kept in every "top N" ranking on the dashboard.
pub const TOP_RANKING_LIMIT: usize = 5;

/// Stock value above which an item counts as "high value" (₱1,000.00).
pub const HIGH_VALUE_THRESHOLD: Money = Money::from_pesos(1_000);

/// Stock value below which an item counts as "low value" (₱100.00).
pub const LOW_VALUE_THRESHOLD: Money = Money::from_pesos(100);
