//! # stockroom-feed: Live Record Feed for Stockroom
//!
//! This crate turns the remote inventory, order and activity collections into
//! a dashboard that stays current while the listeners deliver snapshots.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Feed Architecture                                │
//! │                                                                         │
//! │  database listener (external)                                          │
//! │        │ raw documents                                                  │
//! │        ▼                                                                │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────────────┐  │
//! │  │    ingest      │──►│    source      │──►│   DashboardAgent       │  │
//! │  │                │   │                │   │                        │  │
//! │  │ JSON → typed   │   │ watch-backed   │   │ metrics::compute on    │  │
//! │  │ records, zero- │   │ full-snapshot  │   │ every snapshot, view   │  │
//! │  │ defaulted      │   │ publisher      │   │ published via watch    │  │
//! │  └────────────────┘   └────────────────┘   └────────────────────────┘  │
//! │                                                                         │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────────────┐  │
//! │  │    ledger      │   │    config      │   │  stockroom-report      │  │
//! │  │                │   │                │   │                        │  │
//! │  │ movements →    │   │ TOML + env     │   │ offline report over    │  │
//! │  │ atomic stock   │   │ overrides      │   │ snapshot files         │  │
//! │  │ increments     │   │                │   │                        │  │
//! │  └────────────────┘   └────────────────┘   └────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Feed configuration (store, collections, dashboard, report)
//! - [`dashboard`] - `DashboardAgent`, its handle and the `DashboardView`
//! - [`error`] - Feed error types
//! - [`ingest`] - Document coercion into stockroom-core records
//! - [`ledger`] - Stock ledger seam and movement application
//! - [`source`] - Snapshot publisher/subscriber
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_feed::{ingest, source, DashboardAgent, FeedConfig};
//!
//! let config = FeedConfig::load(None)?;
//! let (items_tx, items_rx) = source::channel(config.collections.inventory.clone());
//! let (orders_tx, orders_rx) = source::channel(config.collections.orders.clone());
//!
//! let mut handle = DashboardAgent::new(config.dashboard.clone(), items_rx, orders_rx).start();
//!
//! // from the database listener
//! items_tx.publish(ingest::ingest_item_collection(&docs));
//!
//! if let Some(view) = handle.wait_for_update().await {
//!     println!("Stock value: {}", view.statistics.total_value);
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod dashboard;
pub mod error;
pub mod ingest;
pub mod ledger;
pub mod source;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{DashboardSettings, FeedConfig};
pub use dashboard::{DashboardAgent, DashboardCommand, DashboardHandle, DashboardView};
pub use error::{FeedError, FeedResult};
pub use ledger::{ApplySummary, MemoryLedger, MovementApplier, StockLedger};
pub use source::{Snapshot, SnapshotPublisher, SnapshotSubscriber};
