//! # Stock Ledger
//!
//! Applies stock movement documents to item stock levels.
//!
//! ## Movement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Movement Application                           │
//! │                                                                         │
//! │  stockMovements doc ──► StockMovement ──► resolve item                  │
//! │                                            │                            │
//! │                       itemId ──────────────┤                            │
//! │                       productCode lookup ──┘                            │
//! │                                            │ unresolved → warn, skip    │
//! │                                            ▼                            │
//! │                       StockLedger::increment_stock(id, ±quantity)       │
//! │                                                                         │
//! │  INCREMENTS, NOT WRITES:                                               │
//! │  • current_stock += delta happens atomically in the store              │
//! │  • concurrent movements never overwrite each other                     │
//! │  • the new level comes back through the next inventory snapshot        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::future::Future;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use stockroom_core::movement::resolve_item_id;
use stockroom_core::{InventoryItem, StockMovement};

use crate::error::{FeedError, FeedResult};

// =============================================================================
// Ledger Trait
// =============================================================================

/// Atomic stock adjustment against the store that owns the items.
pub trait StockLedger: Send + Sync {
    /// Adds `delta` to the item's `current_stock` in one atomic step and
    /// returns the new level.
    fn increment_stock(
        &self,
        item_id: &str,
        delta: i64,
    ) -> impl Future<Output = FeedResult<i64>> + Send;
}

// =============================================================================
// In-Memory Ledger
// =============================================================================

/// Ledger held in process memory. Backs the offline report and tests.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    stock: RwLock<HashMap<String, i64>>,
}

impl MemoryLedger {
    /// Seeds the ledger with the stock levels of an item snapshot.
    pub fn from_items(items: &[InventoryItem]) -> Self {
        let stock = items
            .iter()
            .map(|item| (item.id.clone(), item.current_stock))
            .collect();
        MemoryLedger {
            stock: RwLock::new(stock),
        }
    }

    /// Current level of an item, `None` if unknown.
    pub async fn stock(&self, item_id: &str) -> Option<i64> {
        self.stock.read().await.get(item_id).copied()
    }

    /// Copies the ledger's levels onto a snapshot of items.
    pub async fn apply_to(&self, items: &mut [InventoryItem]) {
        let stock = self.stock.read().await;
        for item in items.iter_mut() {
            if let Some(level) = stock.get(&item.id) {
                item.current_stock = *level;
            }
        }
    }
}

impl StockLedger for MemoryLedger {
    async fn increment_stock(&self, item_id: &str, delta: i64) -> FeedResult<i64> {
        let mut stock = self.stock.write().await;
        let level = stock
            .get_mut(item_id)
            .ok_or_else(|| FeedError::UnknownItem(item_id.to_string()))?;
        *level = level.saturating_add(delta);
        Ok(*level)
    }
}

// =============================================================================
// Movement Applier
// =============================================================================

/// Outcome of one [`MovementApplier::apply`] batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Movements the ledger accepted.
    pub applied: usize,
    /// Movements that named no known item.
    pub unresolved: usize,
    /// Movements the ledger refused.
    pub failed: usize,
}

/// Resolves movements against the latest item snapshot and applies their
/// deltas through a [`StockLedger`].
pub struct MovementApplier<L> {
    ledger: L,
}

impl<L: StockLedger> MovementApplier<L> {
    pub fn new(ledger: L) -> Self {
        MovementApplier { ledger }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Applies a batch of newly added or modified movements, in order.
    ///
    /// Never stops early: each movement is resolved and applied on its own,
    /// and failures are logged and counted.
    pub async fn apply(
        &self,
        movements: &[StockMovement],
        items: &[InventoryItem],
    ) -> ApplySummary {
        let mut summary = ApplySummary::default();

        for movement in movements {
            let Some(item_id) = resolve_item_id(movement, items) else {
                warn!(
                    product_code = ?movement.product_code,
                    "Stock movement matches no inventory item"
                );
                summary.unresolved += 1;
                continue;
            };

            let delta = movement.delta();
            match self.ledger.increment_stock(item_id, delta).await {
                Ok(level) => {
                    debug!(item_id, delta, level, "Stock movement applied");
                    summary.applied += 1;
                }
                Err(FeedError::UnknownItem(id)) => {
                    warn!(item_id = %id, delta, "Stock movement names an unknown item");
                    summary.unresolved += 1;
                }
                Err(e) => {
                    error!(
                        item_id,
                        delta,
                        error = %e,
                        retryable = e.is_retryable(),
                        "Failed to apply stock movement"
                    );
                    summary.failed += 1;
                }
            }
        }

        if !movements.is_empty() {
            info!(
                applied = summary.applied,
                unresolved = summary.unresolved,
                failed = summary.failed,
                "Stock movements processed"
            );
        }
        summary
    }
}
