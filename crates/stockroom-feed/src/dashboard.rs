//! # Dashboard Agent
//!
//! Keeps the dashboard view current as collection snapshots arrive.
//!
//! ## Agent Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       DashboardAgent Architecture                       │
//! │                                                                         │
//! │   items feed ──┐                                                        │
//! │   orders feed ─┼──► ┌──────────────────────────────┐                   │
//! │   activity ────┘    │  DashboardAgent (one task)   │                   │
//! │                     │                              │                   │
//! │   DashboardHandle   │  • stores latest snapshots   │   watch channel   │
//! │   ──commands──────► │  • recomputes or marks stale │ ────────────────► │
//! │   Recompute         │  • publishes DashboardView   │  DashboardHandle  │
//! │   Shutdown          └──────────────────────────────┘  .latest()        │
//! │                                                                         │
//! │  RULES:                                                                │
//! │  • a collection not yet delivered counts as empty                      │
//! │  • nothing is published until items or orders have arrived once       │
//! │  • auto_compute off: new snapshots only flag the view as stale         │
//! │  • Shutdown, or both item and order feeds closing, stops the task      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The statistics themselves come from the synchronous
//! [`stockroom_core::metrics::compute`]; this task only decides *when*.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};
use uuid::Uuid;

use stockroom_core::metrics::{self, DerivedStatistics};
use stockroom_core::sales::SalesReport;
use stockroom_core::{ActivityEvent, InventoryItem, Order};

use crate::config::DashboardSettings;
use crate::error::{FeedError, FeedResult};
use crate::source::{Snapshot, SnapshotSubscriber};

// =============================================================================
// Dashboard View
// =============================================================================

/// Everything the dashboard screen renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub statistics: DerivedStatistics,
    pub sales: SalesReport,
    /// Newest activity first.
    pub recent_activity: Vec<ActivityEvent>,
    /// Snapshots arrived after this view was computed.
    pub stale: bool,
    pub computed_at: DateTime<Utc>,
    /// Revision of the item snapshot used, 0 if none had arrived.
    pub items_revision: u64,
    /// Revision of the order snapshot used, 0 if none had arrived.
    pub orders_revision: u64,
}

impl DashboardView {
    /// Computes a fresh view from plain record slices.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use stockroom_core::{InventoryItem, Money};
    /// use stockroom_feed::config::DashboardSettings;
    /// use stockroom_feed::dashboard::DashboardView;
    ///
    /// let items = vec![InventoryItem {
    ///     price: Money::from_pesos(50),
    ///     current_stock: 25,
    ///     ..Default::default()
    /// }];
    /// let settings = DashboardSettings::default();
    /// let view = DashboardView::compute(&items, &[], &[], &settings, Utc::now());
    /// assert_eq!(view.statistics.value_distribution.high.count, 1);
    /// assert!(!view.stale);
    /// ```
    pub fn compute(
        items: &[InventoryItem],
        orders: &[Order],
        activity: &[ActivityEvent],
        settings: &DashboardSettings,
        now: DateTime<Utc>,
    ) -> Self {
        DashboardView {
            statistics: metrics::compute(items, orders),
            sales: SalesReport::build(orders, settings.report_period, now),
            recent_activity: ActivityEvent::newest(activity, settings.activity_limit),
            stale: false,
            computed_at: now,
            items_revision: 0,
            orders_revision: 0,
        }
    }
}

// =============================================================================
// Commands and Handle
// =============================================================================

/// Commands that can be sent to the dashboard agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardCommand {
    /// Recompute from the stored snapshots now.
    Recompute,
    /// Stop the agent.
    Shutdown,
}

/// Handle for reading views from and controlling a running agent.
#[derive(Clone)]
pub struct DashboardHandle {
    session_id: Uuid,
    view_rx: watch::Receiver<Option<Arc<DashboardView>>>,
    cmd_tx: mpsc::Sender<DashboardCommand>,
}

impl DashboardHandle {
    /// Id of the agent run, as logged by the agent.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The latest view, `None` until the first computation.
    pub fn latest(&self) -> Option<Arc<DashboardView>> {
        self.view_rx.borrow().clone()
    }

    /// Waits for the next published view.
    ///
    /// Returns `None` once the agent has stopped.
    pub async fn wait_for_update(&mut self) -> Option<Arc<DashboardView>> {
        loop {
            self.view_rx.changed().await.ok()?;
            if let Some(view) = self.view_rx.borrow_and_update().clone() {
                return Some(view);
            }
        }
    }

    /// Subscribes to view changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<DashboardView>>> {
        self.view_rx.clone()
    }

    /// Asks the agent to recompute now.
    pub async fn recompute(&self) -> FeedResult<()> {
        self.send(DashboardCommand::Recompute).await
    }

    /// Asks the agent to stop.
    pub async fn shutdown(&self) -> FeedResult<()> {
        self.send(DashboardCommand::Shutdown).await
    }

    async fn send(&self, command: DashboardCommand) -> FeedResult<()> {
        self.cmd_tx
            .send(command)
            .await
            .map_err(|_| FeedError::ShuttingDown)
    }
}

// =============================================================================
// Dashboard Agent
// =============================================================================

/// Recomputes the dashboard whenever a collection snapshot arrives.
pub struct DashboardAgent {
    settings: DashboardSettings,
    items: SnapshotSubscriber<InventoryItem>,
    orders: SnapshotSubscriber<Order>,
    activity: Option<SnapshotSubscriber<ActivityEvent>>,
}

impl DashboardAgent {
    /// Creates an agent over the item and order feeds.
    pub fn new(
        settings: DashboardSettings,
        items: SnapshotSubscriber<InventoryItem>,
        orders: SnapshotSubscriber<Order>,
    ) -> Self {
        DashboardAgent {
            settings,
            items,
            orders,
            activity: None,
        }
    }

    /// Adds the activity feed shown under "Recent Activity".
    pub fn with_activity(mut self, activity: SnapshotSubscriber<ActivityEvent>) -> Self {
        self.activity = Some(activity);
        self
    }

    /// Spawns the agent task and returns a handle.
    pub fn start(self) -> DashboardHandle {
        let session_id = Uuid::new_v4();
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (view_tx, view_rx) = watch::channel(None);

        tokio::spawn(self.run(session_id, cmd_rx, view_tx));

        DashboardHandle {
            session_id,
            view_rx,
            cmd_tx,
        }
    }

    /// Main agent loop.
    async fn run(
        self,
        session_id: Uuid,
        mut cmd_rx: mpsc::Receiver<DashboardCommand>,
        view_tx: watch::Sender<Option<Arc<DashboardView>>>,
    ) {
        let DashboardAgent {
            settings,
            mut items,
            mut orders,
            mut activity,
        } = self;

        info!(
            %session_id,
            auto_compute = settings.auto_compute,
            period = %settings.report_period,
            "Dashboard agent started"
        );

        let mut state = DashboardState::new(settings, view_tx);

        // Snapshots delivered before the agent subscribed
        state.items = items.current();
        state.orders = orders.current();
        state.activity = activity.as_mut().and_then(SnapshotSubscriber::current);
        if state.has_data() {
            state.on_snapshot();
        }

        let mut items_open = true;
        let mut orders_open = true;

        loop {
            tokio::select! {
                // Snapshots first: a Recompute queued behind a snapshot must see it
                biased;

                snapshot = items.next(), if items_open => match snapshot {
                    Some(snapshot) => {
                        debug!(
                            revision = snapshot.revision,
                            records = snapshot.len(),
                            "Item snapshot received"
                        );
                        state.items = Some(snapshot);
                        state.on_snapshot();
                    }
                    None => {
                        debug!("Item feed closed");
                        items_open = false;
                    }
                },

                snapshot = orders.next(), if orders_open => match snapshot {
                    Some(snapshot) => {
                        debug!(
                            revision = snapshot.revision,
                            records = snapshot.len(),
                            "Order snapshot received"
                        );
                        state.orders = Some(snapshot);
                        state.on_snapshot();
                    }
                    None => {
                        debug!("Order feed closed");
                        orders_open = false;
                    }
                },

                snapshot = next_activity(&mut activity), if activity.is_some() => match snapshot {
                    Some(snapshot) => {
                        state.activity = Some(snapshot);
                        state.on_snapshot();
                    }
                    None => {
                        debug!("Activity feed closed");
                        activity = None;
                    }
                },

                command = cmd_rx.recv() => match command {
                    Some(DashboardCommand::Recompute) => state.recompute(),
                    Some(DashboardCommand::Shutdown) | None => {
                        info!(%session_id, "Dashboard agent shutting down");
                        break;
                    }
                },
            }

            if !items_open && !orders_open {
                info!(%session_id, "Item and order feeds closed");
                break;
            }
        }

        info!(%session_id, "Dashboard agent stopped");
    }
}

async fn next_activity(
    feed: &mut Option<SnapshotSubscriber<ActivityEvent>>,
) -> Option<Snapshot<ActivityEvent>> {
    match feed {
        Some(feed) => feed.next().await,
        None => std::future::pending().await,
    }
}

// =============================================================================
// Agent State
// =============================================================================

struct DashboardState {
    settings: DashboardSettings,
    items: Option<Snapshot<InventoryItem>>,
    orders: Option<Snapshot<Order>>,
    activity: Option<Snapshot<ActivityEvent>>,
    view_tx: watch::Sender<Option<Arc<DashboardView>>>,
}

impl DashboardState {
    fn new(
        settings: DashboardSettings,
        view_tx: watch::Sender<Option<Arc<DashboardView>>>,
    ) -> Self {
        DashboardState {
            settings,
            items: None,
            orders: None,
            activity: None,
            view_tx,
        }
    }

    /// Statistics only make sense once items or orders have arrived.
    fn has_data(&self) -> bool {
        self.items.is_some() || self.orders.is_some()
    }

    fn on_snapshot(&mut self) {
        if !self.has_data() {
            debug!("Waiting for the first item or order snapshot");
        } else if self.settings.auto_compute {
            self.recompute();
        } else {
            self.mark_stale();
        }
    }

    fn mark_stale(&mut self) {
        self.view_tx.send_if_modified(|slot| match slot {
            Some(view) if !view.stale => {
                Arc::make_mut(view).stale = true;
                debug!("Dashboard view marked stale");
                true
            }
            _ => false,
        });
    }

    fn recompute(&mut self) {
        if !self.has_data() {
            debug!("Recompute requested before any snapshot arrived");
            return;
        }

        let items = records(&self.items);
        let orders = records(&self.orders);
        let activity = records(&self.activity);

        let mut view = DashboardView::compute(items, orders, activity, &self.settings, Utc::now());
        view.items_revision = revision(&self.items);
        view.orders_revision = revision(&self.orders);

        info!(
            items = items.len(),
            orders = orders.len(),
            total_value = %view.statistics.total_value,
            total_sales = %view.statistics.total_sales,
            "Dashboard recomputed"
        );

        self.view_tx.send_replace(Some(Arc::new(view)));
    }
}

/// Records of a snapshot; a collection not yet delivered is empty.
fn records<T>(snapshot: &Option<Snapshot<T>>) -> &[T] {
    match snapshot {
        Some(snapshot) => &snapshot.records,
        None => &[],
    }
}

fn revision<T>(snapshot: &Option<Snapshot<T>>) -> u64 {
    snapshot.as_ref().map_or(0, |s| s.revision)
}

// =============================================================================
// Unit Tests
// =============================================================================
