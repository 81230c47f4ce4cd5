//! # Snapshot Source
//!
//! Push-based delivery of whole collections. The database listener holds a
//! [`SnapshotPublisher`] per collection and hands it every snapshot it
//! receives; consumers hold a [`SnapshotSubscriber`].
//!
//! ## Delivery Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Last-Write-Wins Snapshots                            │
//! │                                                                         │
//! │  listener ──publish(Vec<T>)──► [ watch slot: Option<Snapshot<T>> ]     │
//! │                                        │                                │
//! │                          ┌─────────────┼─────────────┐                  │
//! │                          ▼             ▼             ▼                  │
//! │                     subscriber    subscriber    subscriber              │
//! │                                                                         │
//! │  • Each snapshot replaces the previous one entirely                    │
//! │  • A slow subscriber skips intermediate snapshots                      │
//! │  • Before the first publish the slot holds None ("not delivered")      │
//! │  • Revisions count up from 1 per publisher                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

// =============================================================================
// Snapshot
// =============================================================================

/// One full delivery of a collection.
#[derive(Debug)]
pub struct Snapshot<T> {
    /// Position of this snapshot in the publisher's sequence, from 1.
    pub revision: u64,
    /// When the publisher received it.
    pub received_at: DateTime<Utc>,
    /// Every record of the collection.
    pub records: Arc<[T]>,
}

// Manual impl: cloning shares the records and needs no `T: Clone`.
impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Snapshot {
            revision: self.revision,
            received_at: self.received_at,
            records: Arc::clone(&self.records),
        }
    }
}

impl<T> Snapshot<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =============================================================================
// Publisher
// =============================================================================

/// Sending side of a collection feed.
pub struct SnapshotPublisher<T> {
    collection: String,
    tx: watch::Sender<Option<Snapshot<T>>>,
}

impl<T> SnapshotPublisher<T> {
    /// Creates a publisher for the named collection.
    pub fn new(collection: impl Into<String>) -> Self {
        let (tx, _) = watch::channel(None);
        SnapshotPublisher {
            collection: collection.into(),
            tx,
        }
    }

    /// Replaces the current snapshot and wakes every subscriber.
    ///
    /// Works with or without live subscribers. Returns the new revision.
    pub fn publish(&self, records: Vec<T>) -> u64 {
        let count = records.len();
        let records: Arc<[T]> = records.into();
        let mut revision = 0;

        self.tx.send_modify(|slot| {
            revision = slot.as_ref().map_or(1, |previous| previous.revision + 1);
            *slot = Some(Snapshot {
                revision,
                received_at: Utc::now(),
                records,
            });
        });

        debug!(
            collection = %self.collection,
            revision,
            records = count,
            "Published snapshot"
        );
        revision
    }

    /// Subscribes to future snapshots. The current snapshot, if any, is
    /// available through [`SnapshotSubscriber::current`].
    pub fn subscribe(&self) -> SnapshotSubscriber<T> {
        SnapshotSubscriber {
            rx: self.tx.subscribe(),
        }
    }

    /// Name of the collection this publisher feeds.
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

// =============================================================================
// Subscriber
// =============================================================================

/// Receiving side of a collection feed. Dropping it cancels the
/// subscription.
pub struct SnapshotSubscriber<T> {
    rx: watch::Receiver<Option<Snapshot<T>>>,
}

impl<T> Clone for SnapshotSubscriber<T> {
    fn clone(&self) -> Self {
        SnapshotSubscriber {
            rx: self.rx.clone(),
        }
    }
}

impl<T> SnapshotSubscriber<T> {
    /// The latest snapshot, `None` if nothing has been delivered yet.
    pub fn latest(&self) -> Option<Snapshot<T>> {
        self.rx.borrow().clone()
    }

    /// Like [`latest`](Self::latest), but also marks the snapshot as seen so
    /// [`next`](Self::next) waits for a newer one.
    pub fn current(&mut self) -> Option<Snapshot<T>> {
        self.rx.borrow_and_update().clone()
    }

    /// Waits for a snapshot newer than the last one seen.
    ///
    /// Returns `None` once the publisher is dropped.
    pub async fn next(&mut self) -> Option<Snapshot<T>> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(snapshot) = self.rx.borrow_and_update().clone() {
                return Some(snapshot);
            }
        }
    }
}

/// Creates a connected publisher and subscriber.
///
/// ## Example
/// ```rust
/// use stockroom_feed::source;
///
/// let (publisher, subscriber) = source::channel::<u32>("inventory");
/// assert!(subscriber.latest().is_none());
///
/// publisher.publish(vec![1, 2, 3]);
/// let snapshot = subscriber.latest().unwrap();
/// assert_eq!(snapshot.revision, 1);
/// assert_eq!(&snapshot.records[..], &[1, 2, 3]);
/// ```
pub fn channel<T>(collection: impl Into<String>) -> (SnapshotPublisher<T>, SnapshotSubscriber<T>) {
    let publisher = SnapshotPublisher::new(collection);
    let subscriber = publisher.subscribe();
    (publisher, subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_next_sees_published_snapshot() {
        let (publisher, mut subscriber) = channel::<&str>("orders");
        publisher.publish(vec!["ord-1"]);

        let snapshot = timeout(Duration::from_secs(5), subscriber.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn test_slow_subscriber_gets_only_latest() {
        let (publisher, mut subscriber) = channel::<u32>("inventory");
        publisher.publish(vec![1]);
        publisher.publish(vec![1, 2]);
        let last = publisher.publish(vec![1, 2, 3]);
        assert_eq!(last, 3);

        let snapshot = subscriber.next().await.unwrap();
        assert_eq!(snapshot.revision, 3);
        assert_eq!(&snapshot.records[..], &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_current_marks_seen() {
        let (publisher, mut subscriber) = channel::<u32>("inventory");
        publisher.publish(vec![7]);

        assert_eq!(subscriber.current().map(|s| s.revision), Some(1));
        // Nothing newer than revision 1 yet
        assert!(timeout(Duration::from_millis(20), subscriber.next()).await.is_err());
    }

    #[tokio::test]
    async fn test_next_returns_none_when_publisher_dropped() {
        let (publisher, mut subscriber) = channel::<u32>("activity");
        drop(publisher);
        assert!(subscriber.next().await.is_none());
    }

    #[test]
    fn test_empty_snapshot_is_a_delivery() {
        let (publisher, subscriber) = channel::<u32>("orders");
        publisher.publish(Vec::new());

        let snapshot = subscriber.latest().unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(publisher.collection(), "orders");
    }
}
