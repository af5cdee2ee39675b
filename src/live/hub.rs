use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::live::protocol::Collection;

/// Which records of a collection a listener is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Admin views: every record.
    All,
    /// Worker views: only records owned by this worker, plus shared ones.
    Worker(Uuid),
}

impl Scope {
    fn sees(&self, owner: Option<Uuid>) -> bool {
        match (self, owner) {
            (Scope::All, _) | (_, None) => true,
            (Scope::Worker(id), Some(owner)) => *id == owner,
        }
    }
}

/// Sent to a listener when something in its collection changed. The
/// listener refetches its whole scoped list in response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeNotice {
    pub collection: Collection,
}

#[derive(Debug)]
struct Listener {
    id: u64,
    scope: Scope,
    sender: mpsc::UnboundedSender<ChangeNotice>,
}

/// Fans committed changes out to the live views interested in them.
///
/// Listeners are grouped by collection. A session registers one listener per
/// collection it subscribes to, all feeding the same channel.
pub struct LiveHub {
    listeners: RwLock<HashMap<Collection, Vec<Listener>>>,
    next_id: AtomicU64,
}

impl LiveHub {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener and return its id for [`LiveHub::unsubscribe`].
    pub async fn subscribe(
        &self,
        collection: Collection,
        scope: Scope,
        sender: mpsc::UnboundedSender<ChangeNotice>,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut listeners = self.listeners.write().await;
        listeners.entry(collection).or_default().push(Listener {
            id,
            scope,
            sender,
        });

        id
    }

    pub async fn unsubscribe(&self, collection: Collection, id: u64) {
        let mut listeners = self.listeners.write().await;

        if let Some(group) = listeners.get_mut(&collection) {
            group.retain(|l| l.id != id);
            if group.is_empty() {
                listeners.remove(&collection);
            }
        }
    }

    /// Notify every listener on `collection` that can see a record owned by
    /// `owner`. `None` marks a change visible to everyone (e.g. assignments).
    pub async fn publish(&self, collection: Collection, owner: Option<Uuid>) {
        let notice = ChangeNotice { collection };
        let mut listeners = self.listeners.write().await;

        if let Some(group) = listeners.get_mut(&collection) {
            // A failed send means the session is gone; drop its listener.
            group.retain(|l| !l.scope.sees(owner) || l.sender.send(notice).is_ok());
            if group.is_empty() {
                listeners.remove(&collection);
            }
        }
    }

    pub async fn subscriber_count(&self, collection: Collection) -> usize {
        let listeners = self.listeners.read().await;
        listeners.get(&collection).map(Vec::len).unwrap_or(0)
    }
}

impl Default for LiveHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn worker_only_hears_about_own_records() {
        let hub = LiveHub::new();
        let worker = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.subscribe(Collection::Submissions, Scope::Worker(worker), tx)
            .await;

        hub.publish(Collection::Submissions, Some(Uuid::new_v4()))
            .await;
        assert!(rx.try_recv().is_err());

        hub.publish(Collection::Submissions, Some(worker)).await;
        assert_eq!(
            rx.try_recv().unwrap(),
            ChangeNotice {
                collection: Collection::Submissions
            }
        );
    }

    #[tokio::test]
    async fn admin_and_shared_changes_reach_everyone() {
        let hub = LiveHub::new();
        let (admin_tx, mut admin_rx) = mpsc::unbounded_channel();
        let (worker_tx, mut worker_rx) = mpsc::unbounded_channel();
        hub.subscribe(Collection::Assignments, Scope::All, admin_tx)
            .await;
        hub.subscribe(
            Collection::Assignments,
            Scope::Worker(Uuid::new_v4()),
            worker_tx,
        )
        .await;

        hub.publish(Collection::Assignments, None).await;

        assert!(admin_rx.try_recv().is_ok());
        assert!(worker_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn unsubscribed_and_dropped_listeners_get_nothing() {
        let hub = LiveHub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.subscribe(Collection::Withdrawals, Scope::All, tx).await;
        hub.unsubscribe(Collection::Withdrawals, id).await;

        hub.publish(Collection::Withdrawals, None).await;
        assert!(rx.try_recv().is_err());

        let (tx, rx) = mpsc::unbounded_channel();
        hub.subscribe(Collection::Withdrawals, Scope::All, tx).await;
        drop(rx);
        hub.publish(Collection::Withdrawals, None).await;
        assert_eq!(hub.subscriber_count(Collection::Withdrawals).await, 0);
    }
}
