//! Push channel abstraction
//!
//! ```text
//! RealtimeTransport::subscribe(filter)
//!          │
//!          ▼
//!   Subscription ── joined: watch<bool>
//!                ── events: mpsc<RealtimeChange>
//!                └─ unsubscribe (CancellationToken, also on drop)
//! ```
//!
//! `MemoryTransport` is the in-process implementation: changes pushed into a
//! `broadcast` channel are forwarded to each subscription whose filter
//! matches.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::filter::ChannelFilter;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared::order::RealtimeChange;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// An open, actor-scoped channel
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    filter: ChannelFilter,
    joined: watch::Receiver<bool>,
    events: mpsc::Receiver<RealtimeChange>,
    cancel: CancellationToken,
}

impl Subscription {
    pub fn new(
        id: u64,
        filter: ChannelFilter,
        joined: watch::Receiver<bool>,
        events: mpsc::Receiver<RealtimeChange>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            filter,
            joined,
            events,
            cancel,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn filter(&self) -> &ChannelFilter {
        &self.filter
    }

    pub fn is_joined(&self) -> bool {
        *self.joined.borrow()
    }

    /// Receiver tracking the joined flag
    pub fn joined(&self) -> watch::Receiver<bool> {
        self.joined.clone()
    }

    /// Next change, or `None` once the channel is closed
    pub async fn recv(&mut self) -> Option<RealtimeChange> {
        tokio::select! {
            _ = self.cancel.cancelled() => None,
            change = self.events.recv() => change,
        }
    }

    pub fn unsubscribe(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!(subscription = self.id, filter = %self.filter, "Unsubscribing");
            self.cancel.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Backend push mechanism
#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    async fn subscribe(&self, filter: ChannelFilter) -> SyncResult<Subscription>;
}

#[async_trait]
impl<T: RealtimeTransport + ?Sized> RealtimeTransport for Arc<T> {
    async fn subscribe(&self, filter: ChannelFilter) -> SyncResult<Subscription> {
        (**self).subscribe(filter).await
    }
}

struct ChannelEntry {
    filter: ChannelFilter,
    cancel: CancellationToken,
    joined: watch::Sender<bool>,
}

/// In-process transport backed by a `broadcast` channel
pub struct MemoryTransport {
    tx: broadcast::Sender<RealtimeChange>,
    capacity: usize,
    join_on_subscribe: AtomicBool,
    unavailable: AtomicBool,
    next_id: AtomicU64,
    channels: Mutex<HashMap<u64, ChannelEntry>>,
    history: Mutex<Vec<ChannelFilter>>,
}

impl std::fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransport")
            .field("capacity", &self.capacity)
            .field("active", &self.active_subscriptions())
            .finish()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl MemoryTransport {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            capacity,
            join_on_subscribe: AtomicBool::new(true),
            unavailable: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            channels: Mutex::new(HashMap::new()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Size the broadcast and per-subscription buffers from the sync settings
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.channel_capacity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Publish a change; returns how many open channels received it
    pub fn push(&self, change: RealtimeChange) -> usize {
        self.tx.send(change).unwrap_or(0)
    }

    /// Whether new subscriptions report joined straight away
    pub fn set_join_on_subscribe(&self, join: bool) {
        self.join_on_subscribe.store(join, Ordering::SeqCst);
    }

    /// Make subsequent subscribe calls fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Mark every open channel as joined
    pub fn join_all(&self) {
        for entry in self.channels.lock().values() {
            entry.joined.send_replace(true);
        }
    }

    /// Close every open channel from the transport side
    pub fn close_all(&self) {
        for entry in self.channels.lock().values() {
            entry.cancel.cancel();
        }
    }

    /// Open (not yet unsubscribed) channels
    pub fn active_subscriptions(&self) -> usize {
        let mut channels = self.channels.lock();
        channels.retain(|_, entry| !entry.cancel.is_cancelled());
        channels.len()
    }

    /// Filters of open channels
    pub fn active_filters(&self) -> Vec<ChannelFilter> {
        let mut channels = self.channels.lock();
        channels.retain(|_, entry| !entry.cancel.is_cancelled());
        channels.values().map(|entry| entry.filter.clone()).collect()
    }

    /// Every filter ever subscribed, in order
    pub fn subscribed_filters(&self) -> Vec<ChannelFilter> {
        self.history.lock().clone()
    }
}

#[async_trait]
impl RealtimeTransport for MemoryTransport {
    async fn subscribe(&self, filter: ChannelFilter) -> SyncResult<Subscription> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SyncError::Unavailable("memory transport offline".to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let cancel = CancellationToken::new();
        let (joined_tx, joined_rx) = watch::channel(self.join_on_subscribe.load(Ordering::SeqCst));
        let (events_tx, events_rx) = mpsc::channel(self.capacity);
        let mut rx = self.tx.subscribe();

        self.channels.lock().insert(
            id,
            ChannelEntry {
                filter: filter.clone(),
                cancel: cancel.clone(),
                joined: joined_tx,
            },
        );
        self.history.lock().push(filter.clone());

        let forward_filter = filter.clone();
        let token = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(change) => {
                            if !forward_filter.matches(&change) {
                                continue;
                            }
                            if events_tx.send(change).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(subscription = id, skipped = n, "Subscriber lagged, changes dropped");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
            tracing::debug!(subscription = id, "Forwarding task stopped");
        });

        tracing::debug!(subscription = id, filter = %filter, "Channel opened");
        Ok(Subscription::new(id, filter, joined_rx, events_rx, cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderRow;

    fn insert(id: &str, customer: &str) -> RealtimeChange {
        RealtimeChange::insert(OrderRow {
            id: id.to_string(),
            customer_id: Some(customer.to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_forwards_matching_changes() {
        let transport = MemoryTransport::new(16);
        let mut sub = transport
            .subscribe(ChannelFilter::Customer("c1".into()))
            .await
            .unwrap();
        assert!(sub.is_joined());

        transport.push(insert("o1", "c2"));
        transport.push(insert("o2", "c1"));

        let change = sub.recv().await.unwrap();
        assert_eq!(change.order_id(), Some("o2"));
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let transport = MemoryTransport::new(16);
        let sub = transport
            .subscribe(ChannelFilter::Stores(vec!["s1".into()]))
            .await
            .unwrap();
        assert_eq!(transport.active_subscriptions(), 1);

        drop(sub);
        assert_eq!(transport.active_subscriptions(), 0);
        assert_eq!(transport.subscribed_filters().len(), 1);
    }

    #[tokio::test]
    async fn test_join_control() {
        let transport = MemoryTransport::new(16);
        transport.set_join_on_subscribe(false);
        let sub = transport
            .subscribe(ChannelFilter::Customer("c1".into()))
            .await
            .unwrap();
        assert!(!sub.is_joined());

        transport.join_all();
        assert!(sub.is_joined());
    }

    #[test]
    fn test_capacity_from_config() {
        let config = SyncConfig::default().with_channel_capacity(8);
        assert_eq!(MemoryTransport::from_config(&config).capacity(), 8);
    }

    #[tokio::test]
    async fn test_close_all_ends_stream() {
        let transport = MemoryTransport::new(16);
        let mut sub = transport
            .subscribe(ChannelFilter::Customer("c1".into()))
            .await
            .unwrap();
        transport.close_all();
        assert!(sub.recv().await.is_none());
        assert_eq!(transport.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let transport = MemoryTransport::new(16);
        transport.set_unavailable(true);
        let err = transport
            .subscribe(ChannelFilter::Customer("c1".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Unavailable(_)));
        assert_eq!(transport.active_subscriptions(), 0);
    }
}
