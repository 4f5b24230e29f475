//! OrderSyncManager
//!
//! Keeps exactly one push channel open per process, derived from the current
//! actor. Every pushed change is forwarded to the registered listeners when
//! it is in scope for the current view, and always schedules a debounced
//! re-fetch: pushed rows are a hint to refresh, the re-fetch is what makes
//! the view consistent.
//!
//! ```text
//! set_actor(actor) ──▶ teardown(old) ──▶ subscribe(ChannelFilter::for_actor)
//!                                              │
//!                   ┌──────────────────────────┤
//!                   ▼                          ▼
//!            join monitor                 pump task
//!   (check now, re-check after settle)   change ──▶ listeners (if in view)
//!                   │                          └──▶ RefreshScheduler
//!                   ▼                                    │
//!        watch<ConnectionState>                SyncNotice::Refresh
//! ```

use crate::config::SyncConfig;
use crate::filter::{ChannelFilter, ViewFilter};
use crate::scheduler::RefreshScheduler;
use crate::transport::{RealtimeTransport, Subscription};
use parking_lot::{Mutex, RwLock};
use shared::order::RealtimeChange;
use shared::Actor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const TASK_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// Push channel state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Delivered to listeners
#[derive(Debug, Clone, PartialEq)]
pub enum SyncNotice {
    /// A pushed change in scope for the current view
    Change(RealtimeChange),
    /// Re-fetch the current page
    Refresh,
}

type Listener = Arc<dyn Fn(&SyncNotice) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener)>>,
}

impl Listeners {
    fn add(&self, listener: Listener) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().push((id, listener));
        id
    }

    fn remove(&self, id: u64) {
        self.entries.lock().retain(|(entry, _)| *entry != id);
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Call listeners outside the lock so they may (un)register freely
    fn dispatch(&self, notice: &SyncNotice) {
        let snapshot: Vec<Listener> = self.entries.lock().iter().map(|(_, l)| l.clone()).collect();
        for listener in snapshot {
            listener(notice);
        }
    }
}

/// Registration handle; dropping it detaches the listener
#[must_use = "the listener is detached when the guard is dropped"]
pub struct ListenerGuard {
    id: u64,
    listeners: Weak<Listeners>,
}

impl ListenerGuard {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.remove(self.id);
        }
    }
}

/// The open channel and the tasks serving it
struct ActiveChannel {
    filter: ChannelFilter,
    cancel: CancellationToken,
    pump: JoinHandle<()>,
    monitor: Option<JoinHandle<()>>,
}

impl ActiveChannel {
    /// The pump only exits on teardown or when the transport closes
    fn is_live(&self) -> bool {
        !self.pump.is_finished()
    }
}

pub struct OrderSyncManager {
    transport: Arc<dyn RealtimeTransport>,
    config: SyncConfig,
    actor: RwLock<Actor>,
    view: Arc<RwLock<ViewFilter>>,
    listeners: Arc<Listeners>,
    scheduler: Arc<RefreshScheduler>,
    state: Arc<watch::Sender<ConnectionState>>,
    /// Serializes connect/teardown; holds the open channel
    channel: tokio::sync::Mutex<Option<ActiveChannel>>,
}

impl std::fmt::Debug for OrderSyncManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSyncManager")
            .field("actor", &*self.actor.read())
            .field("state", &self.connection_state())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl OrderSyncManager {
    pub fn new(transport: Arc<dyn RealtimeTransport>, config: SyncConfig) -> Self {
        let listeners = Arc::new(Listeners::default());
        let refresh_listeners = Arc::downgrade(&listeners);
        let scheduler = RefreshScheduler::new(config.refresh_debounce(), move || {
            if let Some(listeners) = refresh_listeners.upgrade() {
                tracing::debug!("Dispatching debounced refresh");
                listeners.dispatch(&SyncNotice::Refresh);
            }
        });
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            transport,
            config,
            actor: RwLock::new(Actor::Anonymous),
            view: Arc::new(RwLock::new(ViewFilter::default())),
            listeners,
            scheduler: Arc::new(scheduler),
            state: Arc::new(state),
            channel: tokio::sync::Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn actor(&self) -> Actor {
        self.actor.read().clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn view(&self) -> ViewFilter {
        self.view.read().clone()
    }

    /// Change the scope used for forwarding pushed changes
    pub fn set_view(&self, view: ViewFilter) {
        tracing::debug!(status = ?view.status, store_id = ?view.store_id, "View filter changed");
        *self.view.write() = view;
    }

    pub fn register_listener(
        &self,
        listener: impl Fn(&SyncNotice) + Send + Sync + 'static,
    ) -> ListenerGuard {
        let id = self.listeners.add(Arc::new(listener));
        ListenerGuard {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Schedule a refresh without a pushed change (e.g. after a local action)
    pub fn request_refresh(&self) -> bool {
        self.scheduler.schedule()
    }

    /// Filter of the open channel, if any
    pub async fn active_filter(&self) -> Option<ChannelFilter> {
        self.channel.lock().await.as_ref().map(|c| c.filter.clone())
    }

    /// Re-derive the channel from a new actor
    ///
    /// The previous channel is fully torn down before the new one is
    /// opened. Setting an actor that maps to the open channel is a no-op.
    pub async fn set_actor(&self, actor: Actor) {
        let mut channel = self.channel.lock().await;
        let filter = ChannelFilter::for_actor(&actor);
        *self.actor.write() = actor;

        if let (Some(open), Some(wanted)) = (channel.as_ref(), filter.as_ref())
            && open.filter == *wanted
            && open.is_live()
        {
            tracing::debug!(filter = %wanted, "Actor unchanged, keeping channel");
            return;
        }

        if let Some(old) = channel.take() {
            tracing::info!(filter = %old.filter, "Actor changed, closing channel");
            self.teardown(old).await;
        }
        // A refresh armed for the previous actor's view no longer applies
        self.scheduler.cancel();

        match filter {
            Some(filter) => *channel = self.connect(filter).await,
            None => {
                tracing::debug!("No channel for anonymous actor");
                self.state.send_replace(ConnectionState::Disconnected);
            }
        }
    }

    /// Tear down and reopen with identical filter parameters
    ///
    /// A pending refresh survives, and one is scheduled once the channel is
    /// back to cover changes pushed while it was down.
    pub async fn reconnect(&self) {
        let mut channel = self.channel.lock().await;
        let actor_filter = ChannelFilter::for_actor(&self.actor());
        let filter = match channel.take() {
            Some(old) => {
                let filter = old.filter.clone();
                self.teardown(old).await;
                Some(filter)
            }
            None => actor_filter,
        };

        match filter {
            Some(filter) => {
                tracing::info!(filter = %filter, "Reconnecting");
                *channel = self.connect(filter).await;
                if channel.is_some() {
                    self.scheduler.schedule();
                }
            }
            None => {
                self.state.send_replace(ConnectionState::Disconnected);
            }
        }
    }

    /// Close the channel and drop any pending refresh
    pub async fn shutdown(&self) {
        let mut channel = self.channel.lock().await;
        if let Some(old) = channel.take() {
            self.teardown(old).await;
        }
        self.scheduler.cancel();
        self.state.send_replace(ConnectionState::Disconnected);
        tracing::info!("Order sync shut down");
    }

    async fn connect(&self, filter: ChannelFilter) -> Option<ActiveChannel> {
        self.state.send_replace(ConnectionState::Connecting);

        let subscription = match self.transport.subscribe(filter.clone()).await {
            Ok(sub) => sub,
            Err(e) => {
                tracing::warn!(filter = %filter, error = %e, "Subscribe failed, live updates disabled");
                self.state.send_replace(ConnectionState::Disconnected);
                return None;
            }
        };

        let cancel = CancellationToken::new();
        let joined = subscription.joined();

        let monitor = if *joined.borrow() {
            self.state.send_replace(ConnectionState::Connected);
            tracing::info!(filter = %filter, "Channel joined");
            None
        } else {
            Some(tokio::spawn(monitor_join(
                filter.clone(),
                joined,
                self.config.join_settle(),
                self.state.clone(),
                cancel.clone(),
            )))
        };

        let pump = tokio::spawn(pump_changes(
            subscription,
            self.view.clone(),
            self.listeners.clone(),
            self.scheduler.clone(),
            self.state.clone(),
            cancel.clone(),
        ));

        Some(ActiveChannel {
            filter,
            cancel,
            pump,
            monitor,
        })
    }

    async fn teardown(&self, channel: ActiveChannel) {
        channel.cancel.cancel();

        if let Some(monitor) = channel.monitor {
            monitor.abort();
            let _ = monitor.await;
        }

        let mut pump = channel.pump;
        match tokio::time::timeout(TASK_SHUTDOWN_TIMEOUT, &mut pump).await {
            Ok(Ok(())) => tracing::debug!(filter = %channel.filter, "Pump task stopped"),
            Ok(Err(e)) if e.is_cancelled() => tracing::debug!("Pump task cancelled"),
            Ok(Err(e)) => tracing::error!(error = %e, "Pump task panicked"),
            Err(_) => {
                tracing::warn!("Pump task did not stop in time, aborting");
                pump.abort();
                let _ = pump.await;
            }
        }

        self.state.send_replace(ConnectionState::Disconnected);
    }
}

impl Drop for OrderSyncManager {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.get_mut().take() {
            channel.cancel.cancel();
            channel.pump.abort();
            if let Some(monitor) = channel.monitor {
                monitor.abort();
            }
        }
    }
}

/// Second joined check after the settle delay
async fn monitor_join(
    filter: ChannelFilter,
    joined: watch::Receiver<bool>,
    settle: Duration,
    state: Arc<watch::Sender<ConnectionState>>,
    cancel: CancellationToken,
) {
    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(settle) => {}
    }
    if cancel.is_cancelled() {
        return;
    }

    if *joined.borrow() {
        tracing::info!(filter = %filter, "Channel joined after settle delay");
        state.send_replace(ConnectionState::Connected);
    } else {
        tracing::warn!(
            filter = %filter,
            settle_ms = settle.as_millis() as u64,
            "SyncDegradation: channel never joined, staying disconnected"
        );
        state.send_replace(ConnectionState::Disconnected);
    }
}

async fn pump_changes(
    mut subscription: Subscription,
    view: Arc<RwLock<ViewFilter>>,
    listeners: Arc<Listeners>,
    scheduler: Arc<RefreshScheduler>,
    state: Arc<watch::Sender<ConnectionState>>,
    cancel: CancellationToken,
) {
    loop {
        let change = tokio::select! {
            _ = cancel.cancelled() => break,
            change = subscription.recv() => change,
        };

        let Some(change) = change else {
            if !cancel.is_cancelled() {
                tracing::warn!(
                    filter = %subscription.filter(),
                    "SyncDegradation: channel closed by transport"
                );
                state.send_replace(ConnectionState::Disconnected);
                // Stops the join monitor from reporting a dead channel as connected
                cancel.cancel();
            }
            break;
        };

        let in_scope = view.read().in_scope(&change);
        tracing::debug!(
            event = %change.event_type,
            order_id = change.order_id().unwrap_or("-"),
            in_scope,
            "Order change received"
        );
        if in_scope {
            listeners.dispatch(&SyncNotice::Change(change));
        }
        scheduler.schedule();
    }

    subscription.unsubscribe();
}
