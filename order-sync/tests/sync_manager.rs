use order_sync::{
    ChannelFilter, ConnectionState, ListenerGuard, MemoryTransport, OrderList, OrderSyncManager,
    SyncConfig, SyncNotice, ViewFilter,
};
use shared::Actor;
use shared::order::{FulfillmentMethod, OrderRow, OrderStatus, PaymentMethod, RealtimeChange};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn setup() -> (Arc<MemoryTransport>, OrderSyncManager) {
    let config = SyncConfig::default().with_channel_capacity(64);
    let transport = Arc::new(MemoryTransport::from_config(&config));
    let manager = OrderSyncManager::new(transport.clone(), config);
    (transport, manager)
}

fn listen(manager: &OrderSyncManager) -> (ListenerGuard, mpsc::UnboundedReceiver<SyncNotice>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let guard = manager.register_listener(move |notice| {
        let _ = tx.send(notice.clone());
    });
    (guard, rx)
}

fn row(id: &str, store: &str, customer: &str, status: OrderStatus) -> OrderRow {
    OrderRow {
        id: id.to_string(),
        store_id: Some(store.to_string()),
        customer_id: Some(customer.to_string()),
        status: Some(status),
        payment_method: Some(PaymentMethod::Pix),
        fulfillment_method: Some(FulfillmentMethod::Pickup),
        total_amount: Some(24.9),
        created_at: Some(1_700_000_000_000),
        updated_at: Some(1_700_000_000_000),
        ..Default::default()
    }
}

fn merchant() -> Actor {
    Actor::merchant("m1", vec!["s1".to_string()])
}

/// Collect notices up to and including the first refresh
async fn until_refresh(rx: &mut mpsc::UnboundedReceiver<SyncNotice>) -> Vec<RealtimeChange> {
    let mut changes = Vec::new();
    loop {
        match rx.recv().await {
            Some(SyncNotice::Change(change)) => changes.push(change),
            Some(SyncNotice::Refresh) => return changes,
            None => panic!("listener detached"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_insert_yields_one_entry() {
    let (transport, manager) = setup();
    let (_guard, mut rx) = listen(&manager);
    manager.set_actor(merchant()).await;
    assert_eq!(manager.connection_state(), ConnectionState::Connected);

    let change = RealtimeChange::insert(row("o1", "s1", "c1", OrderStatus::Pending));
    assert_eq!(transport.push(change.clone()), 1);
    transport.push(change);

    let changes = until_refresh(&mut rx).await;
    assert_eq!(changes.len(), 2);

    let mut list = OrderList::default();
    for change in &changes {
        list.apply(change);
    }
    assert_eq!(list.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_burst_coalesces_into_one_refresh() {
    let (transport, manager) = setup();
    let (_guard, mut rx) = listen(&manager);
    manager.set_actor(merchant()).await;

    for id in ["o1", "o2", "o3"] {
        transport.push(RealtimeChange::insert(row(id, "s1", "c1", OrderStatus::Pending)));
    }
    let changes = until_refresh(&mut rx).await;
    assert_eq!(changes.len(), 3);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(rx.try_recv().is_err());

    transport.push(RealtimeChange::insert(row("o4", "s1", "c1", OrderStatus::Pending)));
    let changes = until_refresh(&mut rx).await;
    assert_eq!(changes.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_out_of_view_change_still_refreshes() {
    let (transport, manager) = setup();
    let (_guard, mut rx) = listen(&manager);
    manager.set_actor(merchant()).await;
    manager.set_view(ViewFilter::all().with_status(OrderStatus::Pending));

    transport.push(RealtimeChange::update(
        Some(row("o1", "s1", "c1", OrderStatus::Confirmed)),
        row("o1", "s1", "c1", OrderStatus::Preparing),
    ));

    let changes = until_refresh(&mut rx).await;
    assert!(changes.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_actor_switch_keeps_one_channel() {
    let (transport, manager) = setup();
    let (_guard, mut rx) = listen(&manager);

    manager.set_actor(Actor::customer("c1")).await;
    manager.set_actor(merchant()).await;

    assert_eq!(transport.active_subscriptions(), 1);
    assert_eq!(
        transport.active_filters(),
        vec![ChannelFilter::Stores(vec!["s1".to_string()])]
    );
    assert_eq!(
        transport.subscribed_filters(),
        vec![
            ChannelFilter::Customer("c1".to_string()),
            ChannelFilter::Stores(vec!["s1".to_string()]),
        ]
    );

    // Only the merchant's stores reach the listener now
    transport.push(RealtimeChange::insert(row("o1", "s9", "c1", OrderStatus::Pending)));
    transport.push(RealtimeChange::insert(row("o2", "s1", "c2", OrderStatus::Pending)));
    let changes = until_refresh(&mut rx).await;
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].order_id(), Some("o2"));
}

#[tokio::test(start_paused = true)]
async fn test_same_actor_keeps_channel() {
    let (transport, manager) = setup();
    manager.set_actor(Actor::customer("c1")).await;
    manager.set_actor(Actor::customer("c1")).await;

    assert_eq!(transport.subscribed_filters().len(), 1);
    assert_eq!(
        manager.active_filter().await,
        Some(ChannelFilter::Customer("c1".to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_never_joined_stays_disconnected() {
    let (transport, manager) = setup();
    transport.set_join_on_subscribe(false);
    let mut state = manager.watch_connection();

    manager.set_actor(Actor::customer("c1")).await;
    assert_eq!(manager.connection_state(), ConnectionState::Connecting);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(manager.connection_state(), ConnectionState::Disconnected);
    assert_eq!(*state.borrow_and_update(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_join_within_settle_delay() {
    let (transport, manager) = setup();
    transport.set_join_on_subscribe(false);

    manager.set_actor(Actor::customer("c1")).await;
    transport.join_all();

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(manager.connection_state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_guard_detaches_listener() {
    let (transport, manager) = setup();
    let (guard, mut rx) = listen(&manager);
    manager.set_actor(merchant()).await;
    assert_eq!(manager.listener_count(), 1);

    drop(guard);
    assert_eq!(manager.listener_count(), 0);

    transport.push(RealtimeChange::insert(row("o1", "s1", "c1", OrderStatus::Pending)));
    assert!(rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_uses_same_filter() {
    let (transport, manager) = setup();
    manager.set_actor(merchant()).await;
    manager.reconnect().await;

    let filters = transport.subscribed_filters();
    assert_eq!(filters.len(), 2);
    assert_eq!(filters[0], filters[1]);
    assert_eq!(transport.active_subscriptions(), 1);
    assert_eq!(manager.connection_state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_keeps_pending_refresh() {
    let (transport, manager) = setup();
    let (_guard, mut rx) = listen(&manager);
    manager.set_actor(merchant()).await;

    transport.push(RealtimeChange::insert(row("o1", "s1", "c1", OrderStatus::Pending)));
    match rx.recv().await {
        Some(SyncNotice::Change(change)) => assert_eq!(change.order_id(), Some("o1")),
        other => panic!("expected the pushed change, got {other:?}"),
    }

    manager.reconnect().await;
    let changes = until_refresh(&mut rx).await;
    assert!(changes.is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_actor_switch_drops_pending_refresh() {
    let (transport, manager) = setup();
    let (_guard, mut rx) = listen(&manager);
    manager.set_actor(merchant()).await;

    transport.push(RealtimeChange::insert(row("o1", "s1", "c1", OrderStatus::Pending)));
    assert!(matches!(rx.recv().await, Some(SyncNotice::Change(_))));

    manager.set_actor(Actor::customer("c1")).await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_closed_channel_is_reopened_for_same_actor() {
    let (transport, manager) = setup();
    manager.set_actor(Actor::customer("c1")).await;
    assert_eq!(manager.connection_state(), ConnectionState::Connected);

    transport.close_all();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(manager.connection_state(), ConnectionState::Disconnected);

    manager.set_actor(Actor::customer("c1")).await;
    assert_eq!(transport.subscribed_filters().len(), 2);
    assert_eq!(transport.active_subscriptions(), 1);
    assert_eq!(manager.connection_state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_closed_channel_is_not_reported_joined() {
    let (transport, manager) = setup();
    transport.set_join_on_subscribe(false);
    manager.set_actor(Actor::customer("c1")).await;

    transport.join_all();
    transport.close_all();
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(manager.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_subscribe_failure_degrades_then_recovers() {
    let (transport, manager) = setup();
    transport.set_unavailable(true);

    manager.set_actor(Actor::customer("c1")).await;
    assert_eq!(manager.connection_state(), ConnectionState::Disconnected);
    assert_eq!(manager.active_filter().await, None);

    transport.set_unavailable(false);
    manager.reconnect().await;
    assert_eq!(manager.connection_state(), ConnectionState::Connected);
    assert_eq!(
        transport.active_filters(),
        vec![ChannelFilter::Customer("c1".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_anonymous_has_no_channel() {
    let (transport, manager) = setup();
    manager.set_actor(Actor::Anonymous).await;
    assert!(transport.subscribed_filters().is_empty());
    assert_eq!(manager.connection_state(), ConnectionState::Disconnected);

    manager.set_actor(Actor::customer("c1")).await;
    manager.set_actor(Actor::Anonymous).await;
    assert_eq!(transport.active_subscriptions(), 0);
    assert_eq!(manager.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_channel() {
    let (transport, manager) = setup();
    let (_guard, mut rx) = listen(&manager);
    manager.set_actor(merchant()).await;
    assert!(manager.request_refresh());

    manager.shutdown().await;
    assert_eq!(transport.active_subscriptions(), 0);
    assert_eq!(manager.connection_state(), ConnectionState::Disconnected);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(rx.try_recv().is_err());
}
