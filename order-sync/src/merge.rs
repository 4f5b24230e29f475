//! Idempotent client-side merge of pushed changes
//!
//! Applying the same change twice leaves the list as applying it once:
//! inserts skip ids already present, updates replace by id or no-op, deletes
//! filter by id. Updates that would move an order backwards are dropped.

use shared::order::{ChangeEventType, OrderListItem, RealtimeChange};

/// What a merge did to the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Updated,
    Removed,
    /// Duplicate delivery, unknown id, or a row too sparse to list
    Unchanged,
    /// Inbound status older than the one held
    StaleStatus,
}

impl MergeOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Inserted | Self::Updated | Self::Removed)
    }
}

/// A synchronized page of orders, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderList {
    items: Vec<OrderListItem>,
}

impl OrderList {
    pub fn new(items: Vec<OrderListItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[OrderListItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&OrderListItem> {
        self.items.iter().find(|o| o.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Swap in the result of a full re-fetch
    pub fn replace_all(&mut self, items: Vec<OrderListItem>) {
        self.items = items;
    }

    pub fn apply(&mut self, change: &RealtimeChange) -> MergeOutcome {
        let Some(row) = change.row() else {
            return MergeOutcome::Unchanged;
        };

        match change.event_type {
            ChangeEventType::Insert => {
                if self.contains(&row.id) {
                    return MergeOutcome::Unchanged;
                }
                match OrderListItem::from_row(row) {
                    Some(item) => {
                        self.items.insert(0, item);
                        MergeOutcome::Inserted
                    }
                    None => MergeOutcome::Unchanged,
                }
            }
            ChangeEventType::Update => {
                let Some(existing) = self.items.iter_mut().find(|o| o.id == row.id) else {
                    return MergeOutcome::Unchanged;
                };
                if let Some(incoming) = row.status
                    && existing.status.is_regression(incoming)
                {
                    tracing::debug!(
                        order_id = %row.id,
                        current = %existing.status,
                        incoming = %incoming,
                        "Ignoring status regression"
                    );
                    return MergeOutcome::StaleStatus;
                }
                let before = existing.clone();
                existing.apply_row(row);
                if *existing == before {
                    MergeOutcome::Unchanged
                } else {
                    MergeOutcome::Updated
                }
            }
            ChangeEventType::Delete => {
                let before = self.items.len();
                self.items.retain(|o| o.id != row.id);
                if self.items.len() < before {
                    MergeOutcome::Removed
                } else {
                    MergeOutcome::Unchanged
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{FulfillmentMethod, OrderRow, OrderStatus, PaymentMethod};

    fn row(id: &str, status: OrderStatus) -> OrderRow {
        OrderRow {
            id: id.to_string(),
            store_id: Some("s1".into()),
            customer_id: Some("c1".into()),
            status: Some(status),
            payment_method: Some(PaymentMethod::Pix),
            fulfillment_method: Some(FulfillmentMethod::Delivery),
            total_amount: Some(24.9),
            created_at: Some(1_700_000_000_000),
            updated_at: Some(1_700_000_000_000),
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_insert() {
        let mut list = OrderList::default();
        let change = RealtimeChange::insert(row("o1", OrderStatus::Pending));
        assert_eq!(list.apply(&change), MergeOutcome::Inserted);
        assert_eq!(list.apply(&change), MergeOutcome::Unchanged);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_insert_prepends() {
        let mut list = OrderList::default();
        list.apply(&RealtimeChange::insert(row("o1", OrderStatus::Pending)));
        list.apply(&RealtimeChange::insert(row("o2", OrderStatus::Pending)));
        let ids: Vec<&str> = list.items().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["o2", "o1"]);
    }

    #[test]
    fn test_sparse_insert_is_skipped() {
        let mut list = OrderList::default();
        let change = RealtimeChange::insert(OrderRow {
            id: "o1".into(),
            ..Default::default()
        });
        assert_eq!(list.apply(&change), MergeOutcome::Unchanged);
        assert!(list.is_empty());
    }

    #[test]
    fn test_update_replaces_or_noops() {
        let mut list = OrderList::default();
        let update = RealtimeChange::update(None, row("o1", OrderStatus::Confirmed));
        assert_eq!(list.apply(&update), MergeOutcome::Unchanged);
        assert!(list.is_empty());

        list.apply(&RealtimeChange::insert(row("o1", OrderStatus::Pending)));
        assert_eq!(list.apply(&update), MergeOutcome::Updated);
        assert_eq!(list.apply(&update), MergeOutcome::Unchanged);
        assert_eq!(list.get("o1").unwrap().status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_update_ignores_regression() {
        let mut list = OrderList::new(vec![]);
        list.apply(&RealtimeChange::insert(row("o1", OrderStatus::Ready)));

        let late = RealtimeChange::update(None, row("o1", OrderStatus::Confirmed));
        assert_eq!(list.apply(&late), MergeOutcome::StaleStatus);
        assert_eq!(list.get("o1").unwrap().status, OrderStatus::Ready);

        let cancel = RealtimeChange::update(None, row("o1", OrderStatus::Cancelled));
        assert_eq!(list.apply(&cancel), MergeOutcome::Updated);
    }

    #[test]
    fn test_delete_filters_by_id() {
        let mut list = OrderList::default();
        list.apply(&RealtimeChange::insert(row("o1", OrderStatus::Pending)));
        list.apply(&RealtimeChange::insert(row("o2", OrderStatus::Pending)));

        let delete = RealtimeChange::delete(OrderRow {
            id: "o1".into(),
            ..Default::default()
        });
        assert_eq!(list.apply(&delete), MergeOutcome::Removed);
        assert_eq!(list.apply(&delete), MergeOutcome::Unchanged);
        assert!(!list.contains("o1"));
        assert!(list.contains("o2"));
    }
}
