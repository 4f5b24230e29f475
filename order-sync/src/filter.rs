//! Subscription and view filters
//!
//! `ChannelFilter` scopes the push channel to one actor and is derived from
//! the actor alone, so reconnecting with the same actor always reopens the
//! same channel. `ViewFilter` narrows what a screen shows (status tab, store).

use shared::order::{OrderStatus, RealtimeChange};
use shared::Actor;
use std::fmt;

/// Actor-scoped channel parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelFilter {
    /// `customer_id=eq.<id>`
    Customer(String),
    /// `store_id=in.(<ids>)`
    Stores(Vec<String>),
}

impl ChannelFilter {
    /// Derive the channel for an actor
    ///
    /// Anonymous actors and merchants without stores get no channel.
    pub fn for_actor(actor: &Actor) -> Option<Self> {
        match actor {
            Actor::Anonymous => None,
            Actor::Customer { id } => Some(Self::Customer(id.clone())),
            Actor::Merchant { store_ids, .. } if store_ids.is_empty() => None,
            Actor::Merchant { store_ids, .. } => {
                let mut ids = store_ids.clone();
                ids.sort();
                ids.dedup();
                Some(Self::Stores(ids))
            }
        }
    }

    /// Whether a pushed change belongs to this channel
    pub fn matches(&self, change: &RealtimeChange) -> bool {
        match self {
            Self::Customer(id) => change.customer_id() == Some(id.as_str()),
            Self::Stores(ids) => change
                .store_id()
                .is_some_and(|store| ids.iter().any(|s| s == store)),
        }
    }

    /// Filter expression in the backend's `column=op.value` syntax
    pub fn to_param(&self) -> String {
        match self {
            Self::Customer(id) => format!("customer_id=eq.{id}"),
            Self::Stores(ids) => format!("store_id=in.({})", ids.join(",")),
        }
    }
}

impl fmt::Display for ChannelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_param())
    }
}

/// Current screen filter (status tab + optional store)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub status: Option<OrderStatus>,
    pub store_id: Option<String>,
}

impl ViewFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_store(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = Some(store_id.into());
        self
    }

    /// Whether a change is relevant to this view
    ///
    /// Columns missing from the pushed rows never exclude a change. A status
    /// tab matches when either side of the change carries that status, so an
    /// order leaving the tab is reported as well as one entering it.
    pub fn in_scope(&self, change: &RealtimeChange) -> bool {
        if let Some(store_id) = &self.store_id
            && let Some(changed) = change.store_id()
            && changed != store_id.as_str()
        {
            return false;
        }

        let Some(status) = self.status else {
            return true;
        };
        let statuses: Vec<OrderStatus> = [change.new.as_ref(), change.old.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(|row| row.status)
            .collect();
        statuses.is_empty() || statuses.contains(&status)
    }
}
