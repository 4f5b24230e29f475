//! Realtime order synchronization
//!
//! Bridges the backend's per-row change stream to customer and merchant
//! screens without polling.
//!
//! ```text
//! order-sync/
//! ├── config      SyncConfig (debounce window, join settle delay)
//! ├── filter      ChannelFilter (per actor), ViewFilter (per screen)
//! ├── transport   RealtimeTransport trait, MemoryTransport
//! ├── scheduler   RefreshScheduler (coalescing re-fetch timer)
//! ├── merge       OrderList (idempotent merge of pushed rows)
//! └── manager     OrderSyncManager (channel lifecycle + dispatch)
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod manager;
pub mod merge;
pub mod scheduler;
pub mod transport;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use filter::{ChannelFilter, ViewFilter};
pub use manager::{ConnectionState, ListenerGuard, OrderSyncManager, SyncNotice};
pub use merge::{MergeOutcome, OrderList};
pub use scheduler::RefreshScheduler;
pub use transport::{MemoryTransport, RealtimeTransport, Subscription};
