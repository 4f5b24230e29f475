//! Sync configuration

use std::time::Duration;

/// Realtime sync settings
///
/// | env var | default |
/// |---------|---------|
/// | SYNC_REFRESH_DEBOUNCE_MS | 500 |
/// | SYNC_JOIN_SETTLE_MS | 1000 |
/// | SYNC_CHANNEL_CAPACITY | 256 |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Coalescing window for the re-fetch triggered by pushed changes
    pub refresh_debounce_ms: u64,
    /// Delay before the second joined check
    pub join_settle_ms: u64,
    /// Buffer size of the per-subscription event channel
    pub channel_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_debounce_ms: 500,
            join_settle_ms: 1000,
            channel_capacity: 256,
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            refresh_debounce_ms: env_parse("SYNC_REFRESH_DEBOUNCE_MS")
                .unwrap_or(defaults.refresh_debounce_ms),
            join_settle_ms: env_parse("SYNC_JOIN_SETTLE_MS").unwrap_or(defaults.join_settle_ms),
            channel_capacity: env_parse("SYNC_CHANNEL_CAPACITY")
                .filter(|c| *c > 0)
                .unwrap_or(defaults.channel_capacity),
        }
    }

    pub fn with_refresh_debounce_ms(mut self, ms: u64) -> Self {
        self.refresh_debounce_ms = ms;
        self
    }

    pub fn with_join_settle_ms(mut self, ms: u64) -> Self {
        self.join_settle_ms = ms;
        self
    }

    /// Zero is bumped to 1 (tokio channels reject a zero capacity)
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn refresh_debounce(&self) -> Duration {
        Duration::from_millis(self.refresh_debounce_ms)
    }

    pub fn join_settle(&self) -> Duration {
        Duration::from_millis(self.join_settle_ms)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = SyncConfig::default()
            .with_refresh_debounce_ms(200)
            .with_join_settle_ms(50)
            .with_channel_capacity(0);
        assert_eq!(config.refresh_debounce(), Duration::from_millis(200));
        assert_eq!(config.join_settle(), Duration::from_millis(50));
        assert_eq!(config.channel_capacity, 1);
    }
}
