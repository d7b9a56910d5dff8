use std::time::Duration;

use crate::constants::{
    DEFAULT_DEEP_LINK_REFETCH_DELAY, DEFAULT_DIRECT_FETCH_THROTTLE, DEFAULT_SELF_HEAL_SETTLE,
    DEFAULT_UNREAD_DEBOUNCE,
};

/// Tunable engine configuration. One per authenticated session.
///
/// The defaults mirror the production values; tests shrink them to keep
/// timing-sensitive cases fast.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum interval between two direct-conversation fetches.
    pub direct_fetch_throttle: Duration,
    /// Settle delay between a whole-account resync and the activation retry.
    pub self_heal_settle: Duration,
    /// Delay before the resolver's one-shot directory re-fetch on an empty
    /// directory.
    pub deep_link_refetch_delay: Duration,
    /// Quiet window for unread recomputation after message/read events.
    pub unread_debounce: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            direct_fetch_throttle: DEFAULT_DIRECT_FETCH_THROTTLE,
            self_heal_settle: DEFAULT_SELF_HEAL_SETTLE,
            deep_link_refetch_delay: DEFAULT_DEEP_LINK_REFETCH_DELAY,
            unread_debounce: DEFAULT_UNREAD_DEBOUNCE,
        }
    }
}
