//! Engine-wide constants.
//!
//! The durations here are the defaults for [`crate::config::EngineConfig`].
//! They are empirically chosen values with no protocol-level meaning; callers
//! and tests override them through configuration.

use std::time::Duration;

/// Minimum interval between two direct-conversation fetches. A call arriving
/// inside the window is silently dropped; the next inbound-message event
/// retries naturally.
pub const DEFAULT_DIRECT_FETCH_THROTTLE: Duration = Duration::from_secs(2);

/// Settle delay after a whole-account resync before retrying an activation,
/// giving membership replication time to land.
pub const DEFAULT_SELF_HEAL_SETTLE: Duration = Duration::from_millis(500);

/// Delay before the deep-link resolver's one-shot directory re-fetch when the
/// directory is still empty at resolution time.
pub const DEFAULT_DEEP_LINK_REFETCH_DELAY: Duration = Duration::from_millis(500);

/// Quiet window applied to unread recomputation after message/read events, so
/// a burst of events produces a single recompute.
pub const DEFAULT_UNREAD_DEBOUNCE: Duration = Duration::from_secs(1);

/// Page size for the two-party channel query behind
/// `refresh_direct_conversations`.
pub const DIRECT_CONVERSATION_PAGE_SIZE: usize = 20;

/// Community channels are provisioned in the messaging service under this ref
/// prefix. A two-member channel whose ref carries it is never a direct
/// conversation.
pub const COMMUNITY_CHANNEL_REF_PREFIX: &str = "community-";

/// Metadata fields whose presence reclassifies a two-member live channel as a
/// community channel. Kept as one list so the exclusion rule is reviewable and
/// testable in a single place.
pub const COMMUNITY_METADATA_SIGNALS: [&str; 4] = [
    "name",
    "category",
    "minimumTierRequired",
    "metadataChannelId",
];
