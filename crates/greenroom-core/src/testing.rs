//! In-memory fakes for the two service seams, plus builders shared across
//! the test modules. Compiled for tests only.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::messaging::{ChannelQuery, MessagingApi, MessagingError};
use crate::metadata::{CommunityWithChannels, MetadataApi, MetadataError};
use crate::models::{
    ChannelKind, ChannelRecord, ChannelRef, Community, LiveChannel, LiveChannelMetadata,
    MemberInfo,
};

/// Shrunken durations so timing-sensitive tests stay fast.
pub(crate) fn fast_config() -> EngineConfig {
    EngineConfig {
        direct_fetch_throttle: Duration::from_millis(50),
        self_heal_settle: Duration::from_millis(5),
        deep_link_refetch_delay: Duration::from_millis(10),
        unread_debounce: Duration::from_millis(20),
    }
}

pub(crate) fn engine_with(metadata: Arc<FakeMetadata>, messaging: Arc<FakeMessaging>) -> Engine {
    Engine::new(fast_config(), metadata, messaging, "creator-1").unwrap()
}

// ===== Metadata fake =====

#[derive(Default)]
pub(crate) struct FakeMetadata {
    /// What `communities_with_channels` answers.
    pub(crate) directory: Mutex<Vec<CommunityWithChannels>>,
    /// Swapped into `directory` by the next `resync_account`, modelling a
    /// repair that lands server-side.
    pub(crate) directory_after_resync: Mutex<Option<Vec<CommunityWithChannels>>>,
    pub(crate) fail_fetch: AtomicBool,
    pub(crate) fail_sync: AtomicBool,
    /// Provisioned linkage per channel id; absent means the sync endpoint
    /// answers without a ref.
    pub(crate) sync_refs: Mutex<HashMap<String, ChannelRef>>,

    pub(crate) fetch_calls: AtomicUsize,
    pub(crate) sync_calls: AtomicUsize,
    pub(crate) resync_calls: AtomicUsize,
}

pub(crate) fn fake_metadata(directory: Vec<CommunityWithChannels>) -> Arc<FakeMetadata> {
    Arc::new(FakeMetadata {
        directory: Mutex::new(directory),
        ..FakeMetadata::default()
    })
}

#[async_trait]
impl MetadataApi for FakeMetadata {
    async fn communities_with_channels(
        &self,
    ) -> Result<Vec<CommunityWithChannels>, MetadataError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(MetadataError::Transport {
                message: "connection refused".to_string(),
            });
        }
        Ok(self.directory.lock().clone())
    }

    async fn sync_channel(&self, channel_id: &str) -> Result<Option<ChannelRef>, MetadataError> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sync.load(Ordering::SeqCst) {
            return Err(MetadataError::Transport {
                message: "connection refused".to_string(),
            });
        }
        Ok(self.sync_refs.lock().get(channel_id).cloned())
    }

    async fn resync_account(&self) -> Result<(), MetadataError> {
        self.resync_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(repaired) = self.directory_after_resync.lock().take() {
            *self.directory.lock() = repaired;
        }
        Ok(())
    }
}

// ===== Messaging fake =====

#[derive(Default)]
pub(crate) struct FakeMessaging {
    /// Channels that exist in the live service, by ref.
    pub(crate) live: Mutex<HashMap<ChannelRef, LiveChannel>>,
    /// Scripted watch failures per ref, consumed front-first before `live`
    /// is consulted.
    pub(crate) watch_errors: Mutex<HashMap<ChannelRef, Vec<MessagingError>>>,
    /// What `query_channels` answers.
    pub(crate) query_results: Mutex<Vec<LiveChannel>>,
    /// Scripted query failures, consumed front-first.
    pub(crate) query_errors: Mutex<Vec<MessagingError>>,
    /// Local cache snapshot behind `watched_channels`.
    pub(crate) watched: Mutex<Vec<LiveChannel>>,

    pub(crate) watch_delay: Mutex<Duration>,
    pub(crate) query_delay: Mutex<Duration>,

    pub(crate) query_calls: AtomicUsize,
    pub(crate) watch_calls: AtomicUsize,
    pub(crate) mark_read_calls: AtomicUsize,
    pub(crate) watched_calls: AtomicUsize,
}

pub(crate) fn fake_messaging() -> Arc<FakeMessaging> {
    Arc::new(FakeMessaging::default())
}

#[async_trait]
impl MessagingApi for FakeMessaging {
    async fn query_channels(
        &self,
        query: &ChannelQuery,
    ) -> Result<Vec<LiveChannel>, MessagingError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.query_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        {
            let mut errors = self.query_errors.lock();
            if !errors.is_empty() {
                return Err(errors.remove(0));
            }
        }
        let results = self.query_results.lock();
        Ok(results.iter().take(query.limit).cloned().collect())
    }

    async fn watch(
        &self,
        _kind: ChannelKind,
        channel_ref: &str,
    ) -> Result<LiveChannel, MessagingError> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.watch_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        {
            let mut errors = self.watch_errors.lock();
            if let Some(scripted) = errors.get_mut(channel_ref) {
                if !scripted.is_empty() {
                    return Err(scripted.remove(0));
                }
            }
        }
        self.live
            .lock()
            .get(channel_ref)
            .cloned()
            .ok_or_else(|| MessagingError::NotFound {
                channel_ref: channel_ref.to_string(),
            })
    }

    async fn mark_read(&self, _channel_ref: &str) -> Result<(), MessagingError> {
        self.mark_read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn watched_channels(&self) -> Vec<LiveChannel> {
        self.watched_calls.fetch_add(1, Ordering::SeqCst);
        self.watched.lock().clone()
    }
}

// ===== Builders =====

pub(crate) fn community(id: &str, display_name: &str) -> Community {
    Community {
        id: id.to_string(),
        display_name: display_name.to_string(),
        image_ref: None,
    }
}

pub(crate) fn channel_record(
    id: &str,
    messaging_channel_ref: Option<&str>,
    owner_id: &str,
) -> ChannelRecord {
    ChannelRecord {
        id: id.to_string(),
        name: id.to_string(),
        description: None,
        category: None,
        channel_kind: ChannelKind::Text,
        minimum_tier_required: 0,
        messaging_channel_ref: messaging_channel_ref.map(str::to_string),
        owner_id: owner_id.to_string(),
        position: 0,
    }
}

pub(crate) fn community_with_channels(
    id: &str,
    display_name: &str,
    channels: Vec<ChannelRecord>,
) -> CommunityWithChannels {
    CommunityWithChannels {
        community: community(id, display_name),
        channels,
    }
}

pub(crate) fn live_channel(channel_ref: &str) -> LiveChannel {
    LiveChannel {
        channel_ref: channel_ref.to_string(),
        kind: ChannelKind::Text,
        members: HashMap::new(),
        last_message_at: None,
        unread_count: 0,
        metadata: LiveChannelMetadata::default(),
    }
}

/// A plain two-member channel, shaped like a direct conversation.
pub(crate) fn dm_channel(channel_ref: &str, actor_id: &str, other_id: &str) -> LiveChannel {
    let mut channel = live_channel(channel_ref);
    channel.members.insert(
        actor_id.to_string(),
        MemberInfo {
            user_id: actor_id.to_string(),
            display_name: None,
            image_ref: None,
            online: true,
        },
    );
    channel.members.insert(
        other_id.to_string(),
        MemberInfo {
            user_id: other_id.to_string(),
            display_name: None,
            image_ref: None,
            online: false,
        },
    );
    channel
}

/// A channel in the local cache with the given unread count.
pub(crate) fn watched_channel(channel_ref: &str, unread_count: u32) -> LiveChannel {
    let mut channel = live_channel(channel_ref);
    channel.unread_count = unread_count;
    channel
}
