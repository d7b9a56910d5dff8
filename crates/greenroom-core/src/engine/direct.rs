//! Direct-conversation classification over the messaging service's
//! two-party channels.

use std::time::Instant;

use super::Engine;
use crate::constants::DIRECT_CONVERSATION_PAGE_SIZE;
use crate::messaging::{ChannelQuery, MessagingError};
use crate::models::{Counterpart, DirectConversationEntry, LiveChannel};

/// Classifier cache plus the throttle state that guards it. Instance-scoped:
/// independent engines throttle independently.
#[derive(Default)]
pub(crate) struct DirectConversationState {
    pub(crate) entries: Vec<DirectConversationEntry>,
    /// When the previous fetch returned (not when it started).
    pub(crate) last_completed: Option<Instant>,
    pub(crate) in_flight: bool,
}

impl Engine {
    /// Query the messaging service for the actor's two-party channels and
    /// reclassify them.
    ///
    /// Throttled: a call inside the configured window of the previous
    /// completion, or while another call is in flight, is silently dropped.
    /// Callers re-trigger on their own cadence (typically the next
    /// inbound-message event). A rate-limit response from the service is
    /// likewise swallowed; the previous entries stay.
    pub async fn refresh_direct_conversations(&self) {
        {
            let mut state = self.direct.lock();
            if state.in_flight {
                tracing::debug!("direct-conversation fetch already in flight, dropped");
                return;
            }
            if let Some(last) = state.last_completed {
                if last.elapsed() < self.config.direct_fetch_throttle {
                    tracing::debug!("direct-conversation fetch throttled, dropped");
                    return;
                }
            }
            state.in_flight = true;
        }

        let query = ChannelQuery::two_party(&self.actor_id, DIRECT_CONVERSATION_PAGE_SIZE);
        let result = self.messaging.query_channels(&query).await;

        let mut state = self.direct.lock();
        state.in_flight = false;
        state.last_completed = Some(Instant::now());
        match result {
            Ok(channels) => {
                state.entries = build_entries(&self.actor_id, channels);
                tracing::debug!(count = state.entries.len(), "direct conversations refreshed");
            }
            Err(MessagingError::RateLimited) => {
                tracing::debug!("direct-conversation query rate limited, keeping previous entries");
            }
            Err(err) => {
                tracing::warn!("direct-conversation query failed, keeping previous entries: {err}");
            }
        }
    }

    /// The classifier's current output. Recomputed whole by
    /// [`Engine::refresh_direct_conversations`].
    pub fn list_direct_conversations(&self) -> Vec<DirectConversationEntry> {
        self.direct.lock().entries.clone()
    }
}

/// Map surviving two-party channels to conversation entries. Channels that
/// are structurally community channels are excluded even with exactly two
/// members, and a channel without a counterpart member is dropped because it
/// cannot be rendered meaningfully.
fn build_entries(actor_id: &str, channels: Vec<LiveChannel>) -> Vec<DirectConversationEntry> {
    channels
        .into_iter()
        .filter(|channel| !channel.is_community_channel())
        .filter_map(|channel| {
            let member = channel.counterpart_of(actor_id)?;
            let counterpart = Counterpart {
                id: member.user_id.clone(),
                name: member
                    .display_name
                    .clone()
                    .unwrap_or_else(|| member.user_id.clone()),
                image_ref: member.image_ref.clone(),
            };
            Some(DirectConversationEntry {
                unread_count: channel.unread_count,
                counterpart,
                live_channel: channel,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use crate::messaging::MessagingError;
    use crate::testing::{dm_channel, engine_with, fake_messaging, fake_metadata};

    #[tokio::test]
    async fn community_shaped_channels_are_excluded() {
        let messaging = fake_messaging();
        {
            let mut results = messaging.query_results.lock();
            results.push(dm_channel("dm-ok", "creator-1", "fan-1"));

            let mut named = dm_channel("dm-named", "creator-1", "fan-2");
            named.metadata.name = Some("welcome".to_string());
            results.push(named);

            let mut categorized = dm_channel("dm-cat", "creator-1", "fan-3");
            categorized.metadata.category = Some("general".to_string());
            results.push(categorized);

            let mut tiered = dm_channel("dm-tier", "creator-1", "fan-4");
            tiered.metadata.minimum_tier_required = Some(1);
            results.push(tiered);

            let mut linked = dm_channel("dm-linked", "creator-1", "fan-5");
            linked.metadata.metadata_channel_id = Some("chan-44".to_string());
            results.push(linked);

            results.push(dm_channel("community-small", "creator-1", "fan-6"));
        }
        let engine = engine_with(fake_metadata(vec![]), messaging);

        engine.refresh_direct_conversations().await;

        let conversations = engine.list_direct_conversations();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].live_channel.channel_ref, "dm-ok");
        assert_eq!(conversations[0].counterpart.id, "fan-1");
    }

    #[tokio::test]
    async fn missing_counterpart_drops_the_candidate() {
        let messaging = fake_messaging();
        {
            let mut solo = dm_channel("dm-solo", "creator-1", "fan-1");
            solo.members.remove("fan-1");
            messaging.query_results.lock().push(solo);
        }
        let engine = engine_with(fake_metadata(vec![]), messaging);

        engine.refresh_direct_conversations().await;

        assert!(engine.list_direct_conversations().is_empty());
    }

    #[tokio::test]
    async fn two_calls_inside_the_window_query_once() {
        let messaging = fake_messaging();
        messaging
            .query_results
            .lock()
            .push(dm_channel("dm-1", "creator-1", "fan-1"));
        let engine = engine_with(fake_metadata(vec![]), messaging.clone());

        engine.refresh_direct_conversations().await;
        engine.refresh_direct_conversations().await;
        assert_eq!(messaging.query_calls.load(Ordering::SeqCst), 1);

        // Outside the (shortened) window the next call goes through.
        tokio::time::sleep(Duration::from_millis(60)).await;
        engine.refresh_direct_conversations().await;
        assert_eq!(messaging.query_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_calls_share_one_query() {
        let messaging = fake_messaging();
        *messaging.query_delay.lock() = Duration::from_millis(30);
        messaging
            .query_results
            .lock()
            .push(dm_channel("dm-1", "creator-1", "fan-1"));
        let engine = engine_with(fake_metadata(vec![]), messaging.clone());

        tokio::join!(
            engine.refresh_direct_conversations(),
            engine.refresh_direct_conversations(),
        );

        assert_eq!(messaging.query_calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.list_direct_conversations().len(), 1);
    }

    #[tokio::test]
    async fn rate_limited_fetch_keeps_previous_entries() {
        let messaging = fake_messaging();
        messaging
            .query_results
            .lock()
            .push(dm_channel("dm-1", "creator-1", "fan-1"));
        let engine = engine_with(fake_metadata(vec![]), messaging.clone());

        engine.refresh_direct_conversations().await;
        assert_eq!(engine.list_direct_conversations().len(), 1);

        messaging
            .query_errors
            .lock()
            .push(MessagingError::RateLimited);
        tokio::time::sleep(Duration::from_millis(60)).await;
        engine.refresh_direct_conversations().await;

        assert_eq!(engine.list_direct_conversations().len(), 1);
        assert!(engine.last_error().is_none());
    }
}
