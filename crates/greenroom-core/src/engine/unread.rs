//! Unread aggregation out of the messaging client's local cache.

use std::collections::HashMap;
use std::sync::atomic::Ordering;

use super::Engine;

impl Engine {
    /// Record message/read activity and schedule one debounced recompute.
    ///
    /// The first call of a burst sleeps through the configured quiet window
    /// and then recomputes; every further call inside the window returns
    /// immediately. A burst of events therefore costs exactly one
    /// recomputation.
    pub async fn note_message_activity(&self) {
        if self
            .unread_refresh_pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        tokio::time::sleep(self.config.unread_debounce).await;
        self.unread_refresh_pending.store(false, Ordering::SeqCst);
        self.recompute_unread_counts();
    }

    /// Project per-channel unread counts from the local snapshot. Pure
    /// projection over the SDK's own read-receipt accounting; no network
    /// round-trip beyond what channel-watching already produced.
    pub fn recompute_unread_counts(&self) {
        let mut counts = HashMap::new();
        for channel in self.messaging.watched_channels() {
            counts.insert(channel.channel_ref, channel.unread_count);
        }
        self.unread.lock().replace(counts);
    }

    pub fn unread_count(&self, channel_ref: &str) -> u32 {
        self.unread.lock().count_for(channel_ref)
    }

    pub fn total_unread_count(&self) -> u32 {
        self.unread.lock().total()
    }

    /// Roll-up across one community's provisioned channels.
    pub fn community_unread_count(&self, community_id: &str) -> u32 {
        let refs: Vec<String> = {
            let directory = self.directory.lock();
            directory
                .entries()
                .into_iter()
                .filter(|entry| entry.community.id == community_id)
                .flat_map(|entry| entry.channels)
                .filter_map(|channel| channel.messaging_channel_ref)
                .collect()
        };
        let unread = self.unread.lock();
        unread.sum_for(refs.iter().map(String::as_str))
    }
}
