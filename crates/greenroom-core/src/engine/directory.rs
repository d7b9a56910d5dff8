//! Metadata directory fetching and the read-side directory views.

use super::Engine;
use crate::models::{ChannelRecord, DirectoryEntry};

impl Engine {
    /// Fetch the community/channel graph and repartition the directory.
    ///
    /// On transport failure the previous directory is left untouched and the
    /// failure is not surfaced: the UI keeps rendering the last-known-good
    /// state and degrades to its empty-state message when there never was
    /// one. Re-fetch cadence is the caller's decision.
    pub async fn refresh_directory(&self) {
        match self.metadata.communities_with_channels().await {
            Ok(fetched) => {
                let mut directory = self.directory.lock();
                directory.replace(&self.actor_id, fetched);
                tracing::info!(
                    own = directory.own_community().is_some(),
                    others = directory.other_communities().len(),
                    "directory refreshed"
                );
            }
            Err(err) => {
                tracing::warn!("directory fetch failed, keeping last known good state: {err}");
            }
        }
    }

    /// Both partitions, own community first.
    pub fn list_directory(&self) -> Vec<DirectoryEntry> {
        self.directory.lock().entries()
    }

    /// The directory as a member holding `tier` sees it.
    pub fn list_directory_accessible_at(&self, tier: u8) -> Vec<DirectoryEntry> {
        self.directory.lock().accessible_entries(tier)
    }

    pub fn find_channel_by_messaging_ref(&self, channel_ref: &str) -> Option<ChannelRecord> {
        self.directory.lock().find_by_messaging_ref(channel_ref)
    }

    pub fn find_channel_by_id(&self, channel_id: &str) -> Option<ChannelRecord> {
        self.directory.lock().find_by_channel_id(channel_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use crate::testing::{
        channel_record, community_with_channels, engine_with, fake_metadata, fake_messaging,
    };

    #[tokio::test]
    async fn partitions_relative_to_the_actor() {
        let metadata = fake_metadata(vec![
            community_with_channels(
                "creator-1",
                "Mine",
                vec![channel_record("chan-own", Some("ref-own"), "creator-1")],
            ),
            community_with_channels(
                "creator-2",
                "Theirs",
                vec![channel_record("chan-other", Some("ref-other"), "creator-2")],
            ),
        ]);
        let messaging = fake_messaging();
        let engine = engine_with(metadata, messaging);

        engine.refresh_directory().await;

        let entries = engine.list_directory();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].community.id, "creator-1", "own community first");
        assert_eq!(entries[1].community.id, "creator-2");
    }

    #[tokio::test]
    async fn transport_failure_keeps_last_known_good() {
        let metadata = fake_metadata(vec![community_with_channels(
            "creator-2",
            "Theirs",
            vec![channel_record("chan-1", Some("ref-1"), "creator-2")],
        )]);
        let messaging = fake_messaging();
        let engine = engine_with(metadata.clone(), messaging);

        engine.refresh_directory().await;
        assert_eq!(engine.list_directory().len(), 1);

        metadata.fail_fetch.store(true, Ordering::SeqCst);
        engine.refresh_directory().await;

        assert_eq!(engine.list_directory().len(), 1, "stale beats empty");
        assert!(engine.last_error().is_none(), "fetch failures are silent");
    }
}
