use std::collections::HashSet;

use crate::metadata::CommunityWithChannels;
use crate::models::{ChannelRecord, DirectoryEntry};

/// The engine's merged, partitioned view of communities and their channels.
///
/// Two disjoint partitions at all times: the actor's own community (at most
/// one) and everyone else's. Mutation is replace-whole: a fetch swaps in a
/// freshly partitioned result, so an operation suspended mid-await never
/// resumes against a half-updated structure.
#[derive(Debug, Default)]
pub struct DirectoryStore {
    own_community: Option<DirectoryEntry>,
    other_communities: Vec<DirectoryEntry>,
}

impl DirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.own_community = None;
        self.other_communities.clear();
    }

    /// Repartition from a fetched graph. Duplicate community ids are dropped
    /// after the first occurrence, channels are ordered by `position`, other
    /// communities by display name for stable rendering.
    pub fn replace(&mut self, actor_id: &str, fetched: Vec<CommunityWithChannels>) {
        let mut own: Option<DirectoryEntry> = None;
        let mut others: Vec<DirectoryEntry> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for item in fetched {
            if !seen.insert(item.community.id.clone()) {
                tracing::debug!(community_id = %item.community.id, "duplicate community dropped");
                continue;
            }
            let mut channels = item.channels;
            channels.sort_by_key(|channel| channel.position);
            let entry = DirectoryEntry {
                community: item.community,
                channels,
            };
            if entry.community.id == actor_id {
                own = Some(entry);
            } else {
                others.push(entry);
            }
        }

        others.sort_by(|a, b| a.community.display_name.cmp(&b.community.display_name));

        self.own_community = own;
        self.other_communities = others;
    }

    pub fn own_community(&self) -> Option<&DirectoryEntry> {
        self.own_community.as_ref()
    }

    pub fn other_communities(&self) -> &[DirectoryEntry] {
        &self.other_communities
    }

    /// Both partitions, own community first.
    pub fn entries(&self) -> Vec<DirectoryEntry> {
        self.own_community
            .iter()
            .chain(self.other_communities.iter())
            .cloned()
            .collect()
    }

    /// Both partitions with channels the given tier cannot see filtered out.
    pub fn accessible_entries(&self, tier: u8) -> Vec<DirectoryEntry> {
        self.entries()
            .into_iter()
            .map(|mut entry| {
                entry.channels.retain(|channel| channel.accessible_at(tier));
                entry
            })
            .collect()
    }

    /// True when no community carries any channel; the resolver reads this as
    /// "directory not yet loaded".
    pub fn has_any_channels(&self) -> bool {
        self.own_community
            .iter()
            .chain(self.other_communities.iter())
            .any(|entry| !entry.channels.is_empty())
    }

    pub fn find_by_messaging_ref(&self, channel_ref: &str) -> Option<ChannelRecord> {
        self.all_channels()
            .find(|channel| channel.messaging_channel_ref.as_deref() == Some(channel_ref))
            .cloned()
    }

    pub fn find_by_channel_id(&self, channel_id: &str) -> Option<ChannelRecord> {
        self.all_channels()
            .find(|channel| channel.id == channel_id)
            .cloned()
    }

    fn all_channels(&self) -> impl Iterator<Item = &ChannelRecord> {
        self.own_community
            .iter()
            .chain(self.other_communities.iter())
            .flat_map(|entry| entry.channels.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{channel_record, community_with_channels};

    #[test]
    fn partitions_by_actor_and_stays_disjoint() {
        let mut store = DirectoryStore::new();
        store.replace(
            "creator-1",
            vec![
                community_with_channels("creator-2", "Beta", vec![]),
                community_with_channels("creator-1", "Mine", vec![]),
                community_with_channels("creator-3", "Alpha", vec![]),
            ],
        );

        assert_eq!(store.own_community().unwrap().community.id, "creator-1");
        let other_ids: Vec<&str> = store
            .other_communities()
            .iter()
            .map(|e| e.community.id.as_str())
            .collect();
        assert!(!other_ids.contains(&"creator-1"));

        // No community id appears twice across the union
        let mut all_ids: Vec<String> = store
            .entries()
            .into_iter()
            .map(|e| e.community.id)
            .collect();
        all_ids.sort();
        all_ids.dedup();
        assert_eq!(all_ids.len(), 3);
    }

    #[test]
    fn duplicate_community_ids_keep_first_occurrence() {
        let mut store = DirectoryStore::new();
        store.replace(
            "creator-1",
            vec![
                community_with_channels("creator-2", "First", vec![]),
                community_with_channels("creator-2", "Second", vec![]),
            ],
        );

        assert_eq!(store.other_communities().len(), 1);
        assert_eq!(
            store.other_communities()[0].community.display_name,
            "First"
        );
    }

    #[test]
    fn channels_sort_by_position_and_communities_by_name() {
        let mut early = channel_record("chan-a", Some("ref-a"), "creator-2");
        early.position = 0;
        let mut late = channel_record("chan-b", Some("ref-b"), "creator-2");
        late.position = 5;

        let mut store = DirectoryStore::new();
        store.replace(
            "creator-1",
            vec![
                community_with_channels("creator-2", "Zeta", vec![late.clone(), early.clone()]),
                community_with_channels("creator-3", "Alpha", vec![]),
            ],
        );

        assert_eq!(
            store.other_communities()[0].community.display_name,
            "Alpha"
        );
        let zeta = &store.other_communities()[1];
        assert_eq!(zeta.channels[0].id, "chan-a");
        assert_eq!(zeta.channels[1].id, "chan-b");
    }

    #[test]
    fn lookup_by_messaging_ref_spans_both_partitions() {
        let own_channel = channel_record("chan-own", Some("ref-own"), "creator-1");
        let other_channel = channel_record("chan-other", Some("ref-other"), "creator-2");
        let unprovisioned = channel_record("chan-pending", None, "creator-2");

        let mut store = DirectoryStore::new();
        store.replace(
            "creator-1",
            vec![
                community_with_channels("creator-1", "Mine", vec![own_channel]),
                community_with_channels(
                    "creator-2",
                    "Theirs",
                    vec![other_channel, unprovisioned],
                ),
            ],
        );

        assert_eq!(store.find_by_messaging_ref("ref-own").unwrap().id, "chan-own");
        assert_eq!(
            store.find_by_messaging_ref("ref-other").unwrap().id,
            "chan-other"
        );
        assert!(store.find_by_messaging_ref("ref-missing").is_none());
        assert_eq!(
            store.find_by_channel_id("chan-pending").unwrap().id,
            "chan-pending"
        );
    }

    #[test]
    fn empty_means_zero_channels_anywhere() {
        let mut store = DirectoryStore::new();
        assert!(!store.has_any_channels());

        store.replace(
            "creator-1",
            vec![community_with_channels("creator-2", "Empty", vec![])],
        );
        assert!(!store.has_any_channels());

        store.replace(
            "creator-1",
            vec![community_with_channels(
                "creator-2",
                "Busy",
                vec![channel_record("chan-1", Some("ref-1"), "creator-2")],
            )],
        );
        assert!(store.has_any_channels());
    }

    #[test]
    fn tier_view_filters_gated_channels() {
        let open = channel_record("chan-open", Some("ref-open"), "creator-2");
        let mut gated = channel_record("chan-vip", Some("ref-vip"), "creator-2");
        gated.minimum_tier_required = 3;

        let mut store = DirectoryStore::new();
        store.replace(
            "creator-1",
            vec![community_with_channels(
                "creator-2",
                "Theirs",
                vec![open, gated],
            )],
        );

        let visible = store.accessible_entries(1);
        assert_eq!(visible[0].channels.len(), 1);
        assert_eq!(visible[0].channels[0].id, "chan-open");

        let vip = store.accessible_entries(3);
        assert_eq!(vip[0].channels.len(), 2);
    }
}
