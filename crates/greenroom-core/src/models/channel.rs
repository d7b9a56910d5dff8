use serde::{Deserialize, Serialize};

use crate::models::Community;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Text,
    Voice,
    /// Kinds this client version does not know yet. Carried through verbatim
    /// so the record survives a round trip.
    #[serde(other)]
    Other,
}

/// A channel as the metadata service records it.
///
/// `messaging_channel_ref` is nullable because creation in the metadata
/// service can precede provisioning in the messaging service; once non-null
/// it never changes for the life of the record. The record itself can vanish
/// between listing and activation (owner deletion), which activation
/// tolerates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub channel_kind: ChannelKind,
    /// Ordinal of the lowest membership tier allowed in. 0 means everyone.
    #[serde(default)]
    pub minimum_tier_required: u8,
    #[serde(default)]
    pub messaging_channel_ref: Option<String>,
    pub owner_id: String,
    #[serde(default)]
    pub position: u32,
}

impl ChannelRecord {
    /// Whether a member holding `tier` may see this channel. Listing-time
    /// convenience only; the messaging service stays authoritative and still
    /// answers access-denied on watch.
    pub fn accessible_at(&self, tier: u8) -> bool {
        tier >= self.minimum_tier_required
    }
}

/// The engine's merged projection: one community plus its ordered channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub community: Community,
    pub channels: Vec<ChannelRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(min_tier: u8) -> ChannelRecord {
        ChannelRecord {
            id: "chan-1".to_string(),
            name: "general".to_string(),
            description: None,
            category: None,
            channel_kind: ChannelKind::Text,
            minimum_tier_required: min_tier,
            messaging_channel_ref: None,
            owner_id: "creator-1".to_string(),
            position: 0,
        }
    }

    #[test]
    fn tier_gate_is_inclusive() {
        let gated = record(2);
        assert!(!gated.accessible_at(0));
        assert!(!gated.accessible_at(1));
        assert!(gated.accessible_at(2));
        assert!(gated.accessible_at(3));

        assert!(record(0).accessible_at(0));
    }

    #[test]
    fn unknown_channel_kind_deserializes_as_other() {
        let json = r#"{
            "id": "chan-1",
            "name": "stage",
            "channelKind": "holo-stage",
            "ownerId": "creator-1"
        }"#;
        let record: ChannelRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.channel_kind, ChannelKind::Other);
        assert_eq!(record.minimum_tier_required, 0);
        assert!(record.messaging_channel_ref.is_none());
    }
}
