use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::COMMUNITY_CHANNEL_REF_PREFIX;
use crate::models::ChannelKind;

/// Identifier in the messaging service's namespace.
pub type ChannelRef = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub online: bool,
}

/// Extended metadata the provisioning flow attaches to community channels in
/// the messaging service. Direct conversations carry none of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveChannelMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub minimum_tier_required: Option<u8>,
    /// Back-reference to the metadata service's channel record.
    #[serde(default)]
    pub metadata_channel_id: Option<String>,
}

impl LiveChannelMetadata {
    /// The community signals present on this channel, by the names listed in
    /// [`crate::constants::COMMUNITY_METADATA_SIGNALS`].
    pub fn present_signals(&self) -> Vec<&'static str> {
        let mut signals = Vec::new();
        if self.name.is_some() {
            signals.push("name");
        }
        if self.category.is_some() {
            signals.push("category");
        }
        if self.minimum_tier_required.is_some() {
            signals.push("minimumTierRequired");
        }
        if self.metadata_channel_id.is_some() {
            signals.push("metadataChannelId");
        }
        signals
    }
}

/// Snapshot of a channel as the messaging service sees it. The engine only
/// watches, reads and marks read; members are never mutated from here.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveChannel {
    pub channel_ref: ChannelRef,
    pub kind: ChannelKind,
    /// Current members keyed by user id, with presence.
    pub members: HashMap<String, MemberInfo>,
    pub last_message_at: Option<DateTime<Utc>>,
    /// Unread count as perceived by the current actor.
    pub unread_count: u32,
    pub metadata: LiveChannelMetadata,
}

impl LiveChannel {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// The member that is not `actor_id`. `None` when the channel has no such
    /// member, in which case it cannot be rendered as a conversation.
    pub fn counterpart_of(&self, actor_id: &str) -> Option<&MemberInfo> {
        self.members
            .iter()
            .find(|(user_id, _)| user_id.as_str() != actor_id)
            .map(|(_, member)| member)
    }

    /// Exclusion predicate for the direct-conversation classifier.
    ///
    /// A channel with exactly two members is still a community channel when
    /// its ref carries the community naming pattern, or when any community
    /// metadata signal is set. Either alone reclassifies it.
    pub fn is_community_channel(&self) -> bool {
        self.channel_ref.starts_with(COMMUNITY_CHANNEL_REF_PREFIX)
            || !self.metadata.present_signals().is_empty()
    }
}
