//! Seam to the real-time messaging service's client SDK.
//!
//! The SDK owns the authoritative channel/member/message state and its own
//! local cache. The engine drives it through this trait: `watch` stands for
//! the SDK's `channel(type, ref).watch()`, `mark_read` for `.markRead()`,
//! `query_channels` for the filtered channel query, and `watched_channels`
//! exposes the already-synchronized local snapshot (no network round-trip).

use async_trait::async_trait;

use crate::models::{ChannelKind, LiveChannel};

/// Failures from the messaging seam, classified so the engine never has to
/// inspect SDK-specific error codes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MessagingError {
    /// Membership is missing or not yet replicated.
    #[error("access denied for channel {channel_ref}")]
    AccessDenied { channel_ref: String },
    #[error("channel {channel_ref} does not exist")]
    NotFound { channel_ref: String },
    /// The service's distinguished rate-limit response. Expected under bursty
    /// conditions; the engine absorbs it and waits for the next trigger.
    #[error("rate limited by the messaging service")]
    RateLimited,
    #[error("messaging transport failure: {message}")]
    Transport { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelSort {
    #[default]
    LastMessageAtDesc,
}

/// Filter/sort/pagination triple for `query_channels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelQuery {
    /// The queried channels must include this user as a member.
    pub member: String,
    /// Exact total member count, when set.
    pub member_count: Option<usize>,
    pub sort: ChannelSort,
    pub limit: usize,
}

impl ChannelQuery {
    /// The classifier's query: channels with exactly two members, the actor
    /// being one of them, most recent activity first.
    pub fn two_party(member: impl Into<String>, limit: usize) -> Self {
        Self {
            member: member.into(),
            member_count: Some(2),
            sort: ChannelSort::LastMessageAtDesc,
            limit,
        }
    }
}

#[async_trait]
pub trait MessagingApi: Send + Sync {
    async fn query_channels(
        &self,
        query: &ChannelQuery,
    ) -> Result<Vec<LiveChannel>, MessagingError>;

    /// Open the channel and start watching it. Joins the event stream and
    /// pulls the channel into the local cache.
    async fn watch(
        &self,
        kind: ChannelKind,
        channel_ref: &str,
    ) -> Result<LiveChannel, MessagingError>;

    async fn mark_read(&self, channel_ref: &str) -> Result<(), MessagingError>;

    /// Snapshot of every channel in the local cache. Synchronous: this is the
    /// SDK's own state, already kept fresh by the watches above.
    fn watched_channels(&self) -> Vec<LiveChannel>;
}
