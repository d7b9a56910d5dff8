use std::collections::HashMap;

use crate::models::ChannelRef;

/// Projection of per-channel unread counts out of the messaging client's
/// local cache. Never an independent ledger: counts only change by replacing
/// the whole map with a fresh snapshot.
#[derive(Debug, Default)]
pub struct UnreadStore {
    counts: HashMap<ChannelRef, u32>,
}

impl UnreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn replace(&mut self, counts: HashMap<ChannelRef, u32>) {
        self.counts = counts;
    }

    /// Unknown refs read as zero.
    pub fn count_for(&self, channel_ref: &str) -> u32 {
        self.counts.get(channel_ref).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().fold(0u32, |acc, n| acc.saturating_add(*n))
    }

    /// Roll-up over a set of refs (a community's channels).
    pub fn sum_for<'a>(&self, refs: impl Iterator<Item = &'a str>) -> u32 {
        refs.fold(0u32, |acc, r| acc.saturating_add(self.count_for(r)))
    }
}
