use std::collections::HashMap;

use crate::models::ActivationState;

/// Guard entry for one externally supplied channel reference.
///
/// The one-shot flags survive any number of re-invocations for the same ref
/// and reset only when the ref itself stops being of interest.
#[derive(Debug, Clone, Default)]
pub struct ResolutionEntry {
    pub state: ActivationState,
    /// The resolver's single allowed directory re-fetch on an empty
    /// directory has been spent.
    pub directory_refetched: bool,
    /// The resync-and-settle sequence has been spent for this ref.
    pub self_heal_attempted: bool,
}

/// Arena of per-ref resolution guards, keyed by the raw channel reference.
/// Evicted when the caller navigates to a different ref.
#[derive(Debug, Default)]
pub struct ResolutionStore {
    entries: HashMap<String, ResolutionEntry>,
}

impl ResolutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entry_mut(&mut self, channel_ref: &str) -> &mut ResolutionEntry {
        self.entries.entry(channel_ref.to_string()).or_default()
    }

    pub fn state_of(&self, channel_ref: &str) -> ActivationState {
        self.entries
            .get(channel_ref)
            .map(|entry| entry.state.clone())
            .unwrap_or_default()
    }

    /// Drop every entry except the one for `channel_ref`. Called when the
    /// externally supplied ref changes; the surviving entry (if any) keeps
    /// its spent flags, fresh refs start at Idle.
    pub fn retain_only(&mut self, channel_ref: &str) {
        self.entries.retain(|key, _| key == channel_ref);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_refs_start_idle() {
        let store = ResolutionStore::new();
        assert_eq!(store.state_of("ref-x"), ActivationState::Idle);
    }

    #[test]
    fn flags_stick_per_ref() {
        let mut store = ResolutionStore::new();
        store.entry_mut("ref-x").self_heal_attempted = true;

        assert!(store.entry_mut("ref-x").self_heal_attempted);
        assert!(!store.entry_mut("ref-y").self_heal_attempted);
    }

    #[test]
    fn ref_change_evicts_everything_else() {
        let mut store = ResolutionStore::new();
        store.entry_mut("ref-old").self_heal_attempted = true;
        store.entry_mut("ref-older").state = ActivationState::Failed("gone".to_string());
        store.entry_mut("ref-new");

        store.retain_only("ref-new");

        assert_eq!(store.len(), 1);
        assert!(!store.entry_mut("ref-old").self_heal_attempted);
        assert_eq!(store.state_of("ref-older"), ActivationState::Idle);
    }
}
