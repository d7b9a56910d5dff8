//! Deep-link resolution: turn an externally supplied channel reference into
//! a live, joined channel through a bounded fallback sequence.

use super::Engine;
use crate::error::EngineError;
use crate::messaging::MessagingError;
use crate::models::{ActivationState, ChannelKind, ChannelRecord, LiveChannel};

/// Outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The channel is live, watched and marked read.
    Active(LiveChannel),
    /// Still searching. The caller re-invokes on the next relevant event
    /// (directory loaded, connection established); the per-ref guards make
    /// the re-invocation cheap and bounded.
    Pending,
}

impl Engine {
    /// Resolve `channel_ref` against the directory, falling back to direct
    /// messaging-service access, with at most one directory re-fetch and at
    /// most one resync-and-settle self-heal per distinct ref.
    ///
    /// Re-entrant invocations for a ref that is already resolving return
    /// `Pending` immediately, so concurrent triggers cannot duplicate work.
    /// A ref that already reached `Active` answers with the active channel
    /// until the caller navigates to a different ref.
    pub async fn resolve_deep_link(&self, channel_ref: &str) -> Result<Resolution, EngineError> {
        {
            let mut resolutions = self.resolutions.lock();
            let entry = resolutions.entry_mut(channel_ref);
            match entry.state {
                ActivationState::Resolving => return Ok(Resolution::Pending),
                ActivationState::Active => {
                    let active = self
                        .active_channel
                        .lock()
                        .as_ref()
                        .filter(|channel| channel.channel_ref == channel_ref)
                        .cloned();
                    if let Some(live) = active {
                        return Ok(Resolution::Active(live));
                    }
                    // The handle is gone (navigation elsewhere); resolve anew.
                    entry.state = ActivationState::Resolving;
                }
                _ => entry.state = ActivationState::Resolving,
            }
        }

        let outcome = self.resolve_steps(channel_ref).await;

        {
            let mut resolutions = self.resolutions.lock();
            let entry = resolutions.entry_mut(channel_ref);
            match &outcome {
                Ok(Resolution::Active(live)) => {
                    entry.state = ActivationState::Active;
                    *self.active_channel.lock() = Some(live.clone());
                    self.clear_last_error();
                }
                Ok(Resolution::Pending) => {
                    entry.state = ActivationState::Idle;
                }
                Err(err) => {
                    entry.state = ActivationState::Failed(err.to_string());
                    self.set_last_error(err);
                }
            }
        }
        outcome
    }

    /// Current resolution state for a ref, for callers that render progress.
    pub fn resolution_state(&self, channel_ref: &str) -> ActivationState {
        self.resolutions.lock().state_of(channel_ref)
    }

    async fn resolve_steps(&self, channel_ref: &str) -> Result<Resolution, EngineError> {
        // The directory is the preferred source: a known record activates
        // through the full provisioning-aware path.
        if let Some(record) = self.directory.lock().find_by_messaging_ref(channel_ref) {
            return self.activate_from_directory(&record, channel_ref).await;
        }

        // An empty directory means metadata has not loaded yet. Give it one
        // chance to arrive before touching the messaging service; a direct
        // call now would fail for the wrong reason.
        if !self.directory.lock().has_any_channels() {
            let already_refetched = {
                let mut resolutions = self.resolutions.lock();
                std::mem::replace(
                    &mut resolutions.entry_mut(channel_ref).directory_refetched,
                    true,
                )
            };
            if already_refetched {
                return Ok(Resolution::Pending);
            }
            tokio::time::sleep(self.config.deep_link_refetch_delay).await;
            self.refresh_directory().await;

            if let Some(record) = self.directory.lock().find_by_messaging_ref(channel_ref) {
                return self.activate_from_directory(&record, channel_ref).await;
            }
            if !self.directory.lock().has_any_channels() {
                return Ok(Resolution::Pending);
            }
        }

        // The metadata service does not know the ref. Go straight at the
        // messaging service with the raw reference.
        let allow_heal = !self
            .resolutions
            .lock()
            .entry_mut(channel_ref)
            .self_heal_attempted;
        match self.open_direct(channel_ref).await {
            Ok(live) => Ok(Resolution::Active(live)),
            Err(MessagingError::AccessDenied { .. }) if allow_heal => {
                self.resolutions
                    .lock()
                    .entry_mut(channel_ref)
                    .self_heal_attempted = true;
                tracing::info!(
                    %channel_ref,
                    "direct activation denied, running account self-heal"
                );
                self.self_heal().await;
                // Deliberate loop-back: the next invocation re-runs the full
                // search against the repaired directory. The spent heal flag
                // keeps this bounded.
                Ok(Resolution::Pending)
            }
            Err(MessagingError::AccessDenied { .. }) => Err(EngineError::AccessDenied),
            Err(MessagingError::RateLimited) => {
                tracing::debug!(%channel_ref, "direct activation rate limited, retrying on the next trigger");
                Ok(Resolution::Pending)
            }
            Err(err) => Err(EngineError::terminal_from(err)),
        }
    }

    async fn activate_from_directory(
        &self,
        record: &ChannelRecord,
        channel_ref: &str,
    ) -> Result<Resolution, EngineError> {
        let allow_heal = !self
            .resolutions
            .lock()
            .entry_mut(channel_ref)
            .self_heal_attempted;
        let (result, healed) = self.activate_steps(record, allow_heal).await;
        if healed {
            self.resolutions
                .lock()
                .entry_mut(channel_ref)
                .self_heal_attempted = true;
        }
        result.map(Resolution::Active)
    }

    /// Watch-and-mark-read by raw reference, bypassing the directory.
    async fn open_direct(&self, channel_ref: &str) -> Result<LiveChannel, MessagingError> {
        let live = self.messaging.watch(ChannelKind::Text, channel_ref).await?;
        if let Err(err) = self.messaging.mark_read(channel_ref).await {
            tracing::warn!(%channel_ref, "mark-read after direct open failed: {err}");
        }
        Ok(live)
    }
}
