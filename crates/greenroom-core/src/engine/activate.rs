//! Channel activation: guarantee a metadata record is watchable in the
//! messaging service, open it, mark it read.

use super::Engine;
use crate::error::EngineError;
use crate::messaging::MessagingError;
use crate::models::{ChannelRecord, LiveChannel};

impl Engine {
    /// Materialize `record` as a live, watched, read channel.
    ///
    /// Steps, each a suspension point: provision the messaging linkage if the
    /// record has none, watch the channel, mark it read. An access-denied
    /// watch on the first attempt is treated as replication lag: one
    /// whole-account resync, a settle delay, a directory re-fetch, then one
    /// retry. A second denial is terminal `AccessDenied`; any other failure
    /// class is terminal `Unknown`.
    pub async fn activate_channel(
        &self,
        record: &ChannelRecord,
    ) -> Result<LiveChannel, EngineError> {
        let (result, _healed) = self.activate_steps(record, true).await;
        match &result {
            Ok(live) => {
                *self.active_channel.lock() = Some(live.clone());
                self.clear_last_error();
            }
            Err(err) => self.set_last_error(err),
        }
        result
    }

    /// The activation sequence with an explicit self-heal budget. Returns the
    /// outcome plus whether the budget was spent, so the deep-link resolver
    /// can account the heal against its per-ref guard.
    pub(crate) async fn activate_steps(
        &self,
        record: &ChannelRecord,
        allow_self_heal: bool,
    ) -> (Result<LiveChannel, EngineError>, bool) {
        let mut record = record.clone();
        let mut healed = false;
        let mut is_retry = false;

        loop {
            let channel_ref = match record.messaging_channel_ref.clone() {
                Some(channel_ref) => channel_ref,
                None => match self.metadata.sync_channel(&record.id).await {
                    Ok(Some(channel_ref)) => channel_ref,
                    Ok(None) => return (Err(EngineError::NotProvisioned), healed),
                    Err(err) => {
                        tracing::warn!(channel_id = %record.id, "channel sync failed: {err}");
                        return (Err(EngineError::NotProvisioned), healed);
                    }
                },
            };

            match self.messaging.watch(record.channel_kind, &channel_ref).await {
                Ok(live) => {
                    if let Err(err) = self.messaging.mark_read(&channel_ref).await {
                        // The channel is open and usable; a failed read receipt
                        // resolves itself on the next mark-read event.
                        tracing::warn!(%channel_ref, "mark-read after activation failed: {err}");
                    }
                    return (Ok(live), healed);
                }
                Err(MessagingError::AccessDenied { .. }) if allow_self_heal && !is_retry => {
                    tracing::info!(
                        %channel_ref,
                        "watch denied on first attempt, running account self-heal"
                    );
                    self.self_heal().await;
                    healed = true;
                    is_retry = true;
                    // The repaired directory may carry a fresh copy of the
                    // record; the record can also have vanished entirely, in
                    // which case the stale copy gets the one retry.
                    if let Some(refreshed) = self.directory.lock().find_by_channel_id(&record.id) {
                        record = refreshed;
                    }
                }
                Err(MessagingError::AccessDenied { .. }) => {
                    return (Err(EngineError::AccessDenied), healed);
                }
                Err(err) => return (Err(EngineError::terminal_from(err)), healed),
            }
        }
    }

    /// Best-effort whole-account resync, a settle delay for replication, then
    /// a directory re-fetch.
    pub(crate) async fn self_heal(&self) {
        if let Err(err) = self.metadata.resync_account().await {
            tracing::warn!("account resync failed: {err}");
        }
        tokio::time::sleep(self.config.self_heal_settle).await;
        self.refresh_directory().await;
    }
}
