//! The reconciliation engine instance.
//!
//! One engine per authenticated session. It owns the merged directory, the
//! unread projection, the direct-conversation cache and the per-ref
//! resolution guards; the UI layer reads through the getters and feeds
//! external events into [`Engine::handle_event`].
//!
//! Everything runs on the caller's async runtime. Shared state sits behind
//! short-lived `parking_lot` locks that are never held across an `.await`;
//! each mutation replaces the relevant container whole, so an operation that
//! resumes after a suspension point only ever observes a fully consistent
//! structure.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::messaging::MessagingApi;
use crate::metadata::MetadataApi;
use crate::models::LiveChannel;
use crate::store::{DirectoryStore, ResolutionStore, UnreadStore};

mod activate;
mod deeplink;
mod direct;
mod directory;
mod unread;

pub use deeplink::Resolution;

use direct::DirectConversationState;

pub struct Engine {
    actor_id: String,
    config: EngineConfig,
    metadata: Arc<dyn MetadataApi>,
    messaging: Arc<dyn MessagingApi>,

    directory: Mutex<DirectoryStore>,
    unread: Mutex<UnreadStore>,
    resolutions: Mutex<ResolutionStore>,
    direct: Mutex<DirectConversationState>,

    /// A debounced unread recompute is already scheduled.
    unread_refresh_pending: AtomicBool,

    /// The channel most recently materialized for the UI.
    active_channel: Mutex<Option<LiveChannel>>,
    /// Last terminal error, as a display string. Cleared by the next
    /// successful activation.
    last_error: Mutex<Option<String>>,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        metadata: Arc<dyn MetadataApi>,
        messaging: Arc<dyn MessagingApi>,
        actor_id: impl Into<String>,
    ) -> Result<Self> {
        let actor_id = actor_id.into();
        if actor_id.is_empty() {
            anyhow::bail!("actor id must be non-empty");
        }

        Ok(Self {
            actor_id,
            config,
            metadata,
            messaging,
            directory: Mutex::new(DirectoryStore::new()),
            unread: Mutex::new(UnreadStore::new()),
            resolutions: Mutex::new(ResolutionStore::new()),
            direct: Mutex::new(DirectConversationState::default()),
            unread_refresh_pending: AtomicBool::new(false),
            active_channel: Mutex::new(None),
            last_error: Mutex::new(None),
        })
    }

    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    pub fn active_channel(&self) -> Option<LiveChannel> {
        self.active_channel.lock().clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    /// Tear down session state on sign-out. The engine can be reused for a
    /// fresh session of the same actor; a different actor gets a new engine.
    pub fn reset(&self) {
        self.directory.lock().clear();
        self.unread.lock().clear();
        self.resolutions.lock().clear();
        *self.direct.lock() = DirectConversationState::default();
        *self.active_channel.lock() = None;
        *self.last_error.lock() = None;
    }

    /// Feed one external event into the engine. Suspends for debounced work;
    /// callers that must not wait can spawn this future.
    pub async fn handle_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::MessageNew | EngineEvent::NotificationMessageNew => {
                self.refresh_direct_conversations().await;
                self.note_message_activity().await;
            }
            EngineEvent::NotificationMarkRead => {
                self.note_message_activity().await;
            }
            EngineEvent::ConnectionEstablished => {
                self.refresh_directory().await;
                self.refresh_direct_conversations().await;
                self.recompute_unread_counts();
            }
            EngineEvent::DeepLinkChanged { channel_ref } => {
                self.resolutions.lock().retain_only(&channel_ref);
            }
        }
    }

    pub(crate) fn set_last_error(&self, err: &EngineError) {
        *self.last_error.lock() = Some(err.to_string());
    }

    pub(crate) fn clear_last_error(&self) {
        *self.last_error.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivationState;
    use crate::testing::{
        channel_record, community_with_channels, engine_with, fake_metadata, fake_messaging,
    };

    #[test]
    fn rejects_an_empty_actor() {
        let metadata = fake_metadata(vec![]);
        let messaging = fake_messaging();
        assert!(Engine::new(EngineConfig::default(), metadata, messaging, "").is_err());
    }

    #[tokio::test]
    async fn reset_clears_session_state() {
        let metadata = fake_metadata(vec![community_with_channels(
            "creator-2",
            "Theirs",
            vec![channel_record("chan-1", Some("ref-1"), "creator-2")],
        )]);
        let messaging = fake_messaging();
        let engine = engine_with(metadata, messaging);

        engine.refresh_directory().await;
        assert!(!engine.list_directory().is_empty());
        engine.resolutions.lock().entry_mut("ref-1").self_heal_attempted = true;
        engine.set_last_error(&EngineError::AccessDenied);

        engine.reset();

        assert!(engine.list_directory().is_empty());
        assert!(engine.last_error().is_none());
        assert!(engine.active_channel().is_none());
        assert!(!engine.resolutions.lock().entry_mut("ref-1").self_heal_attempted);
    }

    #[tokio::test]
    async fn deep_link_change_evicts_other_guards() {
        let metadata = fake_metadata(vec![]);
        let messaging = fake_messaging();
        let engine = engine_with(metadata, messaging);

        engine.resolutions.lock().entry_mut("ref-old").self_heal_attempted = true;
        engine.resolutions.lock().entry_mut("ref-new").state = ActivationState::Resolving;

        engine
            .handle_event(EngineEvent::DeepLinkChanged {
                channel_ref: "ref-new".to_string(),
            })
            .await;

        let mut resolutions = engine.resolutions.lock();
        assert_eq!(resolutions.state_of("ref-new"), ActivationState::Resolving);
        assert!(!resolutions.entry_mut("ref-old").self_heal_attempted);
    }
}
