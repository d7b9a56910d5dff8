/// External events the UI layer forwards into [`crate::engine::Engine::handle_event`].
///
/// The engine has no subscription of its own; the caller owns the messaging
/// SDK event stream and the navigation state, and translates both into these
/// variants. This keeps the state machines' transition triggers explicit and
/// testable without a rendering framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// `message.new` from a watched channel.
    MessageNew,
    /// `notification.message_new` for a channel the client is not watching.
    NotificationMessageNew,
    /// `notification.mark_read`, a read receipt landed.
    NotificationMarkRead,
    /// The messaging connection (re)established; local state is fresh.
    ConnectionEstablished,
    /// The externally supplied channel reference changed (URL navigation).
    /// Resolution guards for every other ref are evicted.
    DeepLinkChanged { channel_ref: String },
}
