use crate::messaging::MessagingError;

/// Errors the engine surfaces to the UI layer.
///
/// Every SDK or transport failure is converted to one of these before it
/// crosses the engine boundary; callers never see a messaging-service or HTTP
/// error type. Rate-limit responses are classified at the messaging seam
/// ([`MessagingError::RateLimited`]) and absorbed internally, so they have no
/// surfaced variant here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The metadata record has no live-service linkage and provisioning
    /// failed. Recoverable: a later refresh retries the sync.
    #[error("channel is not provisioned yet, refresh the page and try again")]
    NotProvisioned,
    /// The messaging service rejected the watch/open after one self-heal
    /// attempt. Terminal for this attempt.
    #[error("no access to this channel")]
    AccessDenied,
    /// Anything else. Terminal, generic.
    #[error("something went wrong, try again later: {message}")]
    Unknown { message: String },
}

impl EngineError {
    /// Classify a messaging-service failure as a terminal engine error.
    ///
    /// Used on paths where the internal retry budget is already spent: a
    /// rate-limited response can no longer be absorbed there and degrades to
    /// `Unknown` rather than gaining a surfaced variant of its own.
    pub(crate) fn terminal_from(err: MessagingError) -> Self {
        match err {
            MessagingError::AccessDenied { .. } => EngineError::AccessDenied,
            other => EngineError::Unknown {
                message: other.to_string(),
            },
        }
    }
}
