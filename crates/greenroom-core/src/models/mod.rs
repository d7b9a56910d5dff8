mod activation;
mod channel;
mod community;
mod direct_conversation;
mod live_channel;

pub use activation::ActivationState;
pub use channel::{ChannelKind, ChannelRecord, DirectoryEntry};
pub use community::Community;
pub use direct_conversation::{Counterpart, DirectConversationEntry};
pub use live_channel::{ChannelRef, LiveChannel, LiveChannelMetadata, MemberInfo};
