mod directory_store;
mod resolution_store;
mod unread_store;

pub use directory_store::DirectoryStore;
pub use resolution_store::{ResolutionEntry, ResolutionStore};
pub use unread_store::UnreadStore;
