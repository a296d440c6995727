pub mod database;
pub mod models;
pub mod session_storage;
pub mod transcript;

pub use models::PersistedChat;
pub use session_storage::SessionStorage;
pub use transcript::TranscriptStore;

/// Storage key of the persisted transcript.
pub const CHAT_DATA_KEY: &str = "chat-data";
