pub mod commands;
pub mod events;
pub mod types;

pub use commands::ChatCommand;
pub use events::{ChatEvent, EventSink};
pub use types::{AuthStatus, ChatMessage, LoaderState};
