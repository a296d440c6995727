pub mod credentials;
pub mod error;
pub mod lex;
pub mod runtime;
pub mod types;

pub use error::BotError;
pub use lex::LexClient;
pub use runtime::BotRuntime;
pub use types::BotResponse;
