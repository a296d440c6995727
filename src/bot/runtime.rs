use async_trait::async_trait;

use crate::auth::AuthSession;

use super::error::BotError;
use super::types::BotResponse;

/// The managed dialog runtime the transcript talks to.
#[async_trait]
pub trait BotRuntime: Send {
    /// Bind the client to the credentials of `session`. Called again after
    /// every session refresh.
    async fn initialize(&mut self, session: &AuthSession) -> Result<(), BotError>;

    async fn recognize_text(&mut self, text: &str, session_id: &str)
    -> Result<BotResponse, BotError>;
}
