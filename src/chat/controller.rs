use crate::auth::AuthContext;
use crate::bot::{BotResponse, BotRuntime};
use crate::common::{ChatEvent, ChatMessage, EventSink};
use crate::storage::{PersistedChat, TranscriptStore};

use super::ids::generate_session_id;
use super::loader::{LoaderTiming, LoadingIndicator};

pub const WELCOME_MESSAGE: &str = "Hi! I am MCPP Bot. Let me assist you with our programme information and application process for host organisations. Start the conversation by typing your question.";
pub const NO_RESPONSE_MESSAGE: &str = "I received your message but have no response.";
pub const ERROR_MESSAGE: &str = "Sorry, there was an error processing your request.";
pub const RETRY_FAILED_MESSAGE: &str =
    "Sorry, I couldn't process your request after refreshing your session. Please try again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

pub const NOT_AUTHENTICATED: &str = "Not authenticated";
pub const NOT_INITIALIZED: &str = "Chat not initialized";

/// How a call to [`ChatController::send_message`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    NotInitialized,
    /// Blank input; nothing happened.
    Ignored,
    Delivered { replies: usize },
    /// Credentials expired, the session was refreshed and the retry succeeded.
    Recovered { replies: usize },
    RetryFailed,
    SessionExpired,
    Failed,
}

/// Owns the transcript and relays user turns to the bot.
pub struct ChatController {
    messages: Vec<ChatMessage>,
    is_typing: bool,
    session_id: String,
    initialized: bool,
    error: Option<String>,
    loader: LoadingIndicator,
    bot: Box<dyn BotRuntime>,
    persistence: TranscriptStore,
    sink: EventSink,
}

impl ChatController {
    /// Build a controller and restore any transcript saved by an earlier run.
    pub fn new(
        bot: Box<dyn BotRuntime>,
        persistence: TranscriptStore,
        timing: LoaderTiming,
        sink: EventSink,
    ) -> Self {
        let mut controller = Self {
            messages: Vec::new(),
            is_typing: false,
            session_id: generate_session_id(),
            initialized: false,
            error: None,
            loader: LoadingIndicator::new(timing, sink.clone()),
            bot,
            persistence,
            sink,
        };
        controller.load_from_storage();
        controller
    }

    fn load_from_storage(&mut self) {
        if let Some(data) = self.persistence.load() {
            log::info!(
                "Restored {} message(s) for session {}",
                data.messages.len(),
                data.session_id
            );
            self.messages = data.messages;
            self.session_id = data.session_id;
        }
        self.sink
            .publish(ChatEvent::TranscriptRestored(self.messages.clone()));
    }

    fn save_to_storage(&self) {
        self.persistence.save(&PersistedChat {
            messages: self.messages.clone(),
            session_id: self.session_id.clone(),
        });
    }

    /// Bind the bot client to the signed-in session.
    pub async fn initialize(&mut self, auth: &AuthContext) {
        let Some(session) = auth.store.session() else {
            self.set_error(Some(NOT_AUTHENTICATED.to_string()));
            return;
        };

        match self.bot.initialize(session).await {
            Ok(()) => {
                self.set_initialized(true);
                self.set_error(None);
                if self.messages.is_empty() {
                    self.add_message(WELCOME_MESSAGE, false);
                }
            }
            Err(err) => {
                log::error!("Error initializing bot client: {err}");
                self.set_error(Some(err.user_message()));
            }
        }
    }

    /// Stop sending until [`initialize`](Self::initialize) runs again.
    pub fn invalidate(&mut self) {
        self.set_initialized(false);
    }

    pub fn add_message(&mut self, content: &str, is_user: bool) {
        let message = ChatMessage::new(content, is_user);
        log::debug!("Message added: {message:?}");
        self.messages.push(message.clone());
        self.save_to_storage();
        self.sink.publish(ChatEvent::MessageAppended(message));
    }

    pub async fn send_message(&mut self, auth: &mut AuthContext, text: &str) -> DispatchOutcome {
        if !self.initialized {
            self.set_error(Some(NOT_INITIALIZED.to_string()));
            return DispatchOutcome::NotInitialized;
        }
        if text.trim().is_empty() {
            return DispatchOutcome::Ignored;
        }

        self.add_message(text, true);
        self.set_typing(true);
        self.loader.start().await;
        self.set_error(None);

        let (outcome, replies) = match self.bot.recognize_text(text, &self.session_id).await {
            Ok(response) => {
                let replies = reply_texts(&response);
                (
                    DispatchOutcome::Delivered {
                        replies: replies.len(),
                    },
                    replies,
                )
            }
            Err(err) if err.is_credential_expired() => {
                log::warn!("Bot credentials expired: {err}");
                self.recover_and_retry(auth, text).await
            }
            Err(err) => {
                log::error!("Error sending message to bot: {err}");
                self.set_error(Some(err.user_message()));
                (DispatchOutcome::Failed, vec![ERROR_MESSAGE.to_string()])
            }
        };

        // The indicator plays out before the answer shows up.
        self.loader.stop().await;
        for reply in &replies {
            self.add_message(reply, false);
        }
        if outcome == DispatchOutcome::SessionExpired {
            self.sink
                .publish(ChatEvent::SignInMessage(SESSION_EXPIRED_MESSAGE.to_string()));
        }
        self.set_typing(false);
        outcome
    }

    /// Refresh once and retry once. Returns the outcome with the entries to append.
    async fn recover_and_retry(
        &mut self,
        auth: &mut AuthContext,
        text: &str,
    ) -> (DispatchOutcome, Vec<String>) {
        let refreshed = match auth.provider.refresh_session().await {
            Ok(session) => session,
            Err(err) => {
                log::error!("Session refresh failed: {err}");
                None
            }
        };

        let Some(session) = refreshed else {
            return self.expire_session(auth);
        };

        auth.store.set_session(Some(session.clone()));
        if let Err(err) = self.bot.initialize(&session).await {
            log::error!("Could not reinitialize bot client: {err}");
            return self.expire_session(auth);
        }

        log::info!("Session refreshed; retrying message once");
        match self.bot.recognize_text(text, &self.session_id).await {
            Ok(response) => {
                let replies = reply_texts(&response);
                (
                    DispatchOutcome::Recovered {
                        replies: replies.len(),
                    },
                    replies,
                )
            }
            Err(err) => {
                log::error!("Retry after refresh failed: {err}");
                self.set_error(Some(err.user_message()));
                (
                    DispatchOutcome::RetryFailed,
                    vec![RETRY_FAILED_MESSAGE.to_string()],
                )
            }
        }
    }

    fn expire_session(&mut self, auth: &mut AuthContext) -> (DispatchOutcome, Vec<String>) {
        self.set_error(Some(SESSION_EXPIRED_MESSAGE.to_string()));
        auth.store.clear();
        self.invalidate();
        (
            DispatchOutcome::SessionExpired,
            vec![SESSION_EXPIRED_MESSAGE.to_string()],
        )
    }

    /// Start a fresh conversation.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.session_id = generate_session_id();
        self.set_typing(false);
        self.set_error(None);
        self.persistence.clear();
        self.sink.publish(ChatEvent::TranscriptCleared);
        log::info!("Chat reset; new session {}", self.session_id);
    }

    fn set_typing(&mut self, typing: bool) {
        self.is_typing = typing;
        self.sink.publish(ChatEvent::TypingChanged(typing));
    }

    fn set_initialized(&mut self, initialized: bool) {
        self.initialized = initialized;
        self.sink.publish(ChatEvent::ChatReady(initialized));
    }

    fn set_error(&mut self, error: Option<String>) {
        if self.error != error {
            self.error = error.clone();
            self.sink.publish(ChatEvent::ErrorChanged(error));
        }
    }
}

#[cfg(test)]
impl ChatController {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn loader(&self) -> &LoadingIndicator {
        &self.loader
    }
}

/// Every reply segment, or the placeholder when there is none.
fn reply_texts(response: &BotResponse) -> Vec<String> {
    let segments = response.reply_segments();
    if segments.is_empty() {
        vec![NO_RESPONSE_MESSAGE.to_string()]
    } else {
        segments
    }
}
