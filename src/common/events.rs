use tokio::sync::mpsc;

use super::types::{AuthStatus, ChatMessage, LoaderState};

/// Notifications from the chat service to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    TranscriptRestored(Vec<ChatMessage>),
    MessageAppended(ChatMessage),
    TranscriptCleared,
    TypingChanged(bool),
    LoadingChanged(LoaderState),
    ErrorChanged(Option<String>),
    AuthChanged(AuthStatus),
    ChatReady(bool),
    /// Result text of a sign-in attempt, shown on the login form.
    SignInMessage(String),
    NewPasswordRequired { message: String },
}

/// Publishing half of the event stream. Publishing never blocks and a
/// closed receiver is only logged, so state owners can emit freely.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: Option<mpsc::UnboundedSender<ChatEvent>>,
}

impl EventSink {
    pub fn new(sender: mpsc::UnboundedSender<ChatEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// A sink that drops every event.
    #[cfg(test)]
    pub fn disconnected() -> Self {
        Self { sender: None }
    }

    pub fn publish(&self, event: ChatEvent) {
        if let Some(sender) = &self.sender {
            if let Err(err) = sender.send(event) {
                log::debug!("Event receiver gone, dropping {:?}", err.0);
            }
        }
    }
}
