use crate::common::{AuthStatus, ChatEvent, ChatMessage, LoaderState};

/// Fields of the sign-in screen.
#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub new_password: String,
    pub awaiting_new_password: bool,
    pub submitting: bool,
    pub message: Option<String>,
}

/// Local UI state, rebuilt from service events.
#[derive(Debug)]
pub struct AppState {
    pub messages: Vec<ChatMessage>,
    pub input_text: String,
    pub auth: AuthStatus,
    pub chat_ready: bool,
    pub typing: bool,
    pub loader: LoaderState,
    pub error: Option<String>,
    pub login: LoginForm,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            input_text: String::new(),
            auth: AuthStatus {
                loading: true,
                ..AuthStatus::default()
            },
            chat_ready: false,
            typing: false,
            loader: LoaderState::default(),
            error: None,
            login: LoginForm::default(),
        }
    }

    pub fn apply(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::TranscriptRestored(messages) => self.messages = messages,
            ChatEvent::MessageAppended(message) => self.messages.push(message),
            ChatEvent::TranscriptCleared => self.messages.clear(),
            ChatEvent::TypingChanged(typing) => self.typing = typing,
            ChatEvent::LoadingChanged(loader) => self.loader = loader,
            ChatEvent::ErrorChanged(error) => self.error = error,
            ChatEvent::AuthChanged(status) => {
                if status.authenticated {
                    self.login = LoginForm::default();
                }
                self.auth = status;
            }
            ChatEvent::ChatReady(ready) => self.chat_ready = ready,
            ChatEvent::SignInMessage(message) => {
                self.login.submitting = false;
                self.login.message = Some(message);
            }
            ChatEvent::NewPasswordRequired { message } => {
                self.login.submitting = false;
                self.login.awaiting_new_password = true;
                self.login.password.clear();
                self.login.message = Some(message);
            }
        }
    }

    /// Whether the input bar may submit.
    pub fn can_send(&self) -> bool {
        self.chat_ready && !self.typing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_events_update_messages() {
        let mut state = AppState::new();
        state.apply(ChatEvent::TranscriptRestored(vec![ChatMessage::bot("welcome")]));
        state.apply(ChatEvent::MessageAppended(ChatMessage::user("hi")));
        assert_eq!(state.messages.len(), 2);

        state.apply(ChatEvent::TranscriptCleared);
        assert!(state.messages.is_empty());
    }

    #[test]
    fn typing_blocks_sending() {
        let mut state = AppState::new();
        assert!(!state.can_send());

        state.apply(ChatEvent::ChatReady(true));
        assert!(state.can_send());

        state.apply(ChatEvent::TypingChanged(true));
        assert!(!state.can_send());
    }

    #[test]
    fn new_password_prompt_switches_form() {
        let mut state = AppState::new();
        state.login.password = "temp".into();
        state.login.submitting = true;

        state.apply(ChatEvent::NewPasswordRequired {
            message: "Please set a new password".into(),
        });

        assert!(state.login.awaiting_new_password);
        assert!(!state.login.submitting);
        assert!(state.login.password.is_empty());
    }

    #[test]
    fn successful_auth_resets_login_form() {
        let mut state = AppState::new();
        state.login.email = "a@b.c".into();
        state.login.message = Some("Login successful!".into());

        state.apply(ChatEvent::AuthChanged(AuthStatus {
            authenticated: true,
            loading: false,
            email: Some("a@b.c".into()),
        }));

        assert!(state.auth.authenticated);
        assert!(state.login.email.is_empty());
        assert!(state.login.message.is_none());
    }

    #[test]
    fn expired_session_message_reaches_login_form() {
        let mut state = AppState::new();
        state.apply(ChatEvent::AuthChanged(AuthStatus {
            authenticated: true,
            loading: false,
            email: Some("a@b.c".into()),
        }));

        state.apply(ChatEvent::AuthChanged(AuthStatus::default()));
        state.apply(ChatEvent::SignInMessage(
            "Your session has expired. Please sign in again.".into(),
        ));

        assert!(!state.auth.authenticated);
        assert_eq!(
            state.login.message.as_deref(),
            Some("Your session has expired. Please sign in again.")
        );
    }
}
