use tokio::sync::mpsc;

use crate::auth::{AuthContext, AuthOutcome, NewPasswordChallenge};
use crate::chat::{ChatController, DispatchOutcome};
use crate::common::{ChatCommand, ChatEvent, EventSink};

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const PASSWORD_SET: &str = "Password set successfully!";
pub const NEW_PASSWORD_PROMPT: &str = "Please set a new password";
pub const NO_PENDING_CHALLENGE: &str = "No password change is pending; sign in again.";

/// Background worker owning the auth and chat contexts. Commands are
/// handled one at a time, so dispatches never interleave.
pub struct ChatService {
    auth: AuthContext,
    chat: ChatController,
    pending_challenge: Option<NewPasswordChallenge>,
    command_receiver: mpsc::Receiver<ChatCommand>,
    sink: EventSink,
}

impl ChatService {
    pub fn new(
        auth: AuthContext,
        chat: ChatController,
        command_receiver: mpsc::Receiver<ChatCommand>,
        sink: EventSink,
    ) -> Self {
        Self {
            auth,
            chat,
            pending_challenge: None,
            command_receiver,
            sink,
        }
    }

    pub async fn run(mut self) {
        self.auth.load_current_session().await;
        if self.auth.store.is_authenticated() {
            self.chat.initialize(&self.auth).await;
        }
        log::info!("Chat service started");

        while let Some(command) = self.command_receiver.recv().await {
            self.handle_command(command).await;
        }

        log::info!("Command channel closed; chat service stopping");
    }

    async fn handle_command(&mut self, command: ChatCommand) {
        match command {
            ChatCommand::SendMessage(text) => {
                let outcome = self.chat.send_message(&mut self.auth, &text).await;
                log::debug!("Dispatch finished: {outcome:?}");
                if outcome == DispatchOutcome::SessionExpired {
                    log::warn!("Session expired; user must sign in again");
                }
            }
            ChatCommand::SignIn { email, password } => {
                let outcome = self.auth.provider.authenticate(&email, &password).await;
                self.apply_outcome(outcome, LOGIN_SUCCESS).await;
            }
            ChatCommand::CompleteNewPassword { new_password } => {
                let Some(challenge) = self.pending_challenge.take() else {
                    self.sink
                        .publish(ChatEvent::SignInMessage(NO_PENDING_CHALLENGE.to_string()));
                    return;
                };
                let outcome = self
                    .auth
                    .provider
                    .complete_new_password(&challenge, &new_password)
                    .await;
                if matches!(outcome, AuthOutcome::Failed(_)) {
                    // Let the user try another password.
                    self.pending_challenge = Some(challenge);
                }
                self.apply_outcome(outcome, PASSWORD_SET).await;
            }
            ChatCommand::SignOut => {
                self.auth.sign_out();
                self.chat.invalidate();
                self.pending_challenge = None;
                log::info!("Signed out");
            }
            ChatCommand::ResetChat => self.chat.reset(),
        }
    }

    async fn apply_outcome(&mut self, outcome: AuthOutcome, success_message: &str) {
        match outcome {
            AuthOutcome::SignedIn(session) => {
                log::info!(
                    "Signed in as {}",
                    session.email().unwrap_or("<unknown>")
                );
                self.pending_challenge = None;
                self.auth.store.set_session(Some(session));
                self.sink
                    .publish(ChatEvent::SignInMessage(success_message.to_string()));
                self.chat.initialize(&self.auth).await;
            }
            AuthOutcome::NewPasswordRequired(challenge) => {
                self.pending_challenge = Some(challenge);
                self.sink.publish(ChatEvent::NewPasswordRequired {
                    message: NEW_PASSWORD_PROMPT.to_string(),
                });
            }
            AuthOutcome::Failed(message) => {
                self.sink.publish(ChatEvent::SignInMessage(message));
            }
        }
    }
}
