/// Requests from the UI to the chat service.
#[derive(Debug, Clone)]
pub enum ChatCommand {
    SendMessage(String),
    SignIn { email: String, password: String },
    /// Answer a pending new-password challenge from the last sign-in.
    CompleteNewPassword { new_password: String },
    SignOut,
    ResetChat,
}
