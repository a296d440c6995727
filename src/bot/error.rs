use thiserror::Error;

use crate::aws::AwsError;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Lex client not initialized")]
    NotInitialized,
    #[error(transparent)]
    Aws(#[from] AwsError),
    #[error("invalid credentials response: {0}")]
    Credentials(String),
}

impl BotError {
    /// Whether the failure means the signed-in session must be refreshed.
    pub fn is_credential_expired(&self) -> bool {
        match self {
            BotError::Aws(err) => err.is_credential_expired(),
            _ => false,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            BotError::Aws(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}
