use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One turn of the transcript, authored either by the user or by the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(content: impl Into<String>, is_user: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            is_user,
            timestamp: Utc::now(),
        }
    }

    #[cfg(test)]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, true)
    }

    #[cfg(test)]
    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(content, false)
    }
}

/// Snapshot of the signed-in identity as shown by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub loading: bool,
    pub email: Option<String>,
}

/// Cosmetic progress of an in-flight request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderState {
    pub step: u8,
    pub detailed: bool,
}

impl LoaderState {
    pub fn is_cleared(&self) -> bool {
        self.step == 0 && !self.detailed
    }
}
