use serde::{Deserialize, Serialize};

use crate::common::ChatMessage;

/// Payload stored under [`super::CHAT_DATA_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedChat {
    pub messages: Vec<ChatMessage>,
    pub session_id: String,
}
