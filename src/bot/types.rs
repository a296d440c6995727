use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One `RecognizeText` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotRequest {
    pub bot_id: String,
    pub bot_alias_id: String,
    pub locale_id: String,
    pub session_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponseCardButton {
    pub text: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponseCard {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub buttons: Vec<ImageResponseCardButton>,
}

impl ImageResponseCard {
    fn render(&self) -> String {
        let mut lines = vec![self.title.clone()];
        lines.extend(self.subtitle.iter().filter(|s| !s.is_empty()).cloned());
        lines.extend(self.buttons.iter().map(|button| format!("• {}", button.text)));
        lines.join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub image_response_card: Option<ImageResponseCard>,
}

impl BotMessage {
    #[cfg(test)]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            content_type: Some("PlainText".into()),
            image_response_card: None,
        }
    }

    /// Text to show in the transcript, if this segment has any.
    pub fn display_text(&self) -> Option<String> {
        match (&self.content, &self.image_response_card) {
            (Some(content), _) if !content.is_empty() => Some(content.clone()),
            (_, Some(card)) if !card.title.is_empty() => Some(card.render()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<BotMessage>,
    #[serde(default)]
    pub session_state: Option<Value>,
}

impl BotResponse {
    #[cfg(test)]
    pub fn with_messages<I, S>(contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: contents.into_iter().map(BotMessage::text).collect(),
            session_state: None,
        }
    }

    /// Transcript entries produced by this turn, in order.
    pub fn reply_segments(&self) -> Vec<String> {
        self.messages.iter().filter_map(BotMessage::display_text).collect()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<BotMessage>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<BotMessage>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_runtime_response() {
        let body = r#"{
            "messages": [
                {"content": "Hello there", "contentType": "PlainText"},
                {"contentType": "ImageResponseCard", "imageResponseCard": {
                    "title": "Pick one", "subtitle": "Options",
                    "buttons": [{"text": "Apply", "value": "apply"}, {"text": "Info", "value": "info"}]
                }}
            ],
            "sessionState": {"dialogAction": {"type": "ElicitIntent"}},
            "sessionId": "web-ui-1"
        }"#;
        let response: BotResponse = serde_json::from_str(body).unwrap();

        assert_eq!(
            response.reply_segments(),
            vec![
                "Hello there".to_string(),
                "Pick one\nOptions\n• Apply\n• Info".to_string()
            ]
        );
        assert!(response.session_state.is_some());
    }

    #[test]
    fn missing_or_null_messages_yield_no_segments() {
        let absent: BotResponse = serde_json::from_str("{}").unwrap();
        let null: BotResponse = serde_json::from_str(r#"{"messages": null}"#).unwrap();
        let blank: BotResponse =
            serde_json::from_str(r#"{"messages": [{"content": ""}, {"contentType": "CustomPayload"}]}"#)
                .unwrap();

        assert!(absent.reply_segments().is_empty());
        assert!(null.reply_segments().is_empty());
        assert!(blank.reply_segments().is_empty());
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = BotRequest {
            bot_id: "B".into(),
            bot_alias_id: "A".into(),
            locale_id: "en_GB".into(),
            session_id: "s".into(),
            text: "hi".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["botAliasId"], "A");
        assert_eq!(json["localeId"], "en_GB");
    }
}
