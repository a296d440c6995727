use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use crate::auth::AuthSession;
use crate::aws::sigv4::{self, SigningRequest, encode_segment};
use crate::aws::{AwsError, ServiceError};
use crate::config::AppConfig;

use super::credentials::{IdentityPoolCredentials, TemporaryCredentials};
use super::error::BotError;
use super::runtime::BotRuntime;
use super::types::{BotRequest, BotResponse};

const SERVICE: &str = "lex";

#[derive(Serialize)]
struct RecognizeTextBody<'a> {
    text: &'a str,
}

/// Lex V2 runtime client authorized through the identity pool.
pub struct LexClient {
    http: reqwest::Client,
    region: String,
    bot_id: String,
    bot_alias_id: String,
    locale_id: String,
    identity: IdentityPoolCredentials,
    id_token: Option<String>,
    credentials: Option<TemporaryCredentials>,
}

impl LexClient {
    pub fn new(config: &AppConfig, http: reqwest::Client) -> Self {
        let identity = IdentityPoolCredentials::new(
            http.clone(),
            &config.region,
            config.identity_pool_id.clone(),
            config.user_pool_provider(),
        );
        Self {
            http,
            region: config.region.clone(),
            bot_id: config.bot_id.clone(),
            bot_alias_id: config.bot_alias_id.clone(),
            locale_id: config.bot_locale_id.clone(),
            identity,
            id_token: None,
            credentials: None,
        }
    }

    fn host(&self) -> String {
        format!("runtime-v2-lex.{}.amazonaws.com", self.region)
    }

    pub fn request(&self, text: &str, session_id: &str) -> BotRequest {
        BotRequest {
            bot_id: self.bot_id.clone(),
            bot_alias_id: self.bot_alias_id.clone(),
            locale_id: self.locale_id.clone(),
            session_id: session_id.to_string(),
            text: text.to_string(),
        }
    }

    async fn credentials(&mut self) -> Result<TemporaryCredentials, BotError> {
        if let Some(creds) = &self.credentials {
            if creds.is_fresh_at(Utc::now()) {
                return Ok(creds.clone());
            }
        }
        let id_token = self.id_token.as_deref().ok_or(BotError::NotInitialized)?;
        let creds = self.identity.fetch(id_token).await?;
        self.credentials = Some(creds.clone());
        Ok(creds)
    }
}

pub fn recognize_text_path(request: &BotRequest) -> String {
    format!(
        "/bots/{}/botAliases/{}/botLocales/{}/sessions/{}/text",
        encode_segment(&request.bot_id),
        encode_segment(&request.bot_alias_id),
        encode_segment(&request.locale_id),
        encode_segment(&request.session_id),
    )
}

#[async_trait]
impl BotRuntime for LexClient {
    async fn initialize(&mut self, session: &AuthSession) -> Result<(), BotError> {
        self.id_token = Some(session.id_token.as_str().to_string());
        self.credentials = None;
        log::info!("Lex client initialized for bot {} ({})", self.bot_id, self.region);
        Ok(())
    }

    async fn recognize_text(
        &mut self,
        text: &str,
        session_id: &str,
    ) -> Result<BotResponse, BotError> {
        if self.id_token.is_none() {
            return Err(BotError::NotInitialized);
        }

        let request = self.request(text, session_id);
        let creds = self.credentials().await?;
        let host = self.host();
        let path = recognize_text_path(&request);
        let payload = serde_json::to_vec(&RecognizeTextBody { text: &request.text })
            .map_err(AwsError::from)?;

        let signed = sigv4::sign(
            &SigningRequest {
                method: "POST",
                host: &host,
                path: &path,
                query: "",
                headers: &[("content-type", "application/json")],
                payload: &payload,
            },
            &creds.credentials,
            &self.region,
            SERVICE,
            Utc::now(),
        );

        let mut builder = self
            .http
            .post(format!("https://{host}{path}"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload);
        for (name, value) in signed {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(AwsError::from)?;
        let status = response.status();
        let error_type = response
            .headers()
            .get("x-amzn-ErrorType")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(AwsError::from)?;

        if !status.is_success() {
            let err = ServiceError::parse(status.as_u16(), error_type.as_deref(), &body);
            if err.is_credential_expired() {
                // Never reuse credentials the service has rejected.
                self.credentials = None;
            }
            return Err(AwsError::Service(err).into());
        }

        let parsed: BotResponse = serde_json::from_str(&body).map_err(AwsError::from)?;
        log::debug!(
            "Lex returned {} message(s) for session {session_id}",
            parsed.messages.len()
        );
        Ok(parsed)
    }
}
