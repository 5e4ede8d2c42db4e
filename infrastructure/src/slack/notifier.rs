//! Slack chat.postMessage adapter

use crate::config::SlackSettings;
use async_trait::async_trait;
use herald_application::{Notifier, NotifyError};
use herald_domain::NotificationMessage;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

const CHAT_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Slack error strings that mean the credential itself is the problem
const AUTH_ERRORS: &[&str] = &[
    "invalid_auth",
    "not_authed",
    "account_inactive",
    "token_revoked",
    "token_expired",
    "missing_scope",
];

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    unfurl_links: bool,
    unfurl_media: bool,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Delivers alerts to one fixed Slack channel
///
/// The token and channel are injected at construction; nothing is read
/// from the environment mid-operation.
pub struct SlackNotifier {
    http: reqwest::Client,
    token: String,
    channel: String,
}

impl SlackNotifier {
    pub fn new(settings: &SlackSettings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            token: settings.token.clone(),
            channel: settings.channel.clone(),
        })
    }

}

/// Map an HTTP status and decoded body onto the delivery error taxonomy
fn classify(status: StatusCode, body: Result<PostMessageResponse, String>) -> Result<(), NotifyError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(NotifyError::transient("HTTP 429 (rate limited)"));
    }
    if status.is_server_error() {
        return Err(NotifyError::transient(format!("HTTP {status}")));
    }
    if !status.is_success() {
        return Err(NotifyError::rejected(format!("HTTP {status}")));
    }

    let response = match body {
        Ok(response) => response,
        // A success status with an undecodable body points at a proxy
        // or a truncated read, not at the request
        Err(reason) => return Err(NotifyError::transient(reason)),
    };

    if response.ok {
        return Ok(());
    }
    let reason = response.error.unwrap_or_else(|| "unknown_error".to_string());
    if AUTH_ERRORS.contains(&reason.as_str()) {
        Err(NotifyError::auth(reason))
    } else if reason == "ratelimited" {
        Err(NotifyError::transient(reason))
    } else {
        Err(NotifyError::rejected(reason))
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        let payload = PostMessageRequest {
            channel: &self.channel,
            text: message.text(),
            unfurl_links: true,
            unfurl_media: true,
        };

        let response = self
            .http
            .post(CHAT_POST_MESSAGE_URL)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::transient(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("reading response failed: {e}"))
            .and_then(|text| {
                serde_json::from_str::<PostMessageResponse>(&text)
                    .map_err(|e| format!("undecodable response: {e}"))
            });

        classify(status, body)?;
        debug!(channel = %self.channel, "alert posted");
        Ok(())
    }
}
