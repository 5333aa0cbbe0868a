// src/notify/telegram.rs
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{AlertSink, DeliveryOutcome};

const API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API `sendMessage` sink.
#[derive(Clone)]
pub struct TelegramSink {
    token: String,
    client: Client,
    timeout: Duration,
    api_base: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    migrate_to_chat_id: Option<i64>,
    #[serde(default)]
    retry_after: Option<u64>,
}

impl TelegramSink {
    pub fn new(token: String) -> Self {
        Self {
            token,
            client: Client::new(),
            timeout: Duration::from_secs(10),
            api_base: API_BASE.to_string(),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs.max(1));
        self
    }

    /// Alternative endpoint (self-hosted Bot API server).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait::async_trait]
impl AlertSink for TelegramSink {
    async fn deliver(&self, recipient: &str, text: &str) -> DeliveryOutcome {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let body = SendMessage {
            chat_id: recipient,
            text,
            disable_web_page_preview: false,
        };

        let resp = match self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            // without_url(): the URL carries the bot token
            Err(e) => return DeliveryOutcome::TransientFailure(e.without_url().to_string()),
        };

        let status = resp.status();
        match resp.text().await {
            Ok(body) => outcome_from_response(status, &body),
            Err(e) => DeliveryOutcome::TransientFailure(format!(
                "reading telegram response ({status}): {}",
                e.without_url()
            )),
        }
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

/// Map a Bot API reply to a delivery outcome.
pub(crate) fn outcome_from_response(status: StatusCode, body: &str) -> DeliveryOutcome {
    let parsed: Option<ApiResponse> = serde_json::from_str(body).ok();

    if let Some(r) = &parsed {
        if r.ok && status.is_success() {
            return DeliveryOutcome::Delivered;
        }
        if let Some(new_id) = r.parameters.as_ref().and_then(|p| p.migrate_to_chat_id) {
            return DeliveryOutcome::Redirected(new_id.to_string());
        }
    }

    let description = parsed
        .as_ref()
        .and_then(|r| r.description.clone())
        .unwrap_or_else(|| format!("HTTP {status}"));

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = parsed
                .as_ref()
                .and_then(|r| r.parameters.as_ref())
                .and_then(|p| p.retry_after);
            match retry_after {
                Some(secs) => DeliveryOutcome::TransientFailure(format!(
                    "{description} (retry after {secs}s)"
                )),
                None => DeliveryOutcome::TransientFailure(description),
            }
        }
        s if s.is_server_error() => DeliveryOutcome::TransientFailure(description),
        s if s.is_client_error() => DeliveryOutcome::Rejected(description),
        // 2xx with ok=false or an unparseable body
        _ => DeliveryOutcome::TransientFailure(description),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_is_delivered() {
        let out = outcome_from_response(StatusCode::OK, r#"{"ok":true,"result":{"message_id":5}}"#);
        assert_eq!(out, DeliveryOutcome::Delivered);
    }

    #[test]
    fn migration_is_redirect() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: group chat was upgraded to a supergroup chat","parameters":{"migrate_to_chat_id":-1001234567890}}"#;
        assert_eq!(
            outcome_from_response(StatusCode::BAD_REQUEST, body),
            DeliveryOutcome::Redirected("-1001234567890".into())
        );
    }

    #[test]
    fn forbidden_is_rejected() {
        let body = r#"{"ok":false,"error_code":403,"description":"Forbidden: bot is not a member of the group chat"}"#;
        match outcome_from_response(StatusCode::FORBIDDEN, body) {
            DeliveryOutcome::Rejected(reason) => assert!(reason.contains("not a member")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rate_limit_and_server_errors_are_transient() {
        let body = r#"{"ok":false,"error_code":429,"description":"Too Many Requests","parameters":{"retry_after":7}}"#;
        match outcome_from_response(StatusCode::TOO_MANY_REQUESTS, body) {
            DeliveryOutcome::TransientFailure(r) => assert!(r.contains("retry after 7s")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            outcome_from_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
            DeliveryOutcome::TransientFailure(_)
        ));
    }

    #[test]
    fn api_base_is_trimmed() {
        let s = TelegramSink::new("t".into()).with_api_base("http://localhost:8081/");
        assert_eq!(s.api_base, "http://localhost:8081");
    }
}
