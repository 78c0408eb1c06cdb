//! Telegram Bot API adapter (webhook endpoints only).
//!
//! Implements the `twh-core` `WebhookApi` port over plain HTTPS + JSON.

use std::time::Duration;

use async_trait::async_trait;
use serde::{
    de::{DeserializeOwned, IgnoredAny},
    Deserialize, Serialize,
};
use tracing::{debug, warn};

use twh_core::{
    config::Config,
    domain::{BotToken, WebhookConfig, WebhookInfo},
    errors::Error,
    ports::WebhookApi,
    Result,
};

const BODY_PREVIEW_LEN: usize = 200;

#[derive(Clone, Debug)]
pub struct BotApiClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

/// Envelope every Bot API method answers with, on success and on failure.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawWebhookInfo {
    #[serde(default)]
    url: String,
    #[serde(default)]
    has_custom_certificate: bool,
    #[serde(default)]
    pending_update_count: u64,
    last_error_message: Option<String>,
    last_error_date: Option<i64>,
    max_connections: Option<u32>,
    ip_address: Option<String>,
    secret_token: Option<String>,
}

impl From<RawWebhookInfo> for WebhookInfo {
    fn from(raw: RawWebhookInfo) -> Self {
        Self {
            url: raw.url,
            has_custom_certificate: raw.has_custom_certificate,
            pending_update_count: raw.pending_update_count,
            last_error_message: raw.last_error_message,
            secret_configured: raw.secret_token.is_some_and(|s| !s.is_empty()),
            last_error_date: raw.last_error_date,
            max_connections: raw.max_connections,
            ip_address: raw.ip_address,
        }
    }
}

#[derive(Debug, Serialize)]
struct SetWebhookBody<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_token: Option<&'a str>,
}

impl BotApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client build failed: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.telegram_api_base.clone(), cfg.http_timeout)
    }

    fn endpoint(&self, token: &BotToken, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, token.as_str())
    }

    /// Send a request and unwrap the Bot API envelope.
    ///
    /// `ok: false` becomes `Error::Api` with the description verbatim, even on
    /// non-2xx statuses. Anything undecodable is `Error::Transport`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        req: reqwest::RequestBuilder,
    ) -> Result<Option<T>> {
        let resp = req.send().await.map_err(|e| self.transport(method, e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport(method, e))?;
        debug!(method, %status, "bot api response");

        let envelope: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            Error::Transport(format!(
                "{method}: malformed response (HTTP {status}): {e}; body: {}",
                truncate_text(&body, BODY_PREVIEW_LEN)
            ))
        })?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| "Unknown error".to_string());
            warn!(
                method,
                %status,
                error_code = ?envelope.error_code,
                %description,
                "bot api error"
            );
            return Err(Error::Api(description));
        }

        Ok(envelope.result)
    }

    fn transport(&self, method: &str, e: reqwest::Error) -> Error {
        // The request URL embeds the bot token.
        let e = e.without_url();
        if e.is_timeout() {
            return Error::Transport(format!(
                "{method}: request timed out after {}s",
                self.timeout.as_secs_f32()
            ));
        }
        Error::Transport(format!("{method}: request failed: {e}"))
    }
}

#[async_trait]
impl WebhookApi for BotApiClient {
    async fn get_webhook_info(&self, token: &BotToken) -> Result<WebhookInfo> {
        let req = self.http.get(self.endpoint(token, "getWebhookInfo"));
        let raw: RawWebhookInfo = self.call("getWebhookInfo", req).await?.ok_or_else(|| {
            Error::Transport("getWebhookInfo: malformed response: missing `result`".to_string())
        })?;
        Ok(raw.into())
    }

    async fn set_webhook(&self, token: &BotToken, config: &WebhookConfig) -> Result<String> {
        let body = SetWebhookBody {
            url: &config.url,
            secret_token: config.secret_token.as_deref(),
        };
        let req = self.http.post(self.endpoint(token, "setWebhook")).json(&body);
        self.call::<IgnoredAny>("setWebhook", req).await?;
        Ok("Webhook set successfully!".to_string())
    }

    async fn delete_webhook(&self, token: &BotToken) -> Result<String> {
        let req = self.http.post(self.endpoint(token, "deleteWebhook"));
        self.call::<IgnoredAny>("deleteWebhook", req).await?;
        Ok("Webhook deleted successfully!".to_string())
    }
}

fn truncate_text(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut out = s.chars().take(max_len).collect::<String>();
    out.push_str("...");
    out
}
