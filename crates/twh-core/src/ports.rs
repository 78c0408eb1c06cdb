use async_trait::async_trait;

use crate::{
    domain::{BotToken, WebhookConfig, WebhookInfo},
    Result,
};

/// The three Bot API calls the configurator needs.
///
/// Failures are `Error::Api` when Telegram answered `ok: false` and
/// `Error::Transport` for everything between us and a decodable answer.
#[async_trait]
pub trait WebhookApi: Send + Sync {
    async fn get_webhook_info(&self, token: &BotToken) -> Result<WebhookInfo>;

    /// Returns a confirmation message on success.
    async fn set_webhook(&self, token: &BotToken, config: &WebhookConfig) -> Result<String>;

    /// Returns a confirmation message on success.
    async fn delete_webhook(&self, token: &BotToken) -> Result<String>;
}

/// Looks up the public invocation URL of a deployed cloud function.
#[async_trait]
pub trait FunctionUrlResolver: Send + Sync {
    /// Fails with `Error::ProviderLookup`.
    async fn resolve_function_url(&self, function_name: &str, region: &str) -> Result<String>;
}
