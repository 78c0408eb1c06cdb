use std::fmt;

use crate::{validate, Result};

const MASKED_PREFIX_LEN: usize = 15;

/// Telegram bot token. Only ever used to build API URLs.
///
/// `Debug` and `Display` are masked so the token cannot leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    pub fn parse(raw: &str) -> Result<Self> {
        validate::bot_token(raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 15 characters followed by `...`.
    pub fn masked(&self) -> String {
        if self.0.chars().count() <= MASKED_PREFIX_LEN {
            return self.0.clone();
        }
        let head: String = self.0.chars().take(MASKED_PREFIX_LEN).collect();
        format!("{head}...")
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BotToken").field(&self.masked()).finish()
    }
}

impl fmt::Display for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Desired webhook registration, built right before `setWebhook`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: String,
    pub secret_token: Option<String>,
}

/// Snapshot returned by `getWebhookInfo`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WebhookInfo {
    /// Empty when no webhook is registered.
    pub url: String,
    pub has_custom_certificate: bool,
    pub pending_update_count: u64,
    pub last_error_message: Option<String>,
    pub secret_configured: bool,

    pub last_error_date: Option<i64>,
    pub max_connections: Option<u32>,
    pub ip_address: Option<String>,
}

impl WebhookInfo {
    pub fn url(&self) -> Option<&str> {
        if self.url.is_empty() {
            None
        } else {
            Some(&self.url)
        }
    }
}

/// Top-level action picked by the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Set,
    Info,
    Delete,
    Test,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Set => "Set up new webhook",
            Action::Info => "Get current webhook info",
            Action::Delete => "Delete webhook",
            Action::Test => "Test bot connection",
        }
    }
}

/// Where the destination URL for `setWebhook` comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UrlSource {
    FunctionLookup,
    Manual,
}

impl UrlSource {
    pub fn label(self) -> &'static str {
        match self {
            UrlSource::FunctionLookup => "Auto-detect from AWS",
            UrlSource::Manual => "Enter manually",
        }
    }
}
