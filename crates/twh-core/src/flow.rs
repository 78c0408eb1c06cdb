//! Interactive webhook setup.
//!
//! One linear pass per invocation: token, action, then the action's own
//! prompts and at most one Bot API call. Provider and API failures are
//! printed and reported as `FlowOutcome::Failed`; only console errors and
//! cancellation propagate as `Err`.

use std::io::Write;

use tokio::io::AsyncBufRead;
use tracing::{debug, warn};

use crate::{
    config::Config,
    console::Console,
    domain::{Action, BotToken, UrlSource, WebhookConfig, WebhookInfo},
    errors::Error,
    ports::{FunctionUrlResolver, WebhookApi},
    secret::generate_secret_token,
    validate, Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowOutcome {
    Succeeded,
    /// The provider or API call failed; the reason was printed.
    Failed,
    /// The operator declined a confirmation.
    Aborted,
}

pub struct WebhookSetup<'a> {
    api: &'a dyn WebhookApi,
    resolver: &'a dyn FunctionUrlResolver,
    cfg: &'a Config,
}

impl<'a> WebhookSetup<'a> {
    pub fn new(
        api: &'a dyn WebhookApi,
        resolver: &'a dyn FunctionUrlResolver,
        cfg: &'a Config,
    ) -> Self {
        Self { api, resolver, cfg }
    }

    pub async fn run<R, W>(&self, console: &mut Console<R, W>) -> Result<FlowOutcome>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        console.say("🤖 Telegram Webhook Setup")?;
        console.say("=".repeat(50))?;

        let token = console
            .text("Enter your Telegram Bot Token:", None, BotToken::parse)
            .await?;

        let actions =
            [Action::Set, Action::Info, Action::Delete, Action::Test].map(|a| (a, a.label()));
        let action = console.select("What would you like to do?", &actions).await?;
        debug!(?action, "action selected");

        match action {
            Action::Info => self.show_info(console, &token).await,
            Action::Test => self.test_connection(console, &token).await,
            Action::Delete => self.delete(console, &token).await,
            Action::Set => self.set(console, &token).await,
        }
    }

    async fn show_info<R, W>(
        &self,
        console: &mut Console<R, W>,
        token: &BotToken,
    ) -> Result<FlowOutcome>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        match self.api.get_webhook_info(token).await {
            Ok(info) => {
                console.say("")?;
                console.say("📋 Current webhook info:")?;
                for line in render_info(&info) {
                    console.say(line)?;
                }
                Ok(FlowOutcome::Succeeded)
            }
            Err(e) => {
                console.say(format!("❌ Failed to get webhook info: {e}"))?;
                Ok(FlowOutcome::Failed)
            }
        }
    }

    async fn test_connection<R, W>(
        &self,
        console: &mut Console<R, W>,
        token: &BotToken,
    ) -> Result<FlowOutcome>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        console.say("🔍 Testing bot connection...")?;
        match self.api.get_webhook_info(token).await {
            Ok(info) => {
                let url = info.url().unwrap_or("Not configured");
                console.say(format!("✅ Bot is accessible! Webhook URL: {url}"))?;
                Ok(FlowOutcome::Succeeded)
            }
            Err(e) => {
                console.say(format!("❌ Failed to connect to bot: {e}"))?;
                Ok(FlowOutcome::Failed)
            }
        }
    }

    async fn delete<R, W>(
        &self,
        console: &mut Console<R, W>,
        token: &BotToken,
    ) -> Result<FlowOutcome>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        if !console
            .confirm("Are you sure you want to delete the webhook?", false)
            .await?
        {
            console.say("❌ Cancelled.")?;
            return Ok(FlowOutcome::Aborted);
        }

        match self.api.delete_webhook(token).await {
            Ok(message) => {
                console.say(format!("✅ {message}"))?;
                Ok(FlowOutcome::Succeeded)
            }
            Err(e) => {
                console.say(format!("❌ Failed to delete webhook: {e}"))?;
                Ok(FlowOutcome::Failed)
            }
        }
    }

    async fn set<R, W>(
        &self,
        console: &mut Console<R, W>,
        token: &BotToken,
    ) -> Result<FlowOutcome>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        console.say("🔧 Setting up webhook...")?;

        let sources = [UrlSource::FunctionLookup, UrlSource::Manual].map(|s| (s, s.label()));
        let source = console
            .select("How do you want to get the webhook URL?", &sources)
            .await?;

        let url = match source {
            UrlSource::FunctionLookup => match self.lookup_function_url(console).await? {
                Some(url) => url,
                None => return Ok(FlowOutcome::Failed),
            },
            UrlSource::Manual => {
                console
                    .text("Enter webhook URL:", None, validate::webhook_url)
                    .await?
            }
        };

        let secret_token = self.choose_secret(console).await?;

        console.say("")?;
        console.say("📋 Webhook Configuration Summary:")?;
        console.say(format!("   Bot Token: {}", token.masked()))?;
        console.say(format!("   Webhook URL: {url}"))?;
        console.say(format!(
            "   Secret Token: {}",
            if secret_token.is_some() { "Yes" } else { "No" }
        ))?;

        if !console.confirm("Proceed with webhook setup?", true).await? {
            console.say("❌ Cancelled.")?;
            return Ok(FlowOutcome::Aborted);
        }

        console.say("⏳ Setting webhook...")?;
        let config = WebhookConfig { url, secret_token };
        match self.api.set_webhook(token, &config).await {
            Ok(message) => {
                console.say(format!("✅ {message}"))?;
                console.say(format!("   URL: {}", config.url))?;
                if config.secret_token.is_some() {
                    console.say("   Secret token configured")?;
                }
                console.say("")?;
                console.say("🎉 Your bot is ready to receive messages!")?;
                Ok(FlowOutcome::Succeeded)
            }
            Err(e) => {
                console.say(format!("❌ Failed to set webhook: {e}"))?;
                Ok(FlowOutcome::Failed)
            }
        }
    }

    /// `None` means the lookup failed and the reason was printed.
    async fn lookup_function_url<R, W>(
        &self,
        console: &mut Console<R, W>,
    ) -> Result<Option<String>>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let function_name = console
            .text(
                "Lambda function name:",
                Some(self.cfg.default_function_name.as_str()),
                required,
            )
            .await?;
        let region = console
            .text("AWS region:", Some(self.cfg.default_region.as_str()), required)
            .await?;

        console.say("🔍 Getting function URL from AWS...")?;
        match self
            .resolver
            .resolve_function_url(&function_name, &region)
            .await
        {
            Ok(url) => {
                console.say(format!("   Found: {url}"))?;
                Ok(Some(url))
            }
            Err(e) => {
                warn!(%function_name, %region, error = %e, "function url lookup failed");
                console.say(format!("❌ Could not get function URL: {e}"))?;
                console.say("   Please check AWS CLI configuration and permissions.")?;
                Ok(None)
            }
        }
    }

    async fn choose_secret<R, W>(&self, console: &mut Console<R, W>) -> Result<Option<String>>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        if !console
            .confirm("Use secret token for webhook security?", true)
            .await?
        {
            return Ok(None);
        }

        if console.confirm("Generate random secret token?", true).await? {
            let secret = generate_secret_token();
            console.say(format!("🔑 Generated secret token: {secret}"))?;
            return Ok(Some(secret));
        }

        console
            .text("Enter secret token:", None, validate::secret_token)
            .await
            .map(Some)
    }
}

/// Lines printed for the "info" action.
pub fn render_info(info: &WebhookInfo) -> Vec<String> {
    let mut lines = vec![
        format!("   URL: {}", info.url().unwrap_or("Not set")),
        format!("   Has custom certificate: {}", info.has_custom_certificate),
        format!("   Pending updates: {}", info.pending_update_count),
        format!(
            "   Last error: {}",
            info.last_error_message.as_deref().unwrap_or("None")
        ),
        format!(
            "   Custom secret: {}",
            if info.secret_configured { "Yes" } else { "No" }
        ),
    ];

    if let Some(ts) = info.last_error_date {
        let when = chrono::DateTime::from_timestamp(ts, 0)
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| ts.to_string());
        lines.push(format!("   Last error date: {when}"));
    }
    if let Some(max) = info.max_connections {
        lines.push(format!("   Max connections: {max}"));
    }
    if let Some(ip) = &info.ip_address {
        lines.push(format!("   IP address: {ip}"));
    }

    lines
}

fn required(raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(Error::Validation("A value is required".to_string()));
    }
    Ok(value.to_string())
}
