use std::{env, path::PathBuf, time::Duration};

use crate::{errors::Error, Result};

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FUNCTION_NAME: &str = "SecondBrainProcessor";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Typed configuration for the configurator.
///
/// Everything here has a sensible default. Environment variables only
/// override endpoints and prompt defaults; the bot token is never read from
/// the environment.
#[derive(Clone, Debug)]
pub struct Config {
    // Bot API
    pub telegram_api_base: String,
    pub http_timeout: Duration,

    // Function URL lookup
    pub aws_cli_path: PathBuf,
    pub default_function_name: String,
    pub default_region: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            aws_cli_path: PathBuf::from("aws"),
            default_function_name: DEFAULT_FUNCTION_NAME.to_string(),
            default_region: DEFAULT_REGION.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (process env in `load`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);
        let defaults = Self::default();

        let telegram_api_base = get("TELEGRAM_API_BASE")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.telegram_api_base);

        let http_timeout = match get("WEBHOOK_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                Duration::from_secs(parse_positive_u64("WEBHOOK_HTTP_TIMEOUT_SECS", &raw)?)
            }
            None => defaults.http_timeout,
        };

        let aws_cli_path = get("AWS_CLI_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.aws_cli_path);

        let default_function_name =
            get("WEBHOOK_FUNCTION_NAME").unwrap_or(defaults.default_function_name);

        // Same precedence the AWS CLI itself uses.
        let default_region = get("AWS_REGION")
            .or_else(|| get("AWS_DEFAULT_REGION"))
            .unwrap_or(defaults.default_region);

        Ok(Self {
            telegram_api_base,
            http_timeout,
            aws_cli_path,
            default_function_name,
            default_region,
        })
    }
}

fn parse_positive_u64(key: &str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(Error::Config(format!("{key} must be greater than zero"))),
        Ok(v) => Ok(v),
        Err(_) => Err(Error::Config(format!(
            "{key} must be a whole number of seconds, got {raw:?}"
        ))),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.trim().to_string())
    }
}
