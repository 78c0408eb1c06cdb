//! Input validators used by the prompt loops.
//!
//! Each returns the normalized value or `Error::Validation` with the message
//! shown to the operator before re-prompting.

use crate::{errors::Error, Result};

pub const SECRET_TOKEN_MIN_LEN: usize = 8;
pub const SECRET_TOKEN_MAX_LEN: usize = 256;

pub fn bot_token(raw: &str) -> Result<String> {
    let token = raw.trim();
    let starts_with_digit = token.chars().next().is_some_and(|c| c.is_ascii_digit());
    if !starts_with_digit || token.chars().any(char::is_whitespace) {
        return Err(Error::Validation(
            "Please enter a valid Telegram bot token".to_string(),
        ));
    }
    Ok(token.to_string())
}

pub fn webhook_url(raw: &str) -> Result<String> {
    let url = raw.trim();
    match url.strip_prefix("https://") {
        Some(rest) if !rest.is_empty() && !rest.chars().any(char::is_whitespace) => {
            Ok(url.to_string())
        }
        _ => Err(Error::Validation(
            "Please enter a valid HTTPS URL".to_string(),
        )),
    }
}

/// Telegram accepts 1-256 chars of `A-Z a-z 0-9 _ -`; we also require 8+.
pub fn secret_token(raw: &str) -> Result<String> {
    let token = raw.trim();
    let len = token.chars().count();
    if len < SECRET_TOKEN_MIN_LEN {
        return Err(Error::Validation(format!(
            "Secret token must be at least {SECRET_TOKEN_MIN_LEN} characters"
        )));
    }
    if len > SECRET_TOKEN_MAX_LEN {
        return Err(Error::Validation(format!(
            "Secret token must be at most {SECRET_TOKEN_MAX_LEN} characters"
        )));
    }
    if !token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::Validation(
            "Secret token may only contain A-Z, a-z, 0-9, _ and -".to_string(),
        ));
    }
    Ok(token.to_string())
}
