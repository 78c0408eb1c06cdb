//! AWS CLI adapter: Lambda Function URL lookup.
//!
//! Runs `aws lambda get-function-url-config` and reads `FunctionUrl` from the
//! JSON it prints.

use std::{path::PathBuf, process::Stdio};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use twh_core::{config::Config, errors::Error, ports::FunctionUrlResolver, Result};

const STDERR_TAIL_MAX_LINES: usize = 20;
const STDERR_TAIL_MAX_BYTES: usize = 4 * 1024;

/// A concrete CLI invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct AwsCliResolver {
    aws_path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FunctionUrlConfig {
    function_url: Option<String>,
}

impl AwsCliResolver {
    pub fn new(aws_path: impl Into<PathBuf>) -> Self {
        Self {
            aws_path: aws_path.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.aws_cli_path.clone())
    }

    pub fn build_invocation(&self, function_name: &str, region: &str) -> CliInvocation {
        CliInvocation {
            program: self.aws_path.clone(),
            args: vec![
                "lambda".to_string(),
                "get-function-url-config".to_string(),
                "--function-name".to_string(),
                function_name.to_string(),
                "--region".to_string(),
                region.to_string(),
                "--output".to_string(),
                "json".to_string(),
            ],
        }
    }
}

#[async_trait]
impl FunctionUrlResolver for AwsCliResolver {
    async fn resolve_function_url(&self, function_name: &str, region: &str) -> Result<String> {
        let inv = self.build_invocation(function_name, region);
        debug!(
            %function_name,
            %region,
            program = %inv.program.display(),
            "looking up function url"
        );

        let output = Command::new(&inv.program)
            .args(&inv.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                Error::ProviderLookup(format!("failed to run {}: {e}", inv.program.display()))
            })?;

        if !output.status.success() {
            let stderr = stderr_tail(&String::from_utf8_lossy(&output.stderr));
            warn!(status = %output.status, "aws cli lookup failed");
            if stderr.trim().is_empty() {
                return Err(Error::ProviderLookup(format!(
                    "aws exited with {}",
                    output.status
                )));
            }
            return Err(Error::ProviderLookup(format!(
                "aws exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_function_url(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Extract `FunctionUrl` from `get-function-url-config` output.
pub fn parse_function_url(stdout: &str) -> Result<String> {
    let cfg: FunctionUrlConfig = serde_json::from_str(stdout.trim()).map_err(|e| {
        Error::ProviderLookup(format!("could not parse function URL response: {e}"))
    })?;

    let url = cfg
        .function_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            Error::ProviderLookup("function URL response has no FunctionUrl field".to_string())
        })?;

    if !url.starts_with("https://") {
        return Err(Error::ProviderLookup(format!(
            "function URL is not HTTPS: {url}"
        )));
    }
    Ok(url)
}

/// Last lines of stderr, bounded in lines and bytes.
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let mut out = lines[lines.len().saturating_sub(STDERR_TAIL_MAX_LINES)..].join("\n");
    if out.len() > STDERR_TAIL_MAX_BYTES {
        let mut cut = out.len() - STDERR_TAIL_MAX_BYTES;
        while !out.is_char_boundary(cut) {
            cut += 1;
        }
        out = out[cut..].to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_targets_function_and_region() {
        let inv = AwsCliResolver::new("aws").build_invocation("Inbox", "eu-west-1");
        assert_eq!(inv.program, PathBuf::from("aws"));
        assert_eq!(
            inv.args,
            vec![
                "lambda",
                "get-function-url-config",
                "--function-name",
                "Inbox",
                "--region",
                "eu-west-1",
                "--output",
                "json"
            ]
        );
    }

    #[test]
    fn parses_function_url() {
        let out = r#"{
            "FunctionUrl": "https://abc123.lambda-url.us-east-1.on.aws/",
            "FunctionArn": "arn:aws:lambda:us-east-1:123456789012:function:Inbox",
            "AuthType": "NONE"
        }"#;
        assert_eq!(
            parse_function_url(out).unwrap(),
            "https://abc123.lambda-url.us-east-1.on.aws/"
        );
    }

    #[test]
    fn missing_url_field_is_lookup_error() {
        let err = parse_function_url(r#"{"AuthType": "NONE"}"#).unwrap_err();
        assert!(matches!(err, Error::ProviderLookup(_)));
        assert!(err.to_string().contains("no FunctionUrl"));

        let err = parse_function_url(r#"{"FunctionUrl": ""}"#).unwrap_err();
        assert!(matches!(err, Error::ProviderLookup(_)));
    }

    #[test]
    fn malformed_output_is_lookup_error() {
        let err = parse_function_url("not json").unwrap_err();
        assert!(matches!(err, Error::ProviderLookup(_)));
        assert!(err.to_string().contains("could not parse"));
    }

    #[test]
    fn plain_http_url_is_rejected() {
        let err = parse_function_url(r#"{"FunctionUrl": "http://abc.test/"}"#).unwrap_err();
        assert!(err.to_string().contains("not HTTPS"));
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let input = (0..50).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let tail = stderr_tail(&input);
        assert!(tail.starts_with("line 30"));
        assert!(tail.ends_with("line 49"));
    }

    #[tokio::test]
    async fn missing_binary_is_lookup_error() {
        let resolver = AwsCliResolver::new("/nonexistent/twh-test/aws");
        let err = resolver
            .resolve_function_url("Inbox", "us-east-1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProviderLookup(_)));
        assert!(err.to_string().contains("failed to run"));
    }

    #[cfg(unix)]
    fn fake_aws(name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = PathBuf::from(format!("/tmp/twh-fake-aws-{}-{name}", std::process::id()));
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reads_url_from_cli_output() {
        let aws = fake_aws(
            "ok",
            r#"if [ "$*" = "lambda get-function-url-config --function-name Inbox --region eu-west-1 --output json" ]; then
  echo '{"FunctionUrl": "https://abc.lambda-url.eu-west-1.on.aws/", "AuthType": "NONE"}'
  exit 0
fi
echo "unexpected args: $*" >&2
exit 2"#,
        );

        let url = AwsCliResolver::new(&aws)
            .resolve_function_url("Inbox", "eu-west-1")
            .await
            .unwrap();
        assert_eq!(url, "https://abc.lambda-url.eu-west-1.on.aws/");
        let _ = std::fs::remove_file(&aws);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let aws = fake_aws(
            "fail",
            r#"echo "An error occurred (ResourceNotFoundException) when calling the GetFunctionUrlConfig operation" >&2
exit 254"#,
        );

        let err = AwsCliResolver::new(&aws)
            .resolve_function_url("Missing", "us-east-1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProviderLookup(_)));
        assert!(err.to_string().contains("ResourceNotFoundException"));
        let _ = std::fs::remove_file(&aws);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn output_without_url_is_lookup_error() {
        let aws = fake_aws("nourl", r#"echo '{"AuthType": "AWS_IAM"}'"#);

        let err = AwsCliResolver::new(&aws)
            .resolve_function_url("Inbox", "us-east-1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no FunctionUrl"));
        let _ = std::fs::remove_file(&aws);
    }
}
