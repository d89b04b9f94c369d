/// Execution Oracle Adapter
///
/// **Core Responsibility:**
/// Send a script to the remote execution oracle and hand back its captured
/// output untouched.
///
/// **Critical Architectural Boundary:**
/// - Adapter knows HOW to talk to the oracle (HTTP, credentials, deadline)
/// - Adapter does NOT interpret output
/// - Adapter does NOT retry; that is a caller policy
///
/// Production uses [`JDoodleOracle`]; tests plug in their own
/// [`ExecutionOracle`] implementations.

use async_trait::async_trait;
use codesync_common::config::OracleConfig;
use codesync_common::types::ErrorKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Banner JDoodle prints into `output` when the program hit its CPU limit
pub const ORACLE_TIMEOUT_MARKER: &str = "JDoodle - Timeout";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("execution oracle unreachable: {0}")]
    Transport(String),
    #[error("execution oracle rejected the request (status {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("execution oracle did not answer within {timeout_ms}ms")]
    DeadlineExceeded { timeout_ms: u64 },
    #[error("program exceeded the oracle's execution time limit")]
    ExecutionTimeout { output: String },
}

impl OracleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OracleError::ExecutionTimeout { .. } => ErrorKind::ExecutionTimeout,
            OracleError::Transport(_)
            | OracleError::Rejected { .. }
            | OracleError::DeadlineExceeded { .. } => ErrorKind::OracleUnavailable,
        }
    }

    /// Diagnostic text for the end user. Timeouts carry whatever the
    /// program printed before it was stopped.
    pub fn diagnostic(&self) -> String {
        match self {
            OracleError::ExecutionTimeout { output } if !output.trim().is_empty() => {
                format!("{}\n{}", self, output.trim())
            }
            _ => self.to_string(),
        }
    }
}

/// One request/response round trip against an execution oracle
#[async_trait]
pub trait ExecutionOracle: Send + Sync {
    async fn execute(&self, script: &str, language: &str, version: &str) -> Result<String, OracleError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JDoodleRequest<'a> {
    script: &'a str,
    language: &'a str,
    version_index: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JDoodleResponse {
    output: Option<String>,
    error: Option<String>,
    status_code: Option<u16>,
}

/// HTTP client for the JDoodle execute API
pub struct JDoodleOracle {
    client: reqwest::Client,
    endpoint: String,
    client_id: String,
    client_secret: String,
    timeout: Duration,
}

impl JDoodleOracle {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .context("Failed to build HTTP client for the execution oracle")?;

        if config.client_id.is_empty() || config.client_secret.is_empty() {
            warn!("Execution oracle credentials are empty; requests will likely be rejected");
        }

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            timeout,
        })
    }

    async fn round_trip(&self, script: &str, language: &str, version: &str) -> Result<String, OracleError> {
        let request = JDoodleRequest {
            script,
            language,
            version_index: version,
            client_id: &self.client_id,
            client_secret: &self.client_secret,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        classify_response(status, &body)
    }
}

#[async_trait]
impl ExecutionOracle for JDoodleOracle {
    #[tracing::instrument(skip_all, fields(language = %language, version = %version, script_bytes = script.len()))]
    async fn execute(&self, script: &str, language: &str, version: &str) -> Result<String, OracleError> {
        let start = Instant::now();

        // HARD DEADLINE: the whole round trip, not just connect
        let result = match tokio::time::timeout(self.timeout, self.round_trip(script, language, version)).await {
            Ok(result) => result,
            Err(_) => Err(OracleError::DeadlineExceeded {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        };

        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "Oracle round trip finished"
        );

        result
    }
}

/// Map an oracle HTTP response onto captured output or an [`OracleError`]
fn classify_response(status: u16, body: &str) -> Result<String, OracleError> {
    let parsed: Option<JDoodleResponse> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = parsed
            .and_then(|r| r.error)
            .unwrap_or_else(|| body.trim().to_string());
        return Err(OracleError::Rejected { status, message });
    }

    let response = parsed.ok_or_else(|| {
        OracleError::Transport(format!("malformed oracle response: {}", body.trim()))
    })?;

    if let Some(message) = response.error {
        return Err(OracleError::Rejected {
            status: response.status_code.unwrap_or(status),
            message,
        });
    }

    if let Some(code) = response.status_code.filter(|c| !(200..300).contains(c)) {
        return Err(OracleError::Rejected {
            status: code,
            message: response.output.unwrap_or_default(),
        });
    }

    let output = response
        .output
        .ok_or_else(|| OracleError::Transport("oracle response carried no output".to_string()))?;

    // The banner is a line of its own; verdict data may quote it
    if output.lines().any(|line| line.trim() == ORACLE_TIMEOUT_MARKER) {
        return Err(OracleError::ExecutionTimeout { output });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success() {
        let body = r#"{"output":"[{\"passed\":true}]\n","statusCode":200,"memory":"1024","cpuTime":"0.05"}"#;
        assert_eq!(classify_response(200, body).unwrap(), "[{\"passed\":true}]\n");
    }

    #[test]
    fn test_classify_candidate_stderr_is_still_output() {
        let body = r#"{"output":"/tmp/x.js:1\nfunction twoSum( {\nSyntaxError: Unexpected token '{'","statusCode":200}"#;
        let output = classify_response(200, body).unwrap();
        assert!(output.contains("SyntaxError"));
    }

    #[test]
    fn test_classify_http_error() {
        let body = r#"{"error":"Unauthorized Request","statusCode":401}"#;
        let err = classify_response(401, body).unwrap_err();
        assert_eq!(
            err,
            OracleError::Rejected {
                status: 401,
                message: "Unauthorized Request".to_string()
            }
        );
        assert_eq!(err.kind(), ErrorKind::OracleUnavailable);
    }

    #[test]
    fn test_classify_daily_limit_in_body() {
        let body = r#"{"error":"Daily limit reached","statusCode":429}"#;
        let err = classify_response(200, body).unwrap_err();
        assert!(matches!(err, OracleError::Rejected { status: 429, .. }));
    }

    #[test]
    fn test_classify_non_json_body() {
        let err = classify_response(502, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, OracleError::Rejected { status: 502, .. }));

        let err = classify_response(200, "not json").unwrap_err();
        assert!(matches!(err, OracleError::Transport(_)));
        assert_eq!(err.kind(), ErrorKind::OracleUnavailable);
    }

    #[test]
    fn test_classify_oracle_timeout() {
        let body = r#"{"output":"\n\n\n JDoodle - Timeout \nIf your program reads input, please enter the inputs","statusCode":200}"#;
        let err = classify_response(200, body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExecutionTimeout);
        assert!(err.diagnostic().contains("JDoodle - Timeout"));
    }

    #[test]
    fn test_classify_marker_inside_verdicts_is_output() {
        let body = r#"{"output":"[{\"passed\":false,\"actual\":\"\\\"JDoodle - Timeout\\\"\",\"expected\":\"\\\"ok\\\"\",\"input\":\"[]\"}]\n","statusCode":200}"#;
        let output = classify_response(200, body).unwrap();
        assert!(output.starts_with("[{\"passed\":false"));
        assert!(output.contains("JDoodle - Timeout"));
    }

    #[tokio::test]
    async fn test_silent_oracle_hits_deadline() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            // Accept and hold connections without ever answering
            let mut held = Vec::new();
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => held.push(stream),
                    Err(_) => break,
                }
            }
        });

        let oracle = JDoodleOracle::new(&OracleConfig {
            endpoint: format!("http://{}/v1/execute", addr),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            timeout_ms: 50,
        })
        .unwrap();

        let err = oracle.execute("console.log(1)", "nodejs", "4").await.unwrap_err();
        assert_eq!(err, OracleError::DeadlineExceeded { timeout_ms: 50 });
        assert_eq!(err.kind(), ErrorKind::OracleUnavailable);

        server.abort();
    }

    #[test]
    fn test_deadline_is_oracle_unavailable() {
        let err = OracleError::DeadlineExceeded { timeout_ms: 15000 };
        assert_eq!(err.kind(), ErrorKind::OracleUnavailable);
        assert!(err.diagnostic().contains("15000ms"));
    }
}
