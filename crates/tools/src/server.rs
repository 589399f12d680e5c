//! HTTP client for a single tool server.
//!
//! Protocol: `POST {url}/execute` with `{"tool_name", "tool_input"}` and an
//! optional bearer token. The server answers `{"result": ...}` on success or
//! `{"error": "..."}` on a tool-level failure.

use std::time::Duration;

use parley_config::ToolServerConfig;
use parley_core::error::ToolError;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    tool_name: &'a str,
    tool_input: &'a str,
}

pub struct ToolServer {
    name: String,
    url: String,
    api_key: Option<String>,
    description: Option<String>,
    client: reqwest::Client,
}

impl ToolServer {
    pub fn new(name: impl Into<String>, url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build HTTP client with timeout, using defaults");
                reqwest::Client::new()
            });

        Self {
            name: name.into(),
            url: url.into().trim_end_matches('/').to_string(),
            api_key: None,
            description: None,
            client,
        }
    }

    pub fn from_config(name: &str, config: &ToolServerConfig, timeout: Duration) -> Self {
        let mut server = Self::new(name, config.url.clone(), timeout);
        server.api_key = config.api_key.clone();
        server.description = config.description.clone();
        server
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Run `tool_name` on this server and return its textual output.
    pub async fn execute(&self, tool_name: &str, tool_input: &str) -> Result<String, ToolError> {
        let failed = |reason: String| ToolError::ExecutionFailed {
            tool_name: tool_name.to_string(),
            reason,
        };

        let mut request = self
            .client
            .post(format!("{}/execute", self.url))
            .json(&ExecuteRequest {
                tool_name,
                tool_input,
            });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!(server = %self.name, tool = tool_name, "Calling tool server");
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ToolError::NotConnected(self.name.clone())
            } else {
                failed(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| failed(e.to_string()))?;
        if !status.is_success() {
            warn!(server = %self.name, status = status.as_u16(), body = %body, "Tool server returned error");
            return Err(failed(format!("HTTP {}: {body}", status.as_u16())));
        }

        parse_output(&body).map_err(failed)
    }
}

/// Extract the tool output from a response body. Non-JSON bodies are the output.
fn parse_output(body: &str) -> Result<String, String> {
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) else {
        return Ok(body.to_string());
    };

    if let Some(error) = object.get("error").filter(|e| !e.is_null()) {
        return Err(match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
    }

    match object.get("result") {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => Ok(body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_at(uri: &str) -> ToolServer {
        ToolServer::new("web_search", uri, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn posts_request_with_bearer_token() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .and(header("authorization", "Bearer ws-key"))
            .and(body_json(serde_json::json!({
                "tool_name": "search_web",
                "tool_input": "rust 1.88"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"result": "Rust 1.88 released"})),
            )
            .expect(1)
            .mount(&mock)
            .await;

        let server = server_at(&format!("{}/", mock.uri())).with_api_key("ws-key");
        let output = server.execute("search_web", "rust 1.88").await.unwrap();
        assert_eq!(output, "Rust 1.88 released");
    }

    #[tokio::test]
    async fn structured_result_is_serialized() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"result": {"stdout": "2\n"}})),
            )
            .mount(&mock)
            .await;

        let output = server_at(&mock.uri())
            .execute("execute_code", "print(1+1)")
            .await
            .unwrap();
        assert_eq!(output, r#"{"stdout":"2\n"}"#);
    }

    #[tokio::test]
    async fn tool_error_body_fails() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"error": "quota exceeded"})),
            )
            .mount(&mock)
            .await;

        let err = server_at(&mock.uri())
            .execute("search_web", "clima")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn http_error_status_fails() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&mock)
            .await;

        let err = server_at(&mock.uri())
            .execute("search_web", "clima")
            .await
            .unwrap_err();
        let ToolError::ExecutionFailed { tool_name, reason } = err else {
            panic!("expected an execution failure");
        };
        assert_eq!(tool_name, "search_web");
        assert!(reason.contains("503"));
        assert!(reason.contains("overloaded"));
    }

    #[test]
    fn plain_text_body_is_the_output() {
        assert_eq!(parse_output("sunny, 25C").unwrap(), "sunny, 25C");
        assert_eq!(parse_output(r#"{"result": null, "error": null}"#).unwrap(), "null");
    }
}
