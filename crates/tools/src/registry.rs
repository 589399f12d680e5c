//! Tool server registry: routes tool requests to the server they target.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parley_config::ToolsConfig;
use parley_core::error::ToolError;
use parley_core::{ToolInvoker, ToolRequest};
use tracing::{debug, info};

use crate::server::ToolServer;

/// Every configured tool server, keyed by name.
#[derive(Default, Clone)]
pub struct ToolServerRegistry {
    servers: HashMap<String, Arc<ToolServer>>,
}

impl ToolServerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a server under its own name.
    pub fn register(&mut self, server: ToolServer) {
        self.servers.insert(server.name().to_string(), Arc::new(server));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ToolServer>> {
        self.servers.get(name)
    }

    /// Registered server names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.servers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

#[async_trait]
impl ToolInvoker for ToolServerRegistry {
    async fn invoke(&self, request: &ToolRequest) -> Result<String, ToolError> {
        let server = self
            .servers
            .get(&request.target_server)
            .ok_or_else(|| ToolError::NotConnected(request.target_server.clone()))?;

        let output = server.execute(&request.tool_name, &request.tool_input).await?;
        debug!(
            server = %request.target_server,
            tool = %request.tool_name,
            chars = output.chars().count(),
            "Tool call completed"
        );
        Ok(output)
    }
}

/// Build a client for every server under `[tools.servers]`.
pub fn build_from_config(config: &ToolsConfig) -> ToolServerRegistry {
    let timeout = Duration::from_secs(config.timeout_secs);
    let mut registry = ToolServerRegistry::new();

    for (name, server) in &config.servers {
        registry.register(ToolServer::from_config(name, server, timeout));
    }

    if !registry.is_empty() {
        info!(servers = ?registry.names(), "Tool servers configured");
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_config::ToolServerConfig;
    use parley_core::ToolKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_with(servers: &[(&str, &str)]) -> ToolsConfig {
        ToolsConfig {
            servers: servers
                .iter()
                .map(|(name, url)| {
                    (
                        name.to_string(),
                        ToolServerConfig {
                            url: url.to_string(),
                            ..ToolServerConfig::default()
                        },
                    )
                })
                .collect(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn builds_one_client_per_server() {
        let registry = build_from_config(&config_with(&[
            ("web_search", "http://localhost:8001/"),
            ("run_python", "http://localhost:8002"),
        ]));
        assert_eq!(registry.names(), vec!["run_python", "web_search"]);
        assert_eq!(registry.get("web_search").unwrap().url(), "http://localhost:8001");
    }

    #[tokio::test]
    async fn request_goes_to_target_server() {
        let search = MockServer::start().await;
        let python = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "2"})))
            .expect(1)
            .mount(&python)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&search)
            .await;

        let (search_uri, python_uri) = (search.uri(), python.uri());
        let registry = build_from_config(&config_with(&[
            ("web_search", search_uri.as_str()),
            ("run_python", python_uri.as_str()),
        ]));
        let request = ToolRequest::new(ToolKind::CodeExecution, "print(1+1)", "code keyword");

        assert_eq!(registry.invoke(&request).await.unwrap(), "2");
    }

    #[tokio::test]
    async fn unknown_server_is_not_connected() {
        let registry = build_from_config(&config_with(&[("run_python", "http://localhost:8002")]));
        let request = ToolRequest::new(ToolKind::WebSearch, "clima hoje", "search keyword");

        let err = registry.invoke(&request).await.unwrap_err();
        assert!(matches!(err, ToolError::NotConnected(ref name) if name == "web_search"));
    }

    #[tokio::test]
    async fn refused_connection_is_not_connected() {
        let registry = build_from_config(&config_with(&[("web_search", "http://127.0.0.1:1")]));
        let request = ToolRequest::new(ToolKind::WebSearch, "clima hoje", "search keyword");

        let err = registry.invoke(&request).await.unwrap_err();
        assert!(matches!(err, ToolError::NotConnected(_)));
    }
}
