//! External capability hand-off.
//!
//! Some messages are better served by an external tool server (web search,
//! code execution) than by a model. The routing crate decides *whether* a
//! message needs a tool and produces a [`ToolRequest`]; a [`ToolInvoker`]
//! carries it out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// The capability a tool request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    WebSearch,
    CodeExecution,
}

impl ToolKind {
    /// The tool name exposed by the target server.
    pub fn tool_name(&self) -> &'static str {
        match self {
            ToolKind::WebSearch => "search_web",
            ToolKind::CodeExecution => "execute_code",
        }
    }

    /// The server expected to host the tool.
    pub fn target_server(&self) -> &'static str {
        match self {
            ToolKind::WebSearch => "web_search",
            ToolKind::CodeExecution => "run_python",
        }
    }
}

/// A request to hand a message to an external tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub kind: ToolKind,
    pub tool_name: String,
    pub tool_input: String,
    pub target_server: String,
    pub reason: String,
}

impl ToolRequest {
    pub fn new(kind: ToolKind, tool_input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            tool_name: kind.tool_name().into(),
            tool_input: tool_input.into(),
            target_server: kind.target_server().into(),
            reason: reason.into(),
        }
    }
}

/// Executes tool requests against external servers.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Run the tool and return its raw textual output.
    async fn invoke(&self, request: &ToolRequest) -> std::result::Result<String, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_derives_names_from_kind() {
        let req = ToolRequest::new(ToolKind::WebSearch, "rust news", "explicit search");
        assert_eq!(req.tool_name, "search_web");
        assert_eq!(req.target_server, "web_search");

        let req = ToolRequest::new(ToolKind::CodeExecution, "print(1)", "explicit run");
        assert_eq!(req.tool_name, "execute_code");
        assert_eq!(req.target_server, "run_python");
    }
}
