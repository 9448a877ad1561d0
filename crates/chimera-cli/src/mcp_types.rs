//! Plain data types for the MCP tool/resource surface. The JSON-RPC framing
//! that would serve these over the wire is a separate adapter crate; this
//! module exists so that adapter has a single source of truth for names and
//! response shapes.

use serde::{Deserialize, Serialize};

/// The write-side tools MCP exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum McpTool {
    ExecuteDeployment,
    RollbackDeployment,
    CheckCongruence,
}

impl McpTool {
    pub fn name(self) -> &'static str {
        match self {
            McpTool::ExecuteDeployment => "execute_deployment",
            McpTool::RollbackDeployment => "rollback_deployment",
            McpTool::CheckCongruence => "check_congruence",
        }
    }
}

/// The read-side resources MCP exposes, addressed by URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpResource {
    NodeHealth,
    Deployment { session_id: String },
}

impl McpResource {
    pub fn uri(&self) -> String {
        match self {
            McpResource::NodeHealth => "node://health".to_string(),
            McpResource::Deployment { session_id } => format!("deployment://{session_id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum McpStatus {
    Success,
    Failed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum McpErrorCode {
    ToolNotFound,
    ResourceNotFound,
    InternalError,
}

/// The JSON envelope every tool call and resource read responds with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub status: McpStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<McpErrorCode>,
}

impl McpResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: McpStatus::Success,
            message: message.into(),
            error_code: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: McpStatus::Failed,
            message: message.into(),
            error_code: None,
        }
    }

    pub fn error(code: McpErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: McpStatus::Error,
            message: message.into(),
            error_code: Some(code),
        }
    }
}
