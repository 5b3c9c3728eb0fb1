//! Tool framework for agent-based execution
//!
//! Tools operate on paths relative to a [`WorkingRoot`] and never see a root
//! chosen by the model.

pub mod builtin;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod root;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

pub use dispatch::Dispatcher;
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use relay_core::{ParamKind, ParameterSchema, ToolDefinition};
pub use root::WorkingRoot;

/// Outcome of one tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolResult {
    Success(String),
    Failure(ToolError),
}

impl ToolResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success(_))
    }

    /// Wire form sent back to the model: `{"result": ..}` or `{"error": ..}`
    pub fn to_response(&self) -> Value {
        match self {
            ToolResult::Success(output) => json!({ "result": output }),
            ToolResult::Failure(err) => json!({ "error": err.to_string() }),
        }
    }
}

impl From<Result<String, ToolError>> for ToolResult {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(output) => ToolResult::Success(output),
            Err(err) => ToolResult::Failure(err),
        }
    }
}

/// Context provided to tools during execution
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Sandbox root, injected by the dispatcher
    pub root: WorkingRoot,
    /// Maximum characters returned by a file read
    pub max_chars: usize,
    /// Wall-clock budget for script execution
    pub script_timeout: Duration,
}

impl ToolContext {
    /// Create a new context with default limits
    pub fn new(root: WorkingRoot) -> Self {
        Self {
            root,
            max_chars: 10_000,
            script_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = timeout;
        self
    }
}

/// The Tool trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name
    fn name(&self) -> &str;

    /// Get a description of what the tool does
    fn description(&self) -> &str;

    /// Get the parameter schema
    fn parameters_schema(&self) -> ParameterSchema;

    /// Execute the tool with the given argument object
    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<String, ToolError>;

    /// Convert to a tool definition for the model
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters_schema())
    }
}

/// Populate a tool's typed argument struct from the model's mapping
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}
