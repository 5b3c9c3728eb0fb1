//! Error taxonomy for tool execution

use std::time::Duration;

/// Every predictable way a tool call can fail.
///
/// None of these abort the agent loop; they are reported back to the model as
/// an `error` payload so it can adjust its plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("Cannot {action} \"{path}\" as it is outside the permitted working directory")]
    OutOfSandbox { action: &'static str, path: String },

    #[error("File not found or is not a regular file: \"{path}\"")]
    NotFound { path: String },

    #[error("\"{path}\" is not a directory")]
    NotADirectory { path: String },

    #[error("Cannot read \"{path}\" as it is not a text file")]
    NotText { path: String },

    #[error("\"{path}\" is not a .{extension} file")]
    WrongFileType { path: String, extension: String },

    #[error("Execution of \"{path}\" timed out after {} seconds", .timeout.as_secs())]
    Timeout { path: String, timeout: Duration },

    #[error("Unknown function: {name}")]
    UnknownTool { name: String },

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("{0}")]
    Unexpected(String),
}

impl ToolError {
    /// Stable tag naming the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::OutOfSandbox { .. } => "out_of_sandbox",
            ToolError::NotFound { .. } => "not_found",
            ToolError::NotADirectory { .. } => "not_a_directory",
            ToolError::NotText { .. } => "not_text",
            ToolError::WrongFileType { .. } => "wrong_file_type",
            ToolError::Timeout { .. } => "timeout",
            ToolError::UnknownTool { .. } => "unknown_tool",
            ToolError::InvalidArguments { .. } => "invalid_arguments",
            ToolError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<std::io::Error> for ToolError {
    fn from(e: std::io::Error) -> Self {
        ToolError::Unexpected(e.to_string())
    }
}
