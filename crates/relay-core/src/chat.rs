//! Conversation data model shared by the agent loop and model clients

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Speaker of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
    Tool,
}

/// A function call requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Tool/function name
    pub name: String,
    /// Arguments as a JSON object
    pub args: Map<String, Value>,
    /// Opaque token some models attach to a call; echoed back unchanged
    pub thought_signature: Option<String>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            args,
            thought_signature: None,
        }
    }

    pub fn with_thought_signature(mut self, signature: Option<String>) -> Self {
        self.thought_signature = signature;
        self
    }
}

/// One entry of the conversation transcript
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Prompt supplied by the user
    User { text: String },
    /// A model turn, possibly carrying function calls
    Model {
        text: Option<String>,
        calls: Vec<FunctionCall>,
    },
    /// Outcome of one function call, in the `{"result": ..}` / `{"error": ..}` shape
    ToolResult { name: String, response: Value },
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Message::User { text: text.into() }
    }

    pub fn tool_result(name: impl Into<String>, response: Value) -> Self {
        Message::ToolResult {
            name: name.into(),
            response,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::User { .. } => Role::User,
            Message::Model { .. } => Role::Model,
            Message::ToolResult { .. } => Role::Tool,
        }
    }
}

/// Token accounting reported by the model for one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub response_tokens: u64,
}

/// What the model returned for one round
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    /// Concatenated text parts, if any
    pub text: Option<String>,
    /// Pending function calls in the order the model issued them
    pub calls: Vec<FunctionCall>,
    pub usage: Option<Usage>,
}

impl ModelReply {
    /// A final answer with no pending calls
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// A reply that only requests function calls
    pub fn calls(calls: Vec<FunctionCall>) -> Self {
        Self {
            calls,
            ..Default::default()
        }
    }

    pub fn has_calls(&self) -> bool {
        !self.calls.is_empty()
    }

    /// The transcript entry recording this model turn
    pub fn to_message(&self) -> Message {
        Message::Model {
            text: self.text.clone(),
            calls: self.calls.clone(),
        }
    }
}

/// Type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    StringArray,
}

/// Schema entry for a single parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    pub required: bool,
}

/// Ordered parameter list for a tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSchema {
    pub params: Vec<ParameterSpec>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, name: impl Into<String>, kind: ParamKind, description: impl Into<String>, required: bool) -> Self {
        self.params.push(ParameterSpec {
            name: name.into(),
            kind,
            description: description.into(),
            required,
        });
        self
    }

    pub fn with_required(self, name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        self.push(name, kind, description, true)
    }

    pub fn with_optional(self, name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        self.push(name, kind, description, false)
    }

    /// Names of required parameters, in declaration order
    pub fn required(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// A capability advertised to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: ParameterSchema) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Request/response contract the agent loop depends on.
///
/// Any backend (or a test double) that can turn a transcript, a system
/// instruction and a set of tool schemas into a [`ModelReply`] can drive the loop.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn send(
        &self,
        transcript: &[Message],
        system: &str,
        tools: &[ToolDefinition],
    ) -> anyhow::Result<ModelReply>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_roles() {
        assert_eq!(Message::user("hi").role(), Role::User);
        assert_eq!(ModelReply::text("done").to_message().role(), Role::Model);
        assert_eq!(
            Message::tool_result("x", json!({"result": "ok"})).role(),
            Role::Tool
        );
    }

    #[test]
    fn test_reply_has_calls() {
        assert!(!ModelReply::text("answer").has_calls());

        let reply = ModelReply::calls(vec![FunctionCall::new("get_files_info", Map::new())]);
        assert!(reply.has_calls());
        assert!(reply.text.is_none());
    }

    #[test]
    fn test_schema_keeps_declaration_order() {
        let schema = ParameterSchema::new()
            .with_required("file_path", ParamKind::String, "path")
            .with_optional("args", ParamKind::StringArray, "arguments")
            .with_required("content", ParamKind::String, "body");

        let names: Vec<_> = schema.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["file_path", "args", "content"]);
        assert_eq!(schema.required(), ["file_path", "content"]);
    }
}
