//! relay-core: Shared library for the relay agent
//!
//! Provides:
//! - Configuration loading (relay.toml)
//! - Conversation data model and the model client contract
//! - Gemini API client

pub mod chat;
pub mod config;
pub mod gemini;

pub use chat::{
    FunctionCall, Message, ModelClient, ModelReply, ParamKind, ParameterSchema, ParameterSpec,
    Role, ToolDefinition, Usage,
};
pub use config::{ConfigError, Settings};
pub use gemini::GeminiClient;
