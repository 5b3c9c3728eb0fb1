//! Gemini `generateContent` API client

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::chat::{FunctionCall, Message, ModelClient, ModelReply, ParamKind, ToolDefinition, Usage};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolGroup>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<WireFunctionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    args: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolGroup {
    function_declarations: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new client with the given request timeout
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
        })
    }

}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    #[instrument(skip_all, fields(model = %self.model, messages = transcript.len()))]
    async fn send(&self, transcript: &[Message], system: &str, tools: &[ToolDefinition]) -> Result<ModelReply> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = build_request(transcript, system, tools);

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach the model API")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Model API returned {}: {}", status, body.trim());
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .context("Failed to parse model response")?;

        let reply = parse_response(parsed)?;
        debug!(calls = reply.calls.len(), has_text = reply.text.is_some(), "Model replied");
        Ok(reply)
    }
}

fn text_part(text: impl Into<String>) -> Part {
    Part {
        text: Some(text.into()),
        ..Default::default()
    }
}

fn build_request(transcript: &[Message], system: &str, tools: &[ToolDefinition]) -> GenerateRequest {
    let contents = transcript.iter().map(to_content).collect();

    let tools = if tools.is_empty() {
        Vec::new()
    } else {
        vec![ToolGroup {
            function_declarations: tools.iter().map(function_declaration).collect(),
        }]
    };

    GenerateRequest {
        contents,
        system_instruction: Content {
            role: None,
            parts: vec![text_part(system)],
        },
        tools,
    }
}

fn to_content(message: &Message) -> Content {
    match message {
        Message::User { text } => Content {
            role: Some("user".to_string()),
            parts: vec![text_part(text.as_str())],
        },
        Message::Model { text, calls } => {
            let mut parts = Vec::with_capacity(calls.len() + 1);
            if let Some(text) = text.as_deref().filter(|t| !t.is_empty()) {
                parts.push(text_part(text));
            }
            parts.extend(calls.iter().map(|call| Part {
                function_call: Some(WireFunctionCall {
                    name: call.name.clone(),
                    args: call.args.clone(),
                }),
                thought_signature: call.thought_signature.clone(),
                ..Default::default()
            }));
            Content {
                role: Some("model".to_string()),
                parts,
            }
        }
        // Function responses travel back on the user side of the exchange
        Message::ToolResult { name, response } => Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                function_response: Some(WireFunctionResponse {
                    name: name.clone(),
                    response: response.clone(),
                }),
                ..Default::default()
            }],
        },
    }
}

fn function_declaration(tool: &ToolDefinition) -> Value {
    let mut properties = Map::new();
    for param in &tool.parameters.params {
        let schema = match param.kind {
            ParamKind::String => json!({
                "type": "STRING",
                "description": param.description,
            }),
            ParamKind::StringArray => json!({
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": param.description,
            }),
        };
        properties.insert(param.name.clone(), schema);
    }

    let mut parameters = json!({
        "type": "OBJECT",
        "properties": properties,
    });
    let required = tool.parameters.required();
    if !required.is_empty() {
        parameters["required"] = json!(required);
    }

    json!({
        "name": tool.name,
        "description": tool.description,
        "parameters": parameters,
    })
}

fn parse_response(resp: GenerateResponse) -> Result<ModelReply> {
    let usage = resp.usage_metadata.map(|u| Usage {
        prompt_tokens: u.prompt_token_count,
        response_tokens: u.candidates_token_count,
    });

    let Some(candidate) = resp.candidates.into_iter().next() else {
        match resp.prompt_feedback {
            Some(feedback) => bail!("Model returned no candidates: {}", feedback),
            None => bail!("Model returned no candidates"),
        }
    };

    debug!(finish_reason = ?candidate.finish_reason, "Candidate received");

    let mut text = String::new();
    let mut calls = Vec::new();
    for part in candidate.content.unwrap_or_default().parts {
        if let Some(t) = part.text {
            text.push_str(&t);
        }
        if let Some(call) = part.function_call {
            calls.push(FunctionCall::new(call.name, call.args).with_thought_signature(part.thought_signature));
        }
    }

    Ok(ModelReply {
        text: (!text.is_empty()).then_some(text),
        calls,
        usage,
    })
}
