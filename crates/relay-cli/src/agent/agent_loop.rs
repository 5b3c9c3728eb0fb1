//! Agent loop implementation

use anyhow::{Context, Result};
use relay_core::{FunctionCall, Message, ModelClient, ToolDefinition};
use tracing::{debug, info, instrument, warn};

use crate::tools::Dispatcher;

use super::state::{AgentConfig, AgentState, Phase};

/// The agent loop orchestrator
pub struct AgentLoop {
    client: Box<dyn ModelClient>,
    dispatcher: Dispatcher,
    config: AgentConfig,
}

impl AgentLoop {
    /// Create a new agent loop
    pub fn new(client: impl ModelClient + 'static, dispatcher: Dispatcher, config: AgentConfig) -> Self {
        Self {
            client: Box::new(client),
            dispatcher,
            config,
        }
    }

    /// Drive the conversation until the model answers or the round budget runs out.
    ///
    /// Tool failures are fed back to the model; only a failed model request
    /// ends the run with an error.
    #[instrument(skip_all, fields(max_rounds = self.config.max_rounds))]
    pub async fn run(&self, prompt: &str) -> Result<AgentState> {
        info!(prompt_len = prompt.len(), root = %self.dispatcher.root(), "Starting agent loop");

        let mut state = AgentState::new(prompt);
        let tools = self.dispatcher.tool_definitions();

        while !state.phase.is_terminal() {
            let phase = std::mem::replace(&mut state.phase, Phase::AwaitingModel);
            state.phase = match phase {
                Phase::AwaitingModel => self.await_model(&mut state, &tools).await?,
                Phase::DispatchingTools(calls) => self.dispatch_tools(&mut state, calls).await,
                terminal => terminal,
            };
        }

        info!(
            rounds = state.round,
            exhausted = matches!(state.phase, Phase::Exhausted),
            prompt_tokens = state.usage.prompt_tokens,
            response_tokens = state.usage.response_tokens,
            "Agent loop finished"
        );
        Ok(state)
    }

    async fn await_model(&self, state: &mut AgentState, tools: &[ToolDefinition]) -> Result<Phase> {
        if state.round >= self.config.max_rounds {
            warn!(rounds = state.round, "Round budget exhausted");
            return Ok(Phase::Exhausted);
        }

        debug!(round = state.round + 1, messages = state.transcript().len(), "Calling model");
        let reply = self
            .client
            .send(state.transcript(), &self.config.system_prompt, tools)
            .await
            .context("Model request failed")?;
        state.round += 1;

        if let Some(usage) = reply.usage {
            state.record_usage(usage);
            if self.config.verbose {
                println!("Prompt tokens: {}", usage.prompt_tokens);
                println!("Response tokens: {}", usage.response_tokens);
            }
        }

        if !reply.has_calls() {
            info!(rounds = state.round, "Model returned a final answer");
            return Ok(Phase::Done(reply.text.unwrap_or_default()));
        }

        state.push(reply.to_message());
        Ok(Phase::DispatchingTools(reply.calls))
    }

    async fn dispatch_tools(&self, state: &mut AgentState, calls: Vec<FunctionCall>) -> Phase {
        debug!(tool_count = calls.len(), "Processing tool calls");

        let mut results = Vec::with_capacity(calls.len());
        for call in &calls {
            let result = self.dispatcher.dispatch(call).await;
            results.push(Message::tool_result(call.name.as_str(), result.to_response()));
        }

        for message in results {
            state.push(message);
        }
        Phase::AwaitingModel
    }
}
