//! Agent state management

use relay_core::{FunctionCall, Message, Usage};

/// Configuration for the agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model rounds allowed before giving up
    pub max_rounds: usize,
    /// System instructions sent with every request
    pub system_prompt: String,
    /// Whether to print token usage per round
    pub verbose: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_rounds: 20,
            system_prompt: crate::prompt::SYSTEM_PROMPT.to_string(),
            verbose: false,
        }
    }
}

impl AgentConfig {
    pub fn with_max_rounds(mut self, max: usize) -> Self {
        self.max_rounds = max;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Where the loop is in its cycle
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Next step sends the transcript to the model
    AwaitingModel,
    /// The model asked for these calls, in order
    DispatchingTools(Vec<FunctionCall>),
    /// The model gave a final answer
    Done(String),
    /// The round budget ran out
    Exhausted,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done(_) | Phase::Exhausted)
    }
}

/// State of the agent during execution
#[derive(Debug)]
pub struct AgentState {
    transcript: Vec<Message>,
    /// Completed model rounds
    pub round: usize,
    pub phase: Phase,
    /// Token usage summed over all rounds
    pub usage: Usage,
}

impl AgentState {
    /// Start a run from the user's prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            transcript: vec![Message::user(prompt)],
            round: 0,
            phase: Phase::AwaitingModel,
            usage: Usage::default(),
        }
    }

    /// Append-only view of the conversation
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn push(&mut self, message: Message) {
        self.transcript.push(message);
    }

    pub fn record_usage(&mut self, usage: Usage) {
        self.usage.prompt_tokens += usage.prompt_tokens;
        self.usage.response_tokens += usage.response_tokens;
    }

    /// The final answer, if the model produced one
    pub fn final_response(&self) -> Option<&str> {
        match &self.phase {
            Phase::Done(text) => Some(text),
            _ => None,
        }
    }
}
