//! Agent framework for autonomous task execution
//!
//! Sends the transcript to the model, runs the function calls it asks for,
//! and repeats until it answers or the round budget is spent.

mod agent_loop;
mod state;

pub use agent_loop::AgentLoop;
pub use state::{AgentConfig, AgentState, Phase};
