//! relay: a command-line coding agent
//!
//! Relays a prompt to a hosted model and runs the function calls it requests
//! (list, read, write, run) inside a sandboxed working directory.

pub mod agent;
pub mod prompt;
pub mod tools;
