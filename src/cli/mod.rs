//! Interactive shell over the form store, builder, and respondent flow.

pub mod commands;
pub mod core;
pub mod output;
pub mod prompts;
pub mod registry;
mod shell;

pub use shell::run_cli;
