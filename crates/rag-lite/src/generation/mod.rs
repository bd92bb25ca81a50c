//! Answer generation prompts

pub mod prompt;

pub use prompt::{PromptBuilder, CONTEXT_SEPARATOR, NOT_FOUND_ANSWER};
