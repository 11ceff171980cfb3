// Text-completion client used by the AI advisor.

pub mod client;

pub use client::{
    ClaudeClient, Completion, CompletionRequest, CompletionService, LlmClient, LlmError,
};
