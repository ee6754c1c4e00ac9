//! LLM Providers
//!
//! Streaming chat providers the pipeline can run against.

pub(crate) mod common;
pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAIProvider;
