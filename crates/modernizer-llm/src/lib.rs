pub mod completion;
pub mod provider;
pub mod provider_factory;
pub mod providers;
pub mod types;

pub use completion::{collect_stream, ProviderCompletion, TextCompletion};
pub use provider::{LLMError, LLMProvider, LLMStream};
pub use provider_factory::{create_provider, validate_provider_config, AVAILABLE_PROVIDERS};
pub use providers::{AnthropicProvider, OpenAIProvider};
pub use types::LLMChunk;
