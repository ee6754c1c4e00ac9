//! Provider Factory
//!
//! Creates LLM providers based on configuration.

use std::sync::Arc;

use modernizer_core::Config;
use reqwest::Client;

use crate::provider::{LLMError, LLMProvider};
use crate::providers::{AnthropicProvider, OpenAIProvider};

/// Available provider types
pub const AVAILABLE_PROVIDERS: &[&str] = &["openai", "anthropic"];

/// Build the HTTP client, honouring proxy settings from the config.
fn build_http_client(config: &Config) -> Result<Client, LLMError> {
    let mut builder = Client::builder();

    if !config.http_proxy.is_empty() {
        let proxy = reqwest::Proxy::http(&config.http_proxy)
            .map_err(|e| LLMError::Config(format!("Invalid HTTP proxy: {}", e)))?;
        builder = builder.proxy(proxy);
    }
    if !config.https_proxy.is_empty() {
        let proxy = reqwest::Proxy::https(&config.https_proxy)
            .map_err(|e| LLMError::Config(format!("Invalid HTTPS proxy: {}", e)))?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Create a provider based on the current configuration
pub fn create_provider(config: &Config) -> Result<Arc<dyn LLMProvider>, LLMError> {
    validate_provider_config(config)?;
    let client = build_http_client(config)?;
    let api_key = config.api_key.clone().unwrap_or_default();

    match config.provider.as_str() {
        "openai" => {
            let mut provider = OpenAIProvider::new(api_key)
                .with_client(client)
                .with_model(config.model_name())
                .with_temperature(config.temperature);

            if let Some(base_url) = non_empty(&config.api_base) {
                provider = provider.with_base_url(base_url);
            }

            log::info!(
                "Using OpenAI-compatible provider with model {}",
                config.model_name()
            );
            Ok(Arc::new(provider))
        }

        "anthropic" => {
            let mut provider = AnthropicProvider::new(api_key)
                .with_client(client)
                .with_temperature(config.temperature);

            // The pipeline default model is an OpenAI name; keep the provider's own default then
            if let Some(model) = non_empty(&config.model) {
                provider = provider.with_model(model);
            }
            if let Some(base_url) = non_empty(&config.api_base) {
                provider = provider.with_base_url(base_url);
            }
            if let Some(max_tokens) = config.max_output_tokens {
                provider = provider.with_max_tokens(max_tokens);
            }

            log::info!("Using Anthropic provider");
            Ok(Arc::new(provider))
        }

        other => Err(LLMError::Config(format!("Unknown provider: {}", other))),
    }
}

/// Validate provider configuration without creating the provider
pub fn validate_provider_config(config: &Config) -> Result<(), LLMError> {
    match config.provider.as_str() {
        "openai" => {
            // A custom base URL usually points at a local gateway that needs no key
            if non_empty(&config.api_key).is_none() && non_empty(&config.api_base).is_none() {
                return Err(LLMError::Auth(
                    "OpenAI API key is required (set API_KEY or OPENAI_API_KEY)".to_string(),
                ));
            }
            Ok(())
        }

        "anthropic" => {
            if non_empty(&config.api_key).is_none() {
                return Err(LLMError::Auth(
                    "Anthropic API key is required (set API_KEY or ANTHROPIC_API_KEY)".to_string(),
                ));
            }
            Ok(())
        }

        _ => Err(LLMError::Config(format!(
            "Unknown provider: {}. Available providers: {}",
            config.provider,
            AVAILABLE_PROVIDERS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str, api_key: Option<&str>, api_base: Option<&str>) -> Config {
        Config {
            provider: provider.to_string(),
            api_key: api_key.map(str::to_string),
            api_base: api_base.map(str::to_string),
            ..Config::default()
        }
    }

    #[test]
    fn test_create_openai_provider_success() {
        let provider = create_provider(&config("openai", Some("sk-test123"), None)).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_openai_without_key_but_with_base_url() {
        let provider =
            create_provider(&config("openai", None, Some("http://localhost:1234/v1"))).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_openai_without_key_or_base_url() {
        match create_provider(&config("openai", Some(""), None)) {
            Err(LLMError::Auth(msg)) => assert!(msg.contains("API key is required")),
            Err(other) => panic!("Expected Auth error, got {other:?}"),
            Ok(_) => panic!("Expected Auth error"),
        }
    }

    #[test]
    fn test_create_anthropic_provider() {
        let provider = create_provider(&config("anthropic", Some("sk-ant"), None)).unwrap();
        assert_eq!(provider.name(), "anthropic");

        assert!(validate_provider_config(&config("anthropic", None, Some("http://x"))).is_err());
    }

    #[test]
    fn test_create_unknown_provider() {
        match create_provider(&config("gemini", Some("key"), None)) {
            Err(LLMError::Config(msg)) => {
                assert!(msg.contains("Unknown provider"));
                assert!(msg.contains("openai, anthropic"));
            }
            Err(other) => panic!("Expected Config error, got {other:?}"),
            Ok(_) => panic!("Expected Config error"),
        }
    }
}
