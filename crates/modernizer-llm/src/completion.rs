//! Text-in, text-out capability used by the pipeline.
//!
//! Stages only need the final text of a response, so they depend on
//! [`TextCompletion`] rather than on the streaming [`LLMProvider`] API.
//! Tests substitute deterministic stubs at this boundary.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use modernizer_core::Message;

use crate::provider::{LLMProvider, LLMStream, Result};
use crate::types::LLMChunk;

#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Send the conversation and return the complete response text.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// Drain a provider stream into a single string.
pub async fn collect_stream(mut stream: LLMStream) -> Result<String> {
    let mut content = String::new();

    while let Some(chunk) = stream.next().await {
        match chunk? {
            LLMChunk::Token(token) => content.push_str(&token),
            LLMChunk::Done => break,
        }
    }

    Ok(content)
}

/// [`TextCompletion`] backed by a streaming provider.
pub struct ProviderCompletion {
    provider: Arc<dyn LLMProvider>,
    max_output_tokens: Option<u32>,
}

impl ProviderCompletion {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            max_output_tokens: None,
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: Option<u32>) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

#[async_trait]
impl TextCompletion for ProviderCompletion {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let prompt_chars: usize = messages.iter().map(|m| m.content.len()).sum();
        log::debug!(
            "Sending {} messages ({} chars) to {} provider",
            messages.len(),
            prompt_chars,
            self.provider.name()
        );

        let stream = self
            .provider
            .chat_stream(messages, self.max_output_tokens, None)
            .await?;
        let content = collect_stream(stream).await?;

        log::debug!("Received {} chars from {}", content.len(), self.provider.name());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::stream;

    use super::*;
    use crate::provider::LLMError;

    #[derive(Default)]
    struct RecordingProvider {
        seen: Mutex<Vec<(usize, Option<u32>, Option<String>)>>,
        chunks: Vec<&'static str>,
    }

    #[async_trait]
    impl LLMProvider for RecordingProvider {
        async fn chat_stream(
            &self,
            messages: &[Message],
            max_output_tokens: Option<u32>,
            model: Option<&str>,
        ) -> Result<LLMStream> {
            self.seen.lock().expect("lock").push((
                messages.len(),
                max_output_tokens,
                model.map(str::to_string),
            ));
            let items: Vec<Result<LLMChunk>> = self
                .chunks
                .iter()
                .map(|c| Ok(LLMChunk::Token(c.to_string())))
                .chain(std::iter::once(Ok(LLMChunk::Done)))
                .collect();
            Ok(Box::pin(stream::iter(items)))
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    #[tokio::test]
    async fn collect_stream_stops_at_done() {
        let items: Vec<Result<LLMChunk>> = vec![
            Ok(LLMChunk::Token("public ".to_string())),
            Ok(LLMChunk::Token("class".to_string())),
            Ok(LLMChunk::Done),
            Ok(LLMChunk::Token("ignored".to_string())),
        ];
        let text = collect_stream(Box::pin(stream::iter(items))).await.unwrap();
        assert_eq!(text, "public class");
    }

    #[tokio::test]
    async fn collect_stream_propagates_errors() {
        let items: Vec<Result<LLMChunk>> = vec![
            Ok(LLMChunk::Token("partial".to_string())),
            Err(LLMError::Stream("connection reset".to_string())),
        ];
        let result = collect_stream(Box::pin(stream::iter(items))).await;
        assert!(matches!(result, Err(LLMError::Stream(_))));
    }

    #[tokio::test]
    async fn provider_completion_uses_provider_model_and_token_limit() {
        let provider = Arc::new(RecordingProvider {
            chunks: vec!["Hello", ", ", "world"],
            ..Default::default()
        });

        let completion = ProviderCompletion::new(provider.clone())
            .with_max_output_tokens(Some(1024));

        let text = completion
            .complete(&[Message::system("persona"), Message::user("prompt")])
            .await
            .unwrap();

        assert_eq!(text, "Hello, world");
        let seen = provider.seen.lock().expect("lock");
        assert_eq!(seen.as_slice(), &[(2, Some(1024), None)]);
    }
}
