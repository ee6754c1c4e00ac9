//! Server-sent events to text chunks.
//!
//! Both providers stream text over SSE and only differ in how a frame is
//! decoded, so framing, blank-frame skipping and end-of-stream handling live
//! here and each provider supplies a frame decoder.

use eventsource_stream::Eventsource;
use futures_util::{future, StreamExt};
use reqwest::Response;

use crate::provider::{LLMError, LLMStream, Result};
use crate::types::LLMChunk;

/// Build a text stream from an SSE response.
///
/// `decode` gets each frame's event name and data. Frames with blank data and
/// empty tokens are dropped. The stream ends after [`LLMChunk::Done`] or after
/// the first error, which is reported as [`LLMError::Stream`].
pub fn text_stream_from_sse<D>(response: Response, mut decode: D) -> LLMStream
where
    D: FnMut(&str, &str) -> Result<Option<LLMChunk>> + Send + 'static,
{
    let stream = response
        .bytes_stream()
        .eventsource()
        .filter_map(move |frame| {
            let decoded = match frame {
                Err(e) => Some(Err(LLMError::Stream(e.to_string()))),
                Ok(frame) if frame.data.trim().is_empty() => None,
                Ok(frame) => match decode(&frame.event, &frame.data) {
                    Ok(Some(LLMChunk::Token(text))) if text.is_empty() => None,
                    Ok(chunk) => chunk.map(Ok),
                    Err(LLMError::Stream(msg)) => Some(Err(LLMError::Stream(msg))),
                    Err(other) => Some(Err(LLMError::Stream(other.to_string()))),
                },
            };
            future::ready(decoded)
        })
        .scan(false, |finished, item| {
            if *finished {
                return future::ready(None);
            }
            *finished = matches!(item, Ok(LLMChunk::Done) | Err(_));
            future::ready(Some(item))
        });

    Box::pin(stream)
}
