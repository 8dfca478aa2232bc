//! Scripted provider for tests and offline development.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use reag_core::AppResult;
use std::sync::{Mutex, MutexGuard};

type Responder = dyn Fn(&LlmRequest) -> AppResult<String> + Send + Sync;

/// Mock provider that answers from a closure and records every request.
///
/// Streaming replays the configured chunks (or the whole completion as a
/// single chunk when none are set), followed by an empty `done` marker.
pub struct MockLlmClient {
    responder: Box<Responder>,
    stream_chunks: Option<Vec<String>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    /// Always answer with the same content.
    pub fn with_response(content: impl Into<String>) -> Self {
        let content = content.into();
        Self::from_fn(move |_| Ok(content.clone()))
    }

    /// Answer by calling `responder` with each request.
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&LlmRequest) -> AppResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            stream_chunks: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Stream these chunks instead of the responder's answer.
    pub fn with_stream_chunks<I, S>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stream_chunks = Some(chunks.into_iter().map(Into::into).collect());
        self
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.lock().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LlmRequest>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, request: &LlmRequest) {
        self.lock().push(request.clone());
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.record(request);
        let content = (self.responder)(request)?;

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
            done: true,
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        self.record(request);

        let chunks = match &self.stream_chunks {
            Some(chunks) => chunks.clone(),
            None => vec![(self.responder)(request)?],
        };

        let model = request.model.clone();
        let mut items: Vec<AppResult<LlmStreamChunk>> = chunks
            .into_iter()
            .map(|content| {
                Ok(LlmStreamChunk {
                    content,
                    model: model.clone(),
                    done: false,
                    usage: None,
                })
            })
            .collect();
        items.push(Ok(LlmStreamChunk {
            content: String::new(),
            model,
            done: true,
            usage: Some(LlmUsage::default()),
        }));

        Ok(Box::pin(futures::stream::iter(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatMessage;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_mock_records_requests() {
        let client = MockLlmClient::with_response("ok");
        let request = LlmRequest::new("m", vec![ChatMessage::user("hi")]);

        let response = client.complete(&request).await.unwrap();
        assert_eq!(response.content, "ok");
        assert_eq!(client.request_count(), 1);
        assert_eq!(client.requests()[0].messages[0].content, "hi");
    }

    #[tokio::test]
    async fn test_mock_streams_chunks_then_done() {
        let client = MockLlmClient::with_response("unused").with_stream_chunks(["a", "b"]);
        let request = LlmRequest::new("m", vec![ChatMessage::user("hi")]);

        let chunks: Vec<_> = client.stream(&request).await.unwrap().collect().await;
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].as_ref().unwrap().content, "a");
        assert!(chunks[2].as_ref().unwrap().done);
    }
}
