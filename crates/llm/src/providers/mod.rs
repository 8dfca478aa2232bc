//! Completion provider implementations.

pub mod mock;
pub mod ollama;
pub mod openai;

pub use mock::MockLlmClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiCompatibleClient;

use futures::{Stream, StreamExt};
use reag_core::{AppError, AppResult};
use std::collections::VecDeque;

/// Split a streamed HTTP body into text lines.
///
/// Bytes are buffered until a `\n` arrives, so lines (and UTF-8 sequences)
/// split across network chunks are reassembled. A trailing line without a
/// newline is emitted when the body ends. A transport error is yielded once
/// and ends the stream.
pub(crate) fn body_lines<S, B>(body: S) -> impl Stream<Item = AppResult<String>> + Send
where
    S: Stream<Item = reqwest::Result<B>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send,
{
    let state = LineState {
        body,
        buffer: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.pending.pop_front() {
                return Some((Ok(line), state));
            }

            if state.finished {
                if state.buffer.is_empty() {
                    return None;
                }
                let rest = std::mem::take(&mut state.buffer);
                return Some((Ok(decode_line(&rest)), state));
            }

            match state.body.next().await {
                Some(Ok(bytes)) => {
                    state.buffer.extend_from_slice(bytes.as_ref());
                    while let Some(pos) = state.buffer.iter().position(|b| *b == b'\n') {
                        let line: Vec<u8> = state.buffer.drain(..=pos).collect();
                        state.pending.push_back(decode_line(&line[..pos]));
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    state.buffer.clear();
                    return Some((Err(AppError::Llm(format!("Stream error: {}", e))), state));
                }
                None => state.finished = true,
            }
        }
    })
}

struct LineState<S> {
    body: S,
    buffer: Vec<u8>,
    pending: VecDeque<String>,
    finished: bool,
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end_matches('\r').to_string()
}

/// Turn a non-2xx response into an `AppError::Llm`.
pub(crate) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> AppResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(AppError::Llm(format!(
        "{} API error ({}): {}",
        provider, status, error_text
    )))
}

/// Build the shared HTTP client, honoring an optional timeout.
pub(crate) fn http_client(timeout: Option<u64>) -> AppResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout {
        builder = builder.timeout(std::time::Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))
}
