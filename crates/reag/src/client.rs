//! The ReAG client: filtering, batched dispatch and streaming.

use crate::batch::{batches, DEFAULT_BATCH_SIZE};
use crate::document::Document;
use crate::filter::filter_documents;
use crate::memory::Memory;
use crate::parser::ResponseStyle;
use crate::prompt::{build_system_prompt, default_schema, default_system_prompt};
use crate::types::{QueryOptions, QueryResult, StreamingQueryResult};
use futures::{Stream, StreamExt};
use reag_core::{AppError, AppResult, ReagConfig};
use reag_llm::{create_client, ChatMessage, LlmClient, LlmRequest, ModelId, ProviderSettings};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

/// Lazy sequence of streamed answer chunks, borrowing the client's memory.
pub type ReagStream<'a> = Pin<Box<dyn Stream<Item = AppResult<StreamingQueryResult>> + Send + 'a>>;

/// Client that asks a model to judge and answer from each document.
///
/// Holds one backend connection pool and the conversation [`Memory`] for its
/// whole lifetime. Queries take `&mut self`: memory is only written between
/// batches, never while requests are in flight.
pub struct ReagClient {
    llm: Arc<dyn LlmClient>,
    model: ModelId,
    system: String,
    batch_size: usize,
    schema: serde_json::Value,
    model_kwargs: serde_json::Map<String, serde_json::Value>,
    style: ResponseStyle,
    memory: Memory,
}

impl ReagClient {
    pub fn builder() -> ReagClientBuilder {
        ReagClientBuilder::default()
    }

    /// Build a client from resolved configuration.
    pub fn from_config(config: &ReagConfig) -> AppResult<Self> {
        config.validate()?;

        let mut builder = Self::builder()
            .model(&config.model)
            .batch_size(config.batch_size)
            .model_kwargs(config.model_kwargs.clone())
            .headers(config.headers.clone());

        if let Some(ref system) = config.system {
            builder = builder.system(system);
        }
        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint(endpoint);
        }
        if let Some(key) = config.resolve_api_key() {
            builder = builder.api_key(key);
        }
        if let Some(secs) = config.timeout {
            builder = builder.timeout(secs);
        }
        if let Some(ref style) = config.response_style {
            let style = ResponseStyle::parse(style).ok_or_else(|| {
                AppError::Config(format!("Unknown response style: {}", style))
            })?;
            builder = builder.response_style(style);
        }

        builder.build()
    }

    pub fn model(&self) -> &ModelId {
        &self.model
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn response_style(&self) -> ResponseStyle {
        self.style
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Messages for one document: system prompt, history, then the user prompt.
    fn build_request(&self, prompt: &str, document: &Document, stream: bool) -> LlmRequest {
        let history = self.memory.get_history();
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(build_system_prompt(&self.system, document)));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(prompt));

        let mut request =
            LlmRequest::new(self.model.name.clone(), messages).with_extra(self.model_kwargs.clone());

        if stream {
            request = request.with_streaming();
        } else if self.style == ResponseStyle::Structured {
            request = request.with_response_format(self.schema.clone());
        }

        request
    }

    /// Ask `prompt` against every document that passes the filters.
    ///
    /// Documents are sent in batches of `batch_size`: all requests of a batch
    /// run concurrently, batches run one after another. Irrelevant and
    /// unparseable answers are dropped; each kept answer is appended to memory
    /// as a user/assistant pair, in document order.
    ///
    /// # Errors
    /// `AppError::Query` if any completion request fails. Nothing from the
    /// failing batch is added to memory and later batches are not sent.
    pub async fn query<'d>(
        &mut self,
        prompt: &str,
        documents: &'d [Document],
        options: &QueryOptions,
    ) -> AppResult<Vec<QueryResult<'d>>> {
        let filtered = filter_documents(documents, options.filters());

        tracing::info!(
            model = %self.model,
            documents = documents.len(),
            matched = filtered.len(),
            "Running query"
        );

        let mut results = Vec::new();

        for (index, batch) in batches(&filtered, self.batch_size).enumerate() {
            tracing::debug!(batch = index, size = batch.len(), "Dispatching batch");

            let requests: Vec<LlmRequest> = batch
                .iter()
                .map(|document| self.build_request(prompt, document, false))
                .collect();

            let llm = &self.llm;
            // Any failure fails the whole batch before memory is touched.
            let responses =
                futures::future::join_all(requests.iter().map(|request| llm.complete(request)))
                    .await
                    .into_iter()
                    .collect::<AppResult<Vec<_>>>()
                    .map_err(|e| {
                        tracing::error!(batch = index, "Completion failed: {}", e);
                        AppError::query(e)
                    })?;

            for (document, response) in batch.iter().copied().zip(responses) {
                let parsed = match self.style.parse_response(&response.content) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        tracing::warn!(
                            document = %document.name,
                            body = %response.content,
                            "Skipping unparseable response: {}",
                            e
                        );
                        continue;
                    }
                };

                if parsed.is_irrelevant {
                    tracing::debug!(document = %document.name, "Document judged irrelevant");
                    continue;
                }

                self.memory.add_exchange(prompt, parsed.content.clone());

                results.push(QueryResult {
                    content: parsed.content,
                    reasoning: parsed.reasoning,
                    is_irrelevant: parsed.is_irrelevant,
                    document,
                });
            }
        }

        tracing::info!(results = results.len(), "Query finished");

        Ok(results)
    }

    /// Stream an answer from the first document that passes the filters.
    ///
    /// Other matching documents are ignored. Once the backend stream ends,
    /// the prompt and the full answer are appended to memory. Dropping the
    /// returned stream early records nothing.
    ///
    /// # Errors
    /// `AppError::Query` if no document passes the filters or the stream
    /// cannot be opened. Mid-stream failures are yielded as items.
    pub async fn query_stream(
        &mut self,
        prompt: &str,
        documents: &[Document],
        options: &QueryOptions,
    ) -> AppResult<ReagStream<'_>> {
        let filtered = filter_documents(documents, options.filters());
        let document = filtered.first().copied().ok_or_else(|| {
            AppError::Query("no documents left to stream from after filtering".to_string())
        })?;

        if filtered.len() > 1 {
            tracing::debug!(
                ignored = filtered.len() - 1,
                "Streaming answers from the first matching document only"
            );
        }

        tracing::info!(model = %self.model, document = %document.name, "Running streaming query");

        let request = self.build_request(prompt, document, true);
        let mut upstream = self.llm.stream(&request).await.map_err(AppError::query)?;

        let memory = &mut self.memory;
        let prompt = prompt.to_string();

        let stream = async_stream::stream! {
            let mut full_response = String::new();
            let mut failed = false;

            while let Some(item) = upstream.next().await {
                match item {
                    Ok(chunk) => {
                        if chunk.done && chunk.content.is_empty() {
                            break;
                        }
                        full_response.push_str(&chunk.content);
                        let done = chunk.done;
                        yield Ok(StreamingQueryResult::chunk(chunk.content));
                        if done {
                            break;
                        }
                    }
                    Err(e) => {
                        failed = true;
                        yield Err(AppError::query(e));
                        break;
                    }
                }
            }

            if !failed {
                memory.add_exchange(prompt, full_response);
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Builder for [`ReagClient`].
pub struct ReagClientBuilder {
    model: String,
    system: Option<String>,
    batch_size: usize,
    schema: Option<serde_json::Value>,
    model_kwargs: serde_json::Map<String, serde_json::Value>,
    memory: Option<Memory>,
    response_style: Option<ResponseStyle>,
    llm: Option<Arc<dyn LlmClient>>,
    settings: ProviderSettings,
}

impl Default for ReagClientBuilder {
    fn default() -> Self {
        Self {
            model: reag_core::config::DEFAULT_MODEL.to_string(),
            system: None,
            batch_size: DEFAULT_BATCH_SIZE,
            schema: None,
            model_kwargs: serde_json::Map::new(),
            memory: None,
            response_style: None,
            llm: None,
            settings: ProviderSettings::default(),
        }
    }
}

impl ReagClientBuilder {
    /// Model identifier, optionally prefixed with a provider (`ollama/deepseek-r1`).
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the instruction prompt.
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Override the structured `response_format` sent to the backend.
    pub fn schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Options merged untouched into every request body.
    pub fn model_kwargs(mut self, kwargs: serde_json::Map<String, serde_json::Value>) -> Self {
        self.model_kwargs = kwargs;
        self
    }

    /// Start from an existing conversation.
    pub fn memory(mut self, memory: Memory) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Override the provider's default response style.
    pub fn response_style(mut self, style: ResponseStyle) -> Self {
        self.response_style = Some(style);
        self
    }

    /// Use this backend instead of creating one from the model prefix.
    pub fn llm_client(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.settings.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.settings.api_key = Some(api_key.into());
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.settings.headers.extend(headers);
        self
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.settings.timeout = Some(secs);
        self
    }

    pub fn build(self) -> AppResult<ReagClient> {
        if self.batch_size == 0 {
            return Err(AppError::Config(
                "batch size must be a positive integer".to_string(),
            ));
        }

        let model = ModelId::parse(&self.model);
        let style = self
            .response_style
            .unwrap_or_else(|| ResponseStyle::for_provider(model.provider));

        let llm = match self.llm {
            Some(llm) => llm,
            None => {
                let mut settings = self.settings;
                if settings.api_key.is_none() {
                    settings.api_key = model
                        .provider
                        .api_key_env()
                        .and_then(|var| std::env::var(var).ok());
                }
                create_client(model.provider, &settings)?
            }
        };

        tracing::debug!(
            model = %model,
            provider = llm.provider_name(),
            style = style.as_str(),
            batch_size = self.batch_size,
            "Built ReAG client"
        );

        Ok(ReagClient {
            llm,
            system: self
                .system
                .unwrap_or_else(|| default_system_prompt(style).to_string()),
            batch_size: self.batch_size,
            schema: self.schema.unwrap_or_else(default_schema),
            model_kwargs: self.model_kwargs,
            style,
            memory: self.memory.unwrap_or_default(),
            model,
        })
    }
}
