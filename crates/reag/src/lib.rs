//! ReAG: Retrieval-Enhanced Answer Generation.
//!
//! Instead of ranking chunks by embedding similarity, ReAG hands each whole
//! document to a language model together with the question and lets the model
//! judge relevance and extract the answer.
//!
//! # Example
//! ```no_run
//! use reag::{Document, MetadataFilter, QueryOptions, ReagClient};
//!
//! # async fn example() -> reag_core::AppResult<()> {
//! let mut client = ReagClient::builder().model("gpt-4o-mini").build()?;
//! let docs = vec![Document::new("Superagent", "Superagent is a workspace for AI-agents.")
//!     .with_metadata("source", "web")];
//!
//! let options = QueryOptions::with_filter(MetadataFilter::new("source", "web"));
//! for result in client.query("What is Superagent?", &docs, &options).await? {
//!     println!("{}: {}", result.document.name, result.content);
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod document;
pub mod filter;
pub mod memory;
pub mod parser;
pub mod prompt;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export main types
pub use client::{ReagClient, ReagClientBuilder, ReagStream};
pub use document::{Document, Metadata, MetadataValue};
pub use filter::{evaluate, filter_documents, FilterOperator, MetadataFilter};
pub use memory::Memory;
pub use parser::{ParsedResponse, ResponseStyle};
pub use prompt::{REAG_REASONING_SYSTEM_PROMPT, REAG_SYSTEM_PROMPT};
pub use types::{FilterSpec, QueryOptions, QueryResult, StreamingQueryResult};
