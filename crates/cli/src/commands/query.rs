//! Query command handler.
//!
//! Runs a single question against a documents file.

use super::documents::{load_documents, query_options};
use clap::Args;
use futures::StreamExt;
use reag::{Document, QueryOptions, ReagClient};
use reag_core::{config::ReagConfig, AppError, AppResult};
use std::io::Write;
use std::path::PathBuf;

/// Ask one question against a documents file
#[derive(Args, Debug)]
pub struct QueryCommand {
    /// The question to ask
    pub prompt: String,

    /// Documents file (.yaml, .yml or .json)
    #[arg(short, long)]
    pub documents: PathBuf,

    /// Metadata filter, `key=value` or `key:operator:value` (repeatable)
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,

    /// Stream the answer from the first matching document
    #[arg(long)]
    pub stream: bool,

    /// Output as JSON
    #[arg(long, conflicts_with = "stream")]
    pub json: bool,
}

impl QueryCommand {
    /// Execute the query command.
    pub async fn execute(&self, config: &ReagConfig) -> AppResult<()> {
        tracing::info!("Executing query command");
        tracing::debug!("Query command options: {:?}", self);

        let documents = load_documents(&self.documents)?;
        let options = query_options(&self.filters)?;
        let mut client = ReagClient::from_config(config)?;

        if self.stream {
            stream_answer(&mut client, &self.prompt, &documents, &options).await
        } else {
            self.print_results(&mut client, &documents, &options).await
        }
    }

    async fn print_results(
        &self,
        client: &mut ReagClient,
        documents: &[Document],
        options: &QueryOptions,
    ) -> AppResult<()> {
        let results = client.query(&self.prompt, documents, options).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&results)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        if results.is_empty() {
            println!("No relevant documents found.");
            return Ok(());
        }

        for result in &results {
            println!("# {}", result.document.name);
            println!("{}", result.content);
            if !result.reasoning.is_empty() {
                tracing::debug!(document = %result.document.name, "Reasoning: {}", result.reasoning);
            }
            println!();
        }

        Ok(())
    }
}

/// Print streamed chunks to stdout as they arrive.
pub(crate) async fn stream_answer(
    client: &mut ReagClient,
    prompt: &str,
    documents: &[Document],
    options: &QueryOptions,
) -> AppResult<()> {
    let mut stream = client.query_stream(prompt, documents, options).await?;
    let mut stdout = std::io::stdout();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        print!("{}", chunk.content);
        stdout.flush().ok();
    }
    println!();

    Ok(())
}
