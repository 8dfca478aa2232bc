//! Chat command handler.
//!
//! Reads questions from stdin; every kept answer stays in the client's
//! memory and is sent along with the next question.

use super::documents::{load_documents, query_options};
use super::query::stream_answer;
use clap::Args;
use reag::{Document, QueryOptions, ReagClient};
use reag_core::{config::ReagConfig, AppResult};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive conversation that remembers earlier answers
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Documents file (.yaml, .yml or .json)
    #[arg(short, long)]
    pub documents: PathBuf,

    /// Metadata filter applied to every question (repeatable)
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,

    /// Stream answers from the first matching document
    #[arg(long)]
    pub stream: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &ReagConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let documents = load_documents(&self.documents)?;
        let options = query_options(&self.filters)?;
        let mut client = ReagClient::from_config(config)?;

        println!(
            "Chatting over {} documents with {}. Type 'exit' or 'quit' to leave.",
            documents.len(),
            client.model()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("You: ");
            std::io::stdout().flush().ok();

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };
            let prompt = line.trim();

            if prompt.is_empty() {
                continue;
            }
            if prompt.eq_ignore_ascii_case("exit") || prompt.eq_ignore_ascii_case("quit") {
                break;
            }

            if let Err(e) = self.answer(&mut client, prompt, &documents, &options).await {
                tracing::warn!("Turn failed: {}", e);
                eprintln!("Error: {}", e);
            }
        }

        tracing::info!(messages = client.memory().len(), "Chat finished");

        Ok(())
    }

    async fn answer(
        &self,
        client: &mut ReagClient,
        prompt: &str,
        documents: &[Document],
        options: &QueryOptions,
    ) -> AppResult<()> {
        print!("ReAG: ");
        if self.stream {
            return stream_answer(client, prompt, documents, options).await;
        }

        let results = client.query(prompt, documents, options).await?;
        if results.is_empty() {
            println!("I couldn't find anything relevant to that.");
            return Ok(());
        }

        let answers: Vec<&str> = results.iter().map(|r| r.content.as_str()).collect();
        println!("{}", answers.join("\n\n"));

        Ok(())
    }
}
