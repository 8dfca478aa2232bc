//! Command handlers for the ReAG CLI.

pub mod chat;
pub mod documents;
pub mod query;

pub use chat::ChatCommand;
pub use query::QueryCommand;
