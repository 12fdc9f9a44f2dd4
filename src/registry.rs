use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::articles::ArticleStore;
use crate::error::ToolError;
use crate::news_api::NewsClient;
use crate::notes::NoteStore;
use crate::tools::{AddNote, FetchNews, ReadArticles, ReadNotes, Tool};

/// A call that could not be dispatched to any tool.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Text result of one tool call, as relayed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResult {
    pub text: String,
    pub is_error: bool,
}

impl CallResult {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageArgs {
    message: String,
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    query: String,
}

/// Maps tool names to the concrete tools and turns their results into text.
pub struct ToolRegistry {
    add_note: AddNote,
    read_notes: ReadNotes,
    fetch_news: FetchNews,
    read_articles: ReadArticles,
}

impl ToolRegistry {
    pub fn new(notes: Arc<NoteStore>, articles: Arc<ArticleStore>, news: NewsClient) -> Self {
        Self {
            add_note: AddNote::new(notes.clone()),
            read_notes: ReadNotes::new(notes),
            fetch_news: FetchNews::new(news),
            read_articles: ReadArticles::new(articles),
        }
    }

    /// Tool descriptors for `tools/list`.
    pub fn definitions(&self) -> Vec<Value> {
        let no_args = json!({ "type": "object", "properties": {} });
        vec![
            describe(
                &self.add_note,
                json!({
                    "type": "object",
                    "properties": { "message": { "type": "string" } },
                    "required": ["message"]
                }),
            ),
            describe(&self.read_notes, no_args.clone()),
            describe(
                &self.fetch_news,
                json!({
                    "type": "object",
                    "properties": { "query": { "type": "string" } },
                    "required": ["query"]
                }),
            ),
            describe(&self.read_articles, no_args),
        ]
    }

    /// Invoke the tool called `name`.
    ///
    /// Tool failures never escape as `Err`: fetch errors become ordinary
    /// text and storage faults come back flagged with `is_error`.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<CallResult, CallError> {
        let arguments = match arguments {
            Value::Null => json!({}),
            other => other,
        };

        let result = match name {
            "add_note" => {
                let args: MessageArgs = parse_args(name, arguments)?;
                self.add_note.run(args.message).await
            }
            "read_notes" => self.read_notes.run(()).await,
            "fetch_news" => {
                let args: QueryArgs = parse_args(name, arguments)?;
                self.fetch_news.run(args.query).await.map(|outcome| outcome.to_string())
            }
            "read_articles" => self.read_articles.run(()).await,
            _ => return Err(CallError::UnknownTool(name.to_string())),
        };

        Ok(match result {
            Ok(text) => CallResult::ok(text),
            Err(e) => to_text(name, e),
        })
    }
}

fn describe<T: Tool>(tool: &T, input_schema: Value) -> Value {
    json!({
        "name": tool.name(),
        "description": tool.description(),
        "inputSchema": input_schema,
    })
}

fn parse_args<T: serde::de::DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, CallError> {
    serde_json::from_value(arguments).map_err(|source| CallError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}

fn to_text(tool: &str, err: ToolError) -> CallResult {
    if err.is_fault() {
        log::error!("Tool {} failed: {}", tool, err);
        CallResult {
            text: format!("Error executing tool {}: {}", tool, err),
            is_error: true,
        }
    } else {
        CallResult::ok(format!("Error fetching news: {}", err))
    }
}
