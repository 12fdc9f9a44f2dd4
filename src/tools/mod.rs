pub mod add_note;
pub mod fetch_news;
pub mod read_articles;
pub mod read_notes;

pub use add_note::AddNote;
pub use fetch_news::FetchNews;
pub use read_articles::ReadArticles;
pub use read_notes::ReadNotes;

use crate::error::ToolError;

/// Tool trait for operations exposed to the host agent.
///
/// Not object-safe (associated types).
/// The registry calls tools by concrete type, not `dyn Tool`.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    type Input: Send;
    type Output: Send;

    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn run(&self, input: Self::Input) -> Result<Self::Output, ToolError>;
}
