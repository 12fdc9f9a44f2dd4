use std::sync::Arc;

use super::Tool;
use crate::articles::{self, ArticleStore};
use crate::error::ToolError;

/// Renders the stored article list.
pub struct ReadArticles {
    articles: Arc<ArticleStore>,
}

impl ReadArticles {
    pub fn new(articles: Arc<ArticleStore>) -> Self {
        Self { articles }
    }
}

#[async_trait::async_trait]
impl Tool for ReadArticles {
    type Input = ();
    type Output = String;

    fn name(&self) -> &str {
        "read_articles"
    }

    fn description(&self) -> &str {
        "Read and return all stored news articles."
    }

    async fn run(&self, _input: ()) -> Result<String, ToolError> {
        let stored = self.articles.read_all()?;
        match articles::format_all(&stored) {
            Some(listing) => {
                log::info!("Read all articles ({})", stored.len());
                Ok(listing)
            }
            None => {
                log::info!("No articles stored yet");
                Ok("No articles stored yet.".to_string())
            }
        }
    }
}
