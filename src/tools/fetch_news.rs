use super::Tool;
use crate::error::ToolError;
use crate::news_api::{FetchOutcome, NewsClient};

/// Fetches news for a query and stores the results.
pub struct FetchNews {
    client: NewsClient,
}

impl FetchNews {
    pub fn new(client: NewsClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for FetchNews {
    type Input = String;
    type Output = FetchOutcome;

    fn name(&self) -> &str {
        "fetch_news"
    }

    fn description(&self) -> &str {
        "Fetch news articles from the News API based on a query."
    }

    async fn run(&self, query: String) -> Result<FetchOutcome, ToolError> {
        match self.client.fetch_and_store(&query).await {
            Ok(FetchOutcome::NoArticles) => {
                log::warn!("No articles found for query: {}", query);
                Ok(FetchOutcome::NoArticles)
            }
            Ok(outcome) => {
                log::info!("{}", outcome);
                Ok(outcome)
            }
            Err(e) => {
                log::error!("Error fetching news: {}", e);
                Err(e)
            }
        }
    }
}
