use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

use crate::articles::{Article, ArticleStore};
use crate::config::NewsApiConfig;
use crate::error::ToolError;

const PAGE_SIZE: &str = "5";
const SORT_BY: &str = "publishedAt";
const LANGUAGE: &str = "en";

/// Client for the news search API that records every result it fetches.
pub struct NewsClient {
    endpoint: String,
    api_key: String,
    articles: Arc<ArticleStore>,
    client: reqwest::Client,
}

/// How a successful round-trip ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Stored { count: usize, query: String },
    NoArticles,
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored { count, query } => {
                write!(f, "Fetched {} articles for query '{}'.", count, query)
            }
            Self::NoArticles => write!(f, "No articles found for the query."),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Option<Vec<Article>>,
}

/// Error envelope returned alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

impl NewsClient {
    pub fn new(config: &NewsApiConfig, articles: Arc<ArticleStore>) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            articles,
            client: reqwest::Client::new(),
        }
    }

    /// Run one search and return the normalized results.
    pub async fn search(&self, query: &str) -> Result<Vec<Article>, ToolError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("apiKey", self.api_key.as_str()),
                ("pageSize", PAGE_SIZE),
                ("sortBy", SORT_BY),
                ("language", LANGUAGE),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(ToolError::HttpStatus { status, message });
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.articles.unwrap_or_default())
    }

    /// Search for `query` and append any results to the article store.
    ///
    /// The store is left untouched unless at least one article came back.
    pub async fn fetch_and_store(&self, query: &str) -> Result<FetchOutcome, ToolError> {
        self.articles.ensure_exists()?;

        let fetched = self.search(query).await?;
        if fetched.is_empty() {
            return Ok(FetchOutcome::NoArticles);
        }

        self.articles.append_batch(&fetched)?;
        Ok(FetchOutcome::Stored {
            count: fetched.len(),
            query: query.to_string(),
        })
    }
}
