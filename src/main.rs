mod articles;
mod config;
mod error;
mod news_api;
mod notes;
mod registry;
mod server;
mod tools;

use anyhow::Result;
use articles::ArticleStore;
use config::Config;
use news_api::NewsClient;
use notes::NoteStore;
use registry::ToolRegistry;
use server::McpServer;
use std::sync::Arc;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging (stderr; stdout carries protocol frames)
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
    log::info!("Starting MCP server");

    // Load configuration
    let config = Config::load("config.toml")?;
    log::info!("Configuration loaded successfully");

    // Ensure the data directory and both stores exist
    config.ensure_directories()?;
    let notes = Arc::new(NoteStore::new(&config.storage));
    notes.ensure_exists()?;
    let articles = Arc::new(ArticleStore::new(&config.storage));
    articles.ensure_exists()?;
    log::info!(
        "Notes at {}, articles at {}",
        notes.path().display(),
        articles.path().display()
    );

    let news = NewsClient::new(&config.news_api, articles.clone());
    let registry = ToolRegistry::new(notes, articles, news);
    let server = McpServer::new(config.server.clone(), registry);

    server
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    log::info!("Server stopped");
    Ok(())
}
