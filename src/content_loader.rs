use std::path::Path;

use tokio::fs;
use tracing::{error, info};

use crate::config::SiteConfig;
use crate::models::Article;
use crate::repository::{ArticleRepository, RepositoryError};
use crate::state::AppState;

pub struct LoadedContent {
    pub layout_html: String,
    pub not_found_html: String,
    pub articles: Vec<Article>,
}

/// Loads the page templates and the full article collection from the
/// content directory.
pub async fn load_content(config: &SiteConfig) -> Result<LoadedContent, RepositoryError> {
    let content_dir = Path::new(&config.content.dir);
    let layout_html = fs::read_to_string(content_dir.join("layout.html")).await?;
    let not_found_html = fs::read_to_string(content_dir.join("not_found.html")).await?;

    let repository = ArticleRepository::new(config.articles_dir());
    let articles = repository.load_all().await?;
    info!(count = articles.len(), "loaded articles");

    Ok(LoadedContent {
        layout_html,
        not_found_html,
        articles,
    })
}

pub async fn reload_content(app_state: &AppState) {
    info!("Reloading application content...");
    match load_content(&app_state.config).await {
        Ok(content) => {
            *app_state.layout_html.write().await = content.layout_html;
            *app_state.not_found_html.write().await = content.not_found_html;
            *app_state.articles.write().await = content.articles;
            info!("Content successfully reloaded.");
        }
        Err(e) => {
            error!("Failed to reload content: {}", e);
        }
    }
}
