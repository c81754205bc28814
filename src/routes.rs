use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use serde::Deserialize;
use tracing::error;

use crate::expand::Expansion;
use crate::render;
use crate::repository::{ArticleRepository, RepositoryError};
use crate::state::AppState;

#[derive(Deserialize, Debug, Default)]
pub struct CollectionQuery {
    /// Slug of the article to deep-link as expanded.
    pub article: Option<String>,
}

/// `GET /` — the article collection, with at most one article expanded
/// according to the `article` query parameter.
pub async fn collection(
    Query(query): Query<CollectionQuery>,
    State(state): State<Arc<AppState>>,
) -> Html<String> {
    let articles = state.articles.read().await;
    let expansion = Expansion::from_query(
        query.article.as_deref(),
        articles.iter().map(|a| a.slug.as_str()),
    );

    // Every body is server-rendered into this page and can be expanded
    // client-side without another request, so the theme load starts here
    // regardless of the query parameter.
    state.highlighter.trigger_load();

    let layout = state.layout_html.read().await;
    let page = render::render_collection(
        &layout,
        &state.config,
        &articles,
        &expansion,
        &state.highlighter,
        state.is_development,
    );
    Html(page)
}

/// `GET /articles/{slug}` — one article standalone. Re-reads the file from
/// disk so a direct navigation always sees the latest content.
pub async fn article_detail(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Html<String>) {
    let repository = ArticleRepository::new(state.config.articles_dir());
    match repository.load_one(&slug).await {
        Ok(article) => {
            state.highlighter.trigger_load();
            let layout = state.layout_html.read().await;
            let page = render::render_detail(
                &layout,
                &state.config,
                &article,
                &state.highlighter,
                state.is_development,
            );
            (StatusCode::OK, Html(page))
        }
        Err(RepositoryError::NotFound(_)) => {
            let layout = state.layout_html.read().await;
            let not_found = state.not_found_html.read().await;
            let page = render::render_not_found(
                &layout,
                &state.config,
                &not_found,
                &slug,
                state.is_development,
            );
            (StatusCode::NOT_FOUND, Html(page))
        }
        Err(e) => {
            error!(slug = %slug, error = %e, "failed to load article");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Something went wrong</h1>".to_string()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::RwLock;

    use crate::config::SiteConfig;
    use crate::highlight::Highlighter;

    fn app_state() -> Arc<AppState> {
        Arc::new(AppState {
            layout_html: RwLock::new("<html><body>{{ content }}</body></html>".to_string()),
            not_found_html: RwLock::new("<p>No article called {{slug}}.</p>".to_string()),
            articles: RwLock::new(Vec::new()),
            highlighter: Arc::new(Highlighter::new()),
            config: SiteConfig::default(),
            is_development: false,
        })
    }

    #[tokio::test]
    async fn plain_collection_request_starts_the_theme_load() {
        let state = app_state();
        assert!(!state.highlighter.ready());

        let _ = collection(
            Query(CollectionQuery { article: None }),
            State(state.clone()),
        )
        .await;

        // The load is fire-and-forget; give the blocking task time to finish.
        for _ in 0..100 {
            if state.highlighter.ready() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("collection request without ?article did not start the theme load");
    }

    #[tokio::test]
    async fn unknown_slug_renders_not_found() {
        let (status, Html(page)) =
            article_detail(Path("ghost".to_string()), State(app_state())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(page.contains("No article called ghost."));
    }
}
