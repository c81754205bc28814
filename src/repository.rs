use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use gray_matter::{engine::YAML, Matter};
use thiserror::Error;
use tokio::fs;
use tracing::warn;

use crate::models::{Article, FrontMatter};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("no article found for slug `{0}`")]
    NotFound(String),
    #[error("failed to read article file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse front matter: {0}")]
    FrontMatter(String),
}

/// Read-only access to the article files in one flat directory.
pub struct ArticleRepository {
    dir: PathBuf,
}

impl ArticleRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Loads every `.md` file in the directory (non-recursive), newest
    /// first. A file that fails to read or parse is skipped with a warning
    /// so one bad file never takes the rest of the collection down.
    pub async fn load_all(&self) -> Result<Vec<Article>, RepositoryError> {
        let mut articles: Vec<Article> = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "md") {
                match load_file(&path).await {
                    Ok(article) => articles.push(article),
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping article"),
                }
            }
        }

        // Slug tie-break keeps the order stable across directory listings.
        articles.sort_by(|a, b| {
            b.sort_key
                .cmp(&a.sort_key)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(articles)
    }

    /// Loads a single article by slug; a missing file is `NotFound`, which
    /// the routing layer turns into a not-found page.
    pub async fn load_one(&self, slug: &str) -> Result<Article, RepositoryError> {
        if slug.is_empty() || slug.contains(['/', '\\']) || slug.contains("..") {
            return Err(RepositoryError::NotFound(slug.to_string()));
        }
        let path = self.dir.join(format!("{slug}.md"));
        match load_file(&path).await {
            Err(RepositoryError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                Err(RepositoryError::NotFound(slug.to_string()))
            }
            other => other,
        }
    }
}

async fn load_file(path: &Path) -> Result<Article, RepositoryError> {
    let raw = fs::read_to_string(path).await?;
    let slug = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();

    let matter = Matter::<YAML>::new();
    let parsed = matter
        .parse::<FrontMatter>(&raw)
        .map_err(|e| RepositoryError::FrontMatter(e.to_string()))?;

    let front_matter = parsed.data.unwrap_or_default();
    Ok(Article::new(slug, front_matter, parsed.content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn write_article(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    fn sample_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_article(
            dir.path(),
            "newest.md",
            "---\ntitle: Newest\ndate: 2024-05-01\n---\nnew body\n",
        );
        write_article(
            dir.path(),
            "older.md",
            "---\ntitle: Older\ndate: 2023-01-15\ndescription: an older one\n---\nold body\n",
        );
        write_article(
            dir.path(),
            "undated.md",
            "---\ntitle: Undated\n---\nno date here\n",
        );
        dir
    }

    #[tokio::test]
    async fn load_all_sorts_newest_first_with_undated_last() {
        let dir = sample_dir();
        let articles = ArticleRepository::new(dir.path()).load_all().await.unwrap();

        let slugs: Vec<&str> = articles.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, ["newest", "older", "undated"]);
        assert_eq!(articles[2].sort_key, NaiveDate::MIN);
    }

    #[tokio::test]
    async fn non_markdown_files_are_ignored() {
        let dir = sample_dir();
        write_article(dir.path(), "notes.txt", "not an article");

        let articles = ArticleRepository::new(dir.path()).load_all().await.unwrap();
        assert_eq!(articles.len(), 3);
    }

    #[tokio::test]
    async fn malformed_file_is_skipped_not_fatal() {
        let dir = sample_dir();
        // Front matter that fails to deserialize: title is a list, not a string.
        write_article(
            dir.path(),
            "broken.md",
            "---\ntitle:\n  - one\n  - two\n---\nbody\n",
        );

        let articles = ArticleRepository::new(dir.path()).load_all().await.unwrap();
        let slugs: Vec<&str> = articles.iter().map(|a| a.slug.as_str()).collect();
        assert!(!slugs.contains(&"broken"));
        assert_eq!(articles.len(), 3);
    }

    #[tokio::test]
    async fn load_one_round_trips_the_slug() {
        let dir = sample_dir();
        let article = ArticleRepository::new(dir.path())
            .load_one("older")
            .await
            .unwrap();
        assert_eq!(article.slug, "older");
        assert_eq!(article.title, "Older");
        assert_eq!(article.description, "an older one");
        assert_eq!(article.content.trim(), "old body");
    }

    #[tokio::test]
    async fn load_one_unknown_slug_is_not_found() {
        let dir = sample_dir();
        let result = ArticleRepository::new(dir.path()).load_one("missing").await;
        assert!(matches!(result, Err(RepositoryError::NotFound(s)) if s == "missing"));
    }

    #[tokio::test]
    async fn load_one_rejects_path_traversal() {
        let dir = sample_dir();
        let result = ArticleRepository::new(dir.path())
            .load_one("../newest")
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn shipped_content_loads_newest_first() {
        let articles = ArticleRepository::new("content/articles")
            .load_all()
            .await
            .unwrap();
        let slugs: Vec<&str> = articles.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(
            slugs,
            ["reading-files-in-rust", "hello-world", "an-undated-note"]
        );
    }

    #[tokio::test]
    async fn body_without_front_matter_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        write_article(dir.path(), "plain.md", "just a body\n");

        let article = ArticleRepository::new(dir.path())
            .load_one("plain")
            .await
            .unwrap();
        assert_eq!(article.title, "");
        assert_eq!(article.content.trim(), "just a body");
    }
}
