use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Site configuration from `blog.toml`. Every field has a default so the
/// file is optional; a present-but-invalid file is still an error.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub content: ContentSection,
    pub server: ServerSection,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SiteSection {
    pub title: String,
    /// Origin used to build absolute article URLs for sharing and
    /// social-preview tags.
    pub base_url: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ContentSection {
    pub dir: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerSection {
    pub port: u16,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Articles".to_string(),
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            dir: "content".to_string(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl SiteConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(toml::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Directory the article files live in.
    pub fn articles_dir(&self) -> std::path::PathBuf {
        Path::new(&self.content.dir).join("articles")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = SiteConfig::load("does-not-exist.toml").unwrap();
        assert_eq!(config.site.title, "Articles");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.articles_dir(), Path::new("content/articles"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blog.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[site]\ntitle = \"My Blog\"").unwrap();

        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.site.title, "My Blog");
        assert_eq!(config.content.dir, "content");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blog.toml");
        std::fs::write(&path, "[site\ntitle = ").unwrap();
        assert!(SiteConfig::load(&path).is_err());
    }
}
