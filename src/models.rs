use chrono::NaiveDate;
use serde::Deserialize;

/// Front-matter block of an article file. Every field is optional; missing
/// values are defaulted when the `Article` is built, never treated as errors.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "featuredImage")]
    pub featured_image: Option<String>,
}

/// One article, built once from a file on disk and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Article {
    /// Filename minus the `.md` extension; doubles as the routable identifier.
    pub slug: String,
    pub title: String,
    /// The date string as authored, kept verbatim for display.
    pub date: String,
    pub description: String,
    /// Raw Markdown body.
    pub content: String,
    pub featured_image: Option<String>,
    /// Comparison key for newest-first ordering.
    pub sort_key: NaiveDate,
}

impl Article {
    pub fn new(slug: String, front_matter: FrontMatter, content: String) -> Self {
        let date = front_matter.date.unwrap_or_default();
        Self {
            sort_key: parse_sort_key(&date),
            slug,
            title: front_matter.title.unwrap_or_default(),
            description: front_matter.description.unwrap_or_default(),
            featured_image: front_matter.featured_image,
            content,
            date,
        }
    }
}

/// A missing or unparseable date sorts as the earliest possible date, so
/// undated articles always land at the end of the newest-first listing.
fn parse_sort_key(date: &str) -> NaiveDate {
    let date = date.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date, "%B %d, %Y"))
        .unwrap_or(NaiveDate::MIN)
}
