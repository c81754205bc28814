/// Which article, if any, is expanded on the collection page.
///
/// The URL query parameter `article=<slug>` is the single source of truth:
/// each request seeds an `Expansion` from it, and every card link is derived
/// through `toggle`, so the rendered state and the URL can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    Collapsed,
    Expanded(String),
}

impl Expansion {
    /// Seeds the state from the query parameter. A parameter naming an
    /// unknown slug is ignored rather than erroring.
    pub fn from_query<'a, I>(param: Option<&str>, known_slugs: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        match param {
            Some(slug) if known_slugs.into_iter().any(|known| known == slug) => {
                Expansion::Expanded(slug.to_string())
            }
            _ => Expansion::Collapsed,
        }
    }

    /// The single-select transition: activating the expanded article
    /// collapses it, activating any other article expands that one.
    pub fn toggle(&self, slug: &str) -> Expansion {
        match self {
            Expansion::Expanded(current) if current == slug => Expansion::Collapsed,
            _ => Expansion::Expanded(slug.to_string()),
        }
    }

    pub fn expanded_slug(&self) -> Option<&str> {
        match self {
            Expansion::Collapsed => None,
            Expansion::Expanded(slug) => Some(slug),
        }
    }

    pub fn is_expanded(&self, slug: &str) -> bool {
        self.expanded_slug() == Some(slug)
    }

    /// URL an activation of `slug` navigates to; mirrors `toggle` so card
    /// links always encode the next state.
    pub fn toggle_href(&self, slug: &str) -> String {
        match self.toggle(slug) {
            Expansion::Collapsed => "/".to_string(),
            Expansion::Expanded(next) => format!("/?article={next}"),
        }
    }
}
