use std::sync::{Arc, OnceLock};

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use tracing::{debug, warn};

/// Theme applied to fenced code blocks once the asset resolves.
const CODE_THEME: &str = "base16-ocean.dark";

/// Lazily loaded syntax-highlighting assets.
///
/// Syntax definitions are embedded and cheap, so they are loaded up front.
/// The theme is the deferred asset: nothing loads it until the first request
/// that will actually display article content calls `trigger_load`, and the
/// render path never waits for it. Until the load completes, code blocks
/// fall back to plain `<code>`; once it completes the theme is valid for the
/// rest of the session.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: OnceLock<Theme>,
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme: OnceLock::new(),
        }
    }

    /// Kicks off the theme load in the background. Idempotent and
    /// fire-and-forget: the first call wins, later calls are no-ops.
    pub fn trigger_load(self: &Arc<Self>) {
        if self.ready() {
            return;
        }
        let this = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            this.load_theme();
            debug!(theme = CODE_THEME, "code theme loaded");
        });
    }

    /// Ready flag checked by the render path; never blocks.
    pub fn ready(&self) -> bool {
        self.theme.get().is_some()
    }

    /// Highlights `code` if the theme has resolved and the language is
    /// known; `None` signals the plain-code fallback.
    pub fn highlight(&self, code: &str, language: &str) -> Option<String> {
        let theme = self.theme.get()?;
        let syntax = self.syntaxes.find_syntax_by_token(language)?;
        match highlighted_html_for_string(code, &self.syntaxes, syntax, theme) {
            Ok(html) => Some(html),
            Err(e) => {
                warn!(language, error = %e, "highlighting failed, falling back to plain code");
                None
            }
        }
    }

    /// Synchronous load path, for callers that want the theme before
    /// serving anything (and for tests).
    pub fn load_theme(&self) {
        if self.ready() {
            return;
        }
        let mut themes = ThemeSet::load_defaults().themes;
        match themes.remove(CODE_THEME) {
            Some(theme) => {
                let _ = self.theme.set(theme);
            }
            None => warn!(theme = CODE_THEME, "theme missing from default theme set"),
        }
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}
