use htmlescape::{encode_attribute, encode_minimal};

use crate::config::SiteConfig;
use crate::expand::Expansion;
use crate::highlight::Highlighter;
use crate::markdown::render_article_html;
use crate::models::Article;

/// Share control: native share first, clipboard fallback with a transient
/// "Copied!" confirmation that reverts after 2000 ms, silent no-op when
/// neither API exists. A second share while the confirmation is showing
/// resets the revert timer.
const SHARE_SCRIPT: &str = r#"
<script>
(() => {
    const COPY_CONFIRM_MS = 2000;
    document.querySelectorAll(".share-button").forEach((button) => {
        let revertTimer = null;
        button.addEventListener("click", async (event) => {
            event.stopPropagation();
            const url = button.dataset.shareUrl;
            const title = button.dataset.shareTitle;
            if (navigator.share) {
                try {
                    await navigator.share({ title, url });
                } catch (err) {
                    console.log("Share cancelled");
                }
                return;
            }
            if (!navigator.clipboard) {
                return;
            }
            try {
                await navigator.clipboard.writeText(url);
            } catch (err) {
                return;
            }
            if (revertTimer !== null) {
                clearTimeout(revertTimer);
            }
            button.classList.add("copied");
            button.querySelector(".label").textContent = "Copied!";
            revertTimer = setTimeout(() => {
                button.classList.remove("copied");
                button.querySelector(".label").textContent = "Share";
                revertTimer = null;
            }, COPY_CONFIRM_MS);
        });
    });
})();
</script>
"#;

/// Client half of the expand/collapse state machine. The server seeds the
/// page from `?article=`; this script replays the same transitions on card
/// clicks with a shallow history update instead of a navigation, re-applies
/// the URL on back/forward navigation, and scrolls a deep-linked article
/// into view on load.
const EXPAND_SCRIPT: &str = r#"
<script>
(() => {
    const items = Array.from(document.querySelectorAll(".article"));
    const setExpanded = (item, expanded) => {
        item.querySelector(".article-content").hidden = !expanded;
        const icon = item.querySelector(".expand-icon");
        if (icon) {
            icon.textContent = expanded ? "▼" : "▶";
        }
    };
    const applyFromUrl = () => {
        const slug = new URLSearchParams(window.location.search).get("article");
        items.forEach((item) => setExpanded(item, item.id === `article-${slug}`));
    };
    document.querySelectorAll(".article-header").forEach((header) => {
        header.addEventListener("click", (event) => {
            event.preventDefault();
            const item = header.closest(".article");
            const willExpand = item.querySelector(".article-content").hidden;
            items.forEach((other) => setExpanded(other, false));
            setExpanded(item, willExpand);
            const url = willExpand ? `/?article=${header.dataset.slug}` : "/";
            history.pushState(null, "", url);
        });
    });
    // Back/forward changes the URL without a request; the cards must follow.
    window.addEventListener("popstate", applyFromUrl);
    const slug = new URLSearchParams(window.location.search).get("article");
    if (slug) {
        const target = document.getElementById(`article-${slug}`);
        if (target) {
            setTimeout(() => {
                target.scrollIntoView({ behavior: "smooth", block: "start" });
            }, 100);
        }
    }
})();
</script>
"#;

const HOT_RELOAD_SCRIPT: &str = r#"
<script>
    const socket = new WebSocket("ws://" + window.location.host + "/ws");
    socket.onmessage = (event) => {
        if (event.data === "reload") {
            window.location.reload();
        }
    };
</script>
"#;

fn render_with_layout(
    layout: &str,
    site_title: &str,
    title: &str,
    head: &str,
    content: &str,
    scripts: &str,
) -> String {
    let mut page = layout
        .replace("{{ site_title }}", site_title)
        .replace("{{ title }}", title)
        .replace("{{ head }}", head)
        .replace("{{ content }}", content);
    if !scripts.is_empty() {
        page = page.replace("</body>", &format!("{scripts}</body>"));
    }
    page
}

fn share_button(url: &str, title: &str) -> String {
    format!(
        "<button class=\"share-button\" data-share-url=\"{}\" data-share-title=\"{}\">\
         <span class=\"icon\">\u{1F517}</span><span class=\"label\">Share</span></button>",
        encode_attribute(url),
        encode_attribute(title)
    )
}

fn image_tag(src: &str, alt: &str, class: &str, width: u32, height: u32) -> String {
    format!(
        "<img src=\"{}\" alt=\"{}\" class=\"{class}\" width=\"{width}\" height=\"{height}\">",
        encode_attribute(src),
        encode_attribute(alt)
    )
}

/// The collection page: every article rendered as a card, the expanded one
/// (if any) with its body visible, the rest with their bodies `hidden`.
pub fn render_collection(
    layout: &str,
    config: &SiteConfig,
    articles: &[Article],
    expansion: &Expansion,
    highlighter: &Highlighter,
    is_development: bool,
) -> String {
    let mut grid = String::from("<div class=\"articles-grid\">\n");
    for article in articles {
        grid.push_str(&article_card(article, expansion, highlighter, config));
    }
    grid.push_str("</div>\n");

    let mut scripts = format!("{EXPAND_SCRIPT}{SHARE_SCRIPT}");
    if is_development {
        scripts.push_str(HOT_RELOAD_SCRIPT);
    }
    let site_title = encode_minimal(&config.site.title);
    render_with_layout(layout, &site_title, &site_title, "", &grid, &scripts)
}

fn article_card(
    article: &Article,
    expansion: &Expansion,
    highlighter: &Highlighter,
    config: &SiteConfig,
) -> String {
    let expanded = expansion.is_expanded(&article.slug);
    let icon = if expanded { "\u{25bc}" } else { "\u{25b6}" };
    let hidden = if expanded { "" } else { " hidden" };
    let share_url = format!("{}/?article={}", config.site.base_url, article.slug);

    let thumbnail = article
        .featured_image
        .as_deref()
        .map(|src| {
            format!(
                "<div class=\"thumbnail\">{}</div>",
                image_tag(src, &article.title, "thumbnail-image", 120, 80)
            )
        })
        .unwrap_or_default();

    let hero = article
        .featured_image
        .as_deref()
        .map(|src| {
            format!(
                "<div class=\"featured-image-container\">{}</div>",
                image_tag(src, &article.title, "featured-image", 800, 400)
            )
        })
        .unwrap_or_default();

    format!(
        "<div id=\"article-{slug}\" class=\"article\">\
         <a class=\"article-header\" href=\"{href}\" data-slug=\"{slug}\">\
         {thumbnail}\
         <div class=\"header-content\">\
         <h2 class=\"title\">{title}</h2>\
         <p class=\"date\">{date}</p>\
         <p class=\"description\">{description}</p>\
         </div>\
         <span class=\"expand-icon\">{icon}</span>\
         </a>\
         <div class=\"article-content\"{hidden}>\
         <div class=\"article-actions\">{share}</div>\
         {hero}\
         {body}\
         </div>\
         </div>\n",
        slug = encode_attribute(&article.slug),
        href = encode_attribute(&expansion.toggle_href(&article.slug)),
        title = encode_minimal(&article.title),
        date = encode_minimal(&article.date),
        description = encode_minimal(&article.description),
        share = share_button(&share_url, &article.title),
        body = render_article_html(&article.content, highlighter),
    )
}

/// The standalone detail page, with page metadata and social-preview tags.
pub fn render_detail(
    layout: &str,
    config: &SiteConfig,
    article: &Article,
    highlighter: &Highlighter,
    is_development: bool,
) -> String {
    let page_title = format!(
        "{} | {}",
        encode_minimal(&article.title),
        encode_minimal(&config.site.title)
    );
    let article_url = format!("{}/articles/{}", config.site.base_url, article.slug);

    let mut head = format!(
        "<meta name=\"description\" content=\"{description}\">\n\
         <meta property=\"og:title\" content=\"{title}\">\n\
         <meta property=\"og:description\" content=\"{description}\">\n\
         <meta property=\"og:type\" content=\"article\">\n\
         <meta name=\"twitter:card\" content=\"summary_large_image\">\n",
        description = encode_attribute(&article.description),
        title = encode_attribute(&article.title),
    );
    if let Some(image) = article.featured_image.as_deref() {
        head.push_str(&format!(
            "<meta property=\"og:image\" content=\"{}\">\n",
            encode_attribute(&format!("{}{image}", config.site.base_url))
        ));
    }

    let hero = article
        .featured_image
        .as_deref()
        .map(|src| {
            format!(
                "<div class=\"featured-image-container\">{}</div>",
                image_tag(src, &article.title, "featured-image", 1200, 600)
            )
        })
        .unwrap_or_default();

    let description = if article.description.is_empty() {
        String::new()
    } else {
        format!(
            "<p class=\"description\">{}</p>",
            encode_minimal(&article.description)
        )
    };

    let content = format!(
        "<div class=\"article-wrapper\">\
         <a href=\"/\" class=\"back-link\">\u{2190} Back to Articles</a>\
         <article class=\"article-page\">\
         <header class=\"article-page-header\">\
         <h1 class=\"title\">{title}</h1>\
         <div class=\"meta\"><span class=\"date\">{date}</span>{share}</div>\
         {description}\
         </header>\
         {hero}\
         <div class=\"content\">{body}</div>\
         </article>\
         </div>",
        title = encode_minimal(&article.title),
        date = encode_minimal(&article.date),
        share = share_button(&article_url, &article.title),
        body = render_article_html(&article.content, highlighter),
    );

    let mut scripts = SHARE_SCRIPT.to_string();
    if is_development {
        scripts.push_str(HOT_RELOAD_SCRIPT);
    }
    render_with_layout(
        layout,
        &encode_minimal(&config.site.title),
        &page_title,
        &head,
        &content,
        &scripts,
    )
}

/// The not-found page for an unknown article slug. The template supports a
/// `{{slug}}` placeholder.
pub fn render_not_found(
    layout: &str,
    config: &SiteConfig,
    template: &str,
    slug: &str,
    is_development: bool,
) -> String {
    let content = template.replace("{{slug}}", &encode_minimal(slug));
    let title = format!("Not found | {}", encode_minimal(&config.site.title));
    let scripts = if is_development { HOT_RELOAD_SCRIPT } else { "" };
    render_with_layout(
        layout,
        &encode_minimal(&config.site.title),
        &title,
        "",
        &content,
        scripts,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrontMatter;

    const LAYOUT: &str = "<html><head><title>{{ title }}</title>{{ head }}</head>\
                          <body>{{ content }}</body></html>";

    fn article(slug: &str, title: &str, featured: Option<&str>) -> Article {
        Article::new(
            slug.to_string(),
            FrontMatter {
                title: Some(title.to_string()),
                date: Some("2024-05-01".to_string()),
                description: Some(format!("about {title}")),
                featured_image: featured.map(str::to_string),
            },
            format!("Body of {title}.\n\n```python\nprint(\"{slug}\")\n```\n"),
        )
    }

    fn config() -> SiteConfig {
        SiteConfig::default()
    }

    #[test]
    fn collection_marks_only_the_expanded_article_visible() {
        let articles = vec![article("one", "One", None), article("two", "Two", None)];
        let expansion = Expansion::Expanded("two".to_string());
        let page = render_collection(
            LAYOUT,
            &config(),
            &articles,
            &expansion,
            &Highlighter::new(),
            false,
        );

        // Exactly one of the two bodies is rendered without `hidden`.
        assert_eq!(page.matches("<div class=\"article-content\" hidden>").count(), 1);
        assert_eq!(page.matches("<div class=\"article-content\">").count(), 1);
        // The expanded card's link collapses, the other's expands.
        assert!(page.contains("href=\"&#x2F;\""));
        let expand_one = format!("href=\"{}\"", encode_attribute("/?article=one"));
        assert!(page.contains(&expand_one));
    }

    #[test]
    fn collection_wires_the_expand_and_share_scripts() {
        let articles = vec![article("one", "One", None)];
        let page = render_collection(
            LAYOUT,
            &config(),
            &articles,
            &Expansion::Collapsed,
            &Highlighter::new(),
            false,
        );
        assert!(page.contains("history.pushState"));
        assert!(page.contains("scrollIntoView"));
        assert!(page.contains("navigator.share"));
        assert!(page.contains("COPY_CONFIRM_MS = 2000"));
        assert!(page.contains("data-share-url"));
        assert!(!page.contains("window.location.reload"));
    }

    #[test]
    fn back_navigation_resyncs_expansion_from_the_url() {
        let articles = vec![article("one", "One", None)];
        let page = render_collection(
            LAYOUT,
            &config(),
            &articles,
            &Expansion::Collapsed,
            &Highlighter::new(),
            false,
        );
        assert!(page.contains("addEventListener(\"popstate\", applyFromUrl)"));
        // The popstate path collapses everything when the parameter is gone.
        assert!(page.contains("item.id === `article-${slug}`"));
    }

    #[test]
    fn development_mode_injects_the_reload_script() {
        let page = render_collection(
            LAYOUT,
            &config(),
            &[],
            &Expansion::Collapsed,
            &Highlighter::new(),
            true,
        );
        assert!(page.contains("window.location.reload"));
    }

    #[test]
    fn detail_page_carries_social_preview_tags() {
        let page = render_detail(
            LAYOUT,
            &config(),
            &article("one", "One", Some("/images/one.png")),
            &Highlighter::new(),
            false,
        );
        assert!(page.contains("<title>One | Articles</title>"));
        assert!(page.contains("og:title"));
        assert!(page.contains("og:image"));
        assert!(page.contains("twitter:card"));
        assert!(page.contains("Back to Articles"));
        assert!(page.contains("width=\"1200\""));
    }

    #[test]
    fn detail_without_featured_image_omits_og_image() {
        let page = render_detail(
            LAYOUT,
            &config(),
            &article("one", "One", None),
            &Highlighter::new(),
            false,
        );
        assert!(!page.contains("og:image"));
        assert!(!page.contains("featured-image-container"));
    }

    #[test]
    fn not_found_substitutes_the_slug() {
        let page = render_not_found(
            LAYOUT,
            &config(),
            "<p>No article called {{slug}}.</p>",
            "ghost",
            false,
        );
        assert!(page.contains("No article called ghost."));
        assert!(page.contains("<title>Not found | Articles</title>"));
    }

    #[test]
    fn card_metadata_is_escaped() {
        let articles = vec![article("xss", "<script>alert(1)</script>", None)];
        let page = render_collection(
            LAYOUT,
            &config(),
            &articles,
            &Expansion::Collapsed,
            &Highlighter::new(),
            false,
        );
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
    }
}
