use htmlescape::{encode_attribute, encode_minimal};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::highlight::Highlighter;

/// Fixed dimensions for images embedded in article bodies.
const CONTENT_IMAGE_WIDTH: u32 = 800;
const CONTENT_IMAGE_HEIGHT: u32 = 500;

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options
}

/// Renders an article body to HTML with two node substitutions: images
/// become fixed-size figures with the alt text as a visible caption, and
/// fenced code blocks with a language tag go through the syntax highlighter
/// when its theme has resolved. Before the theme resolves the same block
/// renders as plain escaped code, so the first paint never waits on it.
pub fn render_article_html(markdown: &str, highlighter: &Highlighter) -> String {
    let mut parser = Parser::new_ext(markdown, markdown_options());
    let mut events: Vec<Event> = Vec::new();

    while let Some(event) = parser.next() {
        match event {
            Event::Start(Tag::Image { dest_url, .. }) => {
                let alt = collect_alt_text(&mut parser);
                let figure = image_figure(&dest_url, &alt);
                events.push(Event::Html(CowStr::Boxed(figure.into_boxed_str())));
            }
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) if !info.is_empty() => {
                let language = language_token(&info);
                let code = collect_code_text(&mut parser);
                let block = code_block_html(&code, language, highlighter);
                events.push(Event::Html(CowStr::Boxed(block.into_boxed_str())));
            }
            other => events.push(other),
        }
    }

    let mut html_out = String::new();
    html::push_html(&mut html_out, events.into_iter());
    html_out
}

/// Flattens the inline events between an image start and end tag into the
/// alt text. Inline markup inside the alt is dropped, matching how the text
/// would read in an `alt` attribute.
fn collect_alt_text<'a>(parser: &mut Parser<'a>) -> String {
    let mut alt = String::new();
    for event in parser.by_ref() {
        match event {
            Event::End(TagEnd::Image) => break,
            Event::Text(text) | Event::Code(text) => alt.push_str(&text),
            Event::SoftBreak | Event::HardBreak => alt.push(' '),
            _ => {}
        }
    }
    alt
}

fn collect_code_text<'a>(parser: &mut Parser<'a>) -> String {
    let mut code = String::new();
    for event in parser.by_ref() {
        match event {
            Event::End(TagEnd::CodeBlock) => break,
            Event::Text(text) => code.push_str(&text),
            _ => {}
        }
    }
    code
}

/// First token of a fence info string; `rust,ignore` and `rust ignore`
/// both highlight as `rust`.
fn language_token(info: &str) -> &str {
    info.split([',', ' ']).next().unwrap_or_default()
}

fn image_figure(src: &str, alt: &str) -> String {
    let src_attr = encode_attribute(src);
    let alt_attr = encode_attribute(alt);
    let mut out = format!(
        "<figure class=\"image-container\">\
         <img src=\"{src_attr}\" alt=\"{alt_attr}\" \
         width=\"{CONTENT_IMAGE_WIDTH}\" height=\"{CONTENT_IMAGE_HEIGHT}\" \
         loading=\"lazy\" decoding=\"async\">"
    );
    if !alt.is_empty() {
        out.push_str(&format!(
            "<figcaption class=\"image-description\">{}</figcaption>",
            encode_minimal(alt)
        ));
    }
    out.push_str("</figure>");
    out
}

fn code_block_html(code: &str, language: &str, highlighter: &Highlighter) -> String {
    // Fenced blocks carry a trailing newline; drop it so both render phases
    // show identical text.
    let code = code.strip_suffix('\n').unwrap_or(code);
    match highlighter.highlight(code, language) {
        Some(highlighted) => format!("<div class=\"code-block\">{highlighted}</div>"),
        None => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            encode_attribute(language),
            encode_minimal(code)
        ),
    }
}
