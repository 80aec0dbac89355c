//! Markdown-to-HTML formatting for streamed turns.
//!
//! Pure and idempotent: the same `content` always renders the same HTML,
//! so re-rendering on every chunk arrival is safe. Raw HTML in the model
//! output is escaped, never passed through.

use pulldown_cmark::{html, Event, Options, Parser};

/// Render markdown to HTML, escaping any raw HTML first.
pub fn format(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    // Re-emit raw HTML events as text; push_html escapes text events.
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, parser);
    out
}
