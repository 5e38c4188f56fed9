//! HTML page to Markdown conversion.
//!
//! Takes a page's (already attachment-rewritten) HTML, pulls the title out
//! of `<title>`, strips the export shell, and converts the main content
//! region to Markdown with `htmd`.

use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{Error, Result};

const FALLBACK_TITLE: &str = "Untitled Document";

/// Shell elements that never belong to page content.
const SHELL_SELECTOR: &str = "head, script, style, #main-header, #footer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedPage {
    pub title: String,
    pub markdown: String,
}

/// Converts one page's HTML to `(title, markdown)`.
pub fn convert(html: &str) -> Result<ConvertedPage> {
    let mut doc = Html::parse_document(html);

    // Title lives in <head>, read it before the shell is stripped.
    let title = extract_title(&doc);

    let shell_sel = Selector::parse(SHELL_SELECTOR).unwrap();
    let shell_ids: Vec<_> = doc.select(&shell_sel).map(|el| el.id()).collect();
    for id in shell_ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }

    let content_html = content_region(&doc);

    let markdown =
        htmd::convert(&content_html).map_err(|e| Error::Conversion(e.to_string()))?;
    let markdown = tidy_markdown(&markdown);

    Ok(ConvertedPage { title, markdown })
}

/// Export titles look like "Space Name : Page Title"; the last segment is
/// the page's own name.
fn extract_title(doc: &Html) -> String {
    let title_sel = Selector::parse("title").unwrap();
    let full = doc
        .select(&title_sel)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();
    let title = full.rsplit(':').next().unwrap_or("").trim().to_string();
    if title.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        title
    }
}

/// The export wraps real content in `#main-content`; fall back to `<body>`
/// for pages without the wrapper.
fn content_region(doc: &Html) -> String {
    let main_sel = Selector::parse("#main-content").unwrap();
    if let Some(main) = doc.select(&main_sel).next() {
        return main.html();
    }
    let body_sel = Selector::parse("body").unwrap();
    if let Some(body) = doc.select(&body_sel).next() {
        return body.inner_html();
    }
    doc.html()
}

fn tidy_markdown(markdown: &str) -> String {
    let collapsed = Regex::new(r"\n{3,}")
        .unwrap()
        .replace_all(markdown, "\n\n")
        .into_owned();
    let trimmed = collapsed.trim();
    format!("{}\n", trimmed)
}
