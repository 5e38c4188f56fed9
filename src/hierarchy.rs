//! Navigation-tree recovery.
//!
//! The export's `index.html` encodes the page hierarchy as nested `<ul>`
//! lists of links. This module turns that fragment into an ordered forest
//! of [`Page`] nodes. Only top-level lists (a `ul` with no `ul` ancestor)
//! seed the forest; nested lists become children, so a page reachable from
//! two parents appears once per path and de-duplication is left to the
//! orchestrator.

use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};

/// The export's own root entry. It links back to the index, not to real
/// content, and is dropped from the top level of the forest.
const ROOT_SENTINEL: &str = "Home";

/// One node of the navigation tree. Constructed once during extraction and
/// read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Display name. May collide across siblings.
    pub title: String,
    /// Relative path to the page's HTML source. Unique per node; empty only
    /// for synthetic placeholder nodes.
    pub source_ref: String,
    /// Insertion order is navigation order.
    pub children: Vec<Page>,
}

impl Page {
    fn is_empty(&self) -> bool {
        self.title.is_empty() && self.source_ref.is_empty() && self.children.is_empty()
    }
}

/// Extracts the page forest from a navigation document.
///
/// Returns `Error::Parse` when the document holds no list at all, which
/// would otherwise make the whole run a silent no-op.
pub fn extract_pages(html: &str) -> Result<Vec<Page>> {
    let doc = Html::parse_document(html);
    let ul_sel = Selector::parse("ul").unwrap();

    let mut found_list = false;
    let mut forest = Vec::new();

    for list in doc.select(&ul_sel) {
        // Only top-level lists seed the forest; nested ones are consumed by
        // their enclosing list item.
        let nested = list
            .ancestors()
            .any(|a| a.value().as_element().is_some_and(|e| e.name() == "ul"));
        if nested {
            continue;
        }
        found_list = true;

        for item in direct_items(list) {
            if let Some(page) = convert_item(item) {
                if page.title == ROOT_SENTINEL {
                    continue;
                }
                forest.push(page);
            }
        }
    }

    if !found_list {
        return Err(Error::Parse(
            "document contains no navigation list".to_string(),
        ));
    }

    Ok(forest)
}

fn direct_items(list: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "li")
}

/// Converts one `<li>` into a candidate [`Page`].
///
/// The leading anchor supplies title and source reference; nested lists
/// supply children. An item with neither yields nothing. An item whose
/// nested list appears before any anchor yields a placeholder page so the
/// children stay attached.
fn convert_item(item: ElementRef<'_>) -> Option<Page> {
    let mut page: Option<Page> = None;

    if let Some(anchor) = leading_anchor(item) {
        let title = anchor.text().collect::<String>().trim().to_string();
        let source_ref = anchor.value().attr("href").unwrap_or_default().to_string();
        page = Some(Page {
            title,
            source_ref,
            children: Vec::new(),
        });
    }

    for child in item.children() {
        let Some(el) = ElementRef::wrap(child) else {
            continue;
        };
        if el.value().name() != "ul" {
            continue;
        }
        let parent = page.get_or_insert_with(Page::default);
        for nested_item in direct_items(el) {
            if let Some(child_page) = convert_item(nested_item) {
                parent.children.push(child_page);
            }
        }
    }

    page.filter(|p| !p.is_empty())
}

/// First anchor in document order that precedes any nested list. Anchors
/// inside a nested list belong to child items, not to this one.
fn leading_anchor(item: ElementRef<'_>) -> Option<ElementRef<'_>> {
    for node in item.descendants().skip(1) {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        match el.value().name() {
            "ul" => return None,
            "a" => return Some(el),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav(body: &str) -> String {
        format!("<html><head><title>Space</title></head><body>{}</body></html>", body)
    }

    #[test]
    fn recovers_nested_forest_in_order() {
        let html = nav(
            r#"<ul>
                <li><a href="a.html">A</a>
                    <ul>
                        <li><a href="b.html">B</a></li>
                        <li><a href="c.html">C</a></li>
                    </ul>
                </li>
                <li><a href="d.html">D</a></li>
            </ul>"#,
        );
        let forest = extract_pages(&html).unwrap();
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].title, "A");
        assert_eq!(forest[0].source_ref, "a.html");
        let children: Vec<&str> = forest[0].children.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(children, ["B", "C"]);
        assert_eq!(forest[1].title, "D");
    }

    #[test]
    fn extraction_is_deterministic() {
        let html = nav(
            r#"<ul>
                <li><a href="a.html">A</a><ul><li><a href="b.html">B</a></li></ul></li>
            </ul>"#,
        );
        let first = extract_pages(&html).unwrap();
        let second = extract_pages(&html).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn home_dropped_only_at_top_level() {
        let html = nav(
            r#"<ul>
                <li><a href="index.html">Home</a></li>
                <li><a href="a.html">A</a>
                    <ul><li><a href="home.html">Home</a></li></ul>
                </li>
            </ul>"#,
        );
        let forest = extract_pages(&html).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].title, "A");
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].title, "Home");
    }

    #[test]
    fn item_with_only_nested_list_yields_placeholder_with_children() {
        let html = nav(
            r#"<ul>
                <li>
                    <ul><li><a href="b.html">B</a></li></ul>
                </li>
            </ul>"#,
        );
        let forest = extract_pages(&html).unwrap();
        assert_eq!(forest.len(), 1);
        assert!(forest[0].title.is_empty());
        assert!(forest[0].source_ref.is_empty());
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].title, "B");
    }

    #[test]
    fn item_with_no_anchor_and_no_list_is_dropped() {
        let html = nav(r#"<ul><li>just text</li><li><a href="a.html">A</a></li></ul>"#);
        let forest = extract_pages(&html).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].title, "A");
    }

    #[test]
    fn anchor_wrapped_in_span_is_still_found() {
        let html = nav(
            r#"<ul>
                <li><span><a href="a.html">A</a></span>
                    <ul><li><a href="b.html">B</a></li></ul>
                </li>
            </ul>"#,
        );
        let forest = extract_pages(&html).unwrap();
        assert_eq!(forest[0].title, "A");
        assert_eq!(forest[0].children[0].title, "B");
    }

    #[test]
    fn document_without_any_list_is_a_parse_error() {
        let html = nav("<p>nothing here</p>");
        assert!(matches!(extract_pages(&html), Err(Error::Parse(_))));
    }

    #[test]
    fn empty_list_yields_empty_forest() {
        let html = nav("<ul></ul>");
        assert_eq!(extract_pages(&html).unwrap(), Vec::<Page>::new());
    }
}
