//! Attachment reference relocation.
//!
//! Pages reference binary files through `img src` / `a href` values under
//! an `attachments/` prefix. Before conversion those references are
//! rewritten: in local mode the file is copied next to the page's output
//! and the reference made relative again; in remote mode the file is
//! uploaded and the reference becomes a retrieval URL. A reference whose
//! file is missing on disk is logged and left untouched; it never fails
//! the page. Emoticon images are decoration added by the export and are
//! removed outright.
//!
//! The work is split into pure stages: scan the document for candidate
//! references, resolve each to a replacement value, then apply all
//! replacements and serialize. The scan and apply stages never touch the
//! file system, which keeps them testable on bare strings.

use std::collections::BTreeMap;
use std::path::Path;

use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::remote::DocumentStore;

const ATTACHMENT_PREFIX: &str = "attachments/";
const OUTPUT_SUBDIR: &str = "attachments";

/// Strips a query suffix and normalizes separators so the reference can be
/// resolved as a relative path.
pub fn clean_path(reference: &str) -> String {
    let without_query = reference.split('?').next().unwrap_or(reference);
    without_query.replace('\\', "/").replace("//", "/")
}

/// Attachment references in document order, emoticon images excluded,
/// de-duplicated.
fn scan_references(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut seen = Vec::new();

    for (selector, attr) in [("img", "src"), ("a", "href")] {
        let sel = Selector::parse(selector).unwrap();
        for element in doc.select(&sel) {
            if attr == "src" && has_class(element.value(), "emoticon") {
                continue;
            }
            let Some(value) = element.value().attr(attr) else {
                continue;
            };
            if value.starts_with(ATTACHMENT_PREFIX) && !seen.iter().any(|s| s == value) {
                seen.push(value.to_string());
            }
        }
    }

    seen
}

fn has_class(element: &scraper::node::Element, class: &str) -> bool {
    element.classes().any(|c| c == class)
}

/// Removes emoticon images and substitutes the resolved references, then
/// serializes the document back to HTML.
fn rewrite_references(html: &str, replacements: &BTreeMap<String, String>) -> String {
    let mut doc = Html::parse_document(html);

    let emoticon_sel = Selector::parse("img.emoticon").unwrap();
    let emoticon_ids: Vec<_> = doc.select(&emoticon_sel).map(|el| el.id()).collect();
    for id in emoticon_ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }

    for (selector, attr) in [("img[src]", "src"), ("a[href]", "href")] {
        let sel = Selector::parse(selector).unwrap();
        let targets: Vec<_> = doc
            .select(&sel)
            .filter_map(|el| {
                el.value()
                    .attr(attr)
                    .and_then(|value| replacements.get(value))
                    .map(|new_value| (el.id(), new_value.clone()))
            })
            .collect();

        for (id, new_value) in targets {
            let Some(mut node) = doc.tree.get_mut(id) else {
                continue;
            };
            if let scraper::Node::Element(element) = node.value() {
                for (name, value) in element.attrs.iter_mut() {
                    if name.local.as_ref() == attr {
                        *value = new_value.as_str().into();
                    }
                }
            }
        }
    }

    doc.html()
}

/// Local mode: copy each referenced file into an `attachments/` directory
/// beside the page's output and point the reference there. Base-name
/// collisions across distinct source paths are not disambiguated; the last
/// write wins.
pub fn relocate_local(html: &str, source_dir: &Path, page_dir: &Path) -> Result<String> {
    let mut replacements = BTreeMap::new();

    for reference in scan_references(html) {
        let clean = clean_path(&reference);
        let source = source_dir.join(&clean);
        if !source.is_file() {
            warn!(path = %source.display(), "attachment file not found");
            continue;
        }

        let Some(base_name) = source.file_name().map(|n| n.to_string_lossy().to_string())
        else {
            continue;
        };

        let dest_dir = page_dir.join(OUTPUT_SUBDIR);
        std::fs::create_dir_all(&dest_dir).map_err(|e| {
            Error::io(
                format!("failed to create attachments directory {}", dest_dir.display()),
                e,
            )
        })?;

        let dest = dest_dir.join(&base_name);
        std::fs::copy(&source, &dest).map_err(|e| {
            Error::io(
                format!(
                    "failed to copy attachment {} to {}",
                    source.display(),
                    dest.display()
                ),
                e,
            )
        })?;
        info!(from = %source.display(), to = %dest.display(), "copied attachment");

        replacements.insert(reference, format!("{}/{}", OUTPUT_SUBDIR, base_name));
    }

    Ok(rewrite_references(html, &replacements))
}

/// Remote mode: upload each referenced file through the store and point
/// the reference at the returned retrieval URL. Upload failures are
/// logged per reference and leave the original value in place.
pub async fn relocate_remote<S: DocumentStore + ?Sized>(
    html: &str,
    source_dir: &Path,
    store: &S,
) -> Result<String> {
    let references = scan_references(html);
    let mut replacements = BTreeMap::new();

    for reference in references {
        let clean = clean_path(&reference);
        let source = source_dir.join(&clean);
        if !source.is_file() {
            warn!(path = %source.display(), "attachment file not found");
            continue;
        }

        match store.upload_attachment(&source).await {
            Ok(Some(link)) => {
                info!(path = %source.display(), id = %link.id, "uploaded attachment");
                replacements.insert(reference, link.url);
            }
            Ok(None) => {
                // Skipped by the store (HTML file or unknown mimetype),
                // already logged there.
            }
            Err(e) => {
                warn!(path = %source.display(), error = %e, "failed to upload attachment, keeping original reference");
            }
        }
    }

    Ok(rewrite_references(html, &replacements))
}
