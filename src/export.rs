//! Local Markdown export.
//!
//! Mirrors the navigation tree onto a directory structure: one directory
//! per page, named after the sanitized title, holding the page's Markdown
//! and, when referenced, a sibling `attachments/` directory. Needs no
//! remote configuration and performs no network I/O.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::attach;
use crate::convert;
use crate::error::{Error, Result};
use crate::hierarchy::{self, Page};
use crate::review;
use crate::summary::RunSummary;

const UNTITLED: &str = "untitled";
const NAV_INDEX: &str = "index.html";

pub fn run_export(input: &Path, output: &Path, verify: bool) -> Result<RunSummary> {
    fs::create_dir_all(output).map_err(|e| {
        Error::io(
            format!("failed to create output directory {}", output.display()),
            e,
        )
    })?;

    let index = input.join(NAV_INDEX);
    let html = fs::read_to_string(&index)
        .map_err(|e| Error::io(format!("failed to read {}", index.display()), e))?;
    let forest = hierarchy::extract_pages(&html)?;

    let mut exporter = Exporter {
        input,
        output,
        verify,
        seen: HashSet::new(),
        summary: RunSummary::default(),
    };
    exporter.walk(&forest, Path::new(""));

    info!(summary = %exporter.summary, "export finished");
    Ok(exporter.summary)
}

struct Exporter<'a> {
    input: &'a Path,
    output: &'a Path,
    verify: bool,
    /// Source references already processed this run. A page reachable via
    /// two tree paths is persisted once.
    seen: HashSet<String>,
    summary: RunSummary,
}

impl Exporter<'_> {
    fn walk(&mut self, pages: &[Page], parent_rel: &Path) {
        for page in pages {
            if page.source_ref.is_empty() {
                // Synthetic placeholder: nothing to convert, but the
                // subtree still gets a directory level.
                debug!(title = %page.title, "placeholder page, descending");
                let dir_rel = parent_rel.join(sanitize_title(&page.title));
                self.walk(&page.children, &dir_rel);
                continue;
            }

            if !self.seen.insert(page.source_ref.clone()) {
                info!(source = %page.source_ref, "already processed, skipping duplicate");
                self.summary.duplicates += 1;
                continue;
            }

            let dir_rel = parent_rel.join(sanitize_title(&page.title));
            match self.export_page(page, &dir_rel) {
                Ok(true) => self.summary.created += 1,
                Ok(false) => {
                    info!(source = %page.source_ref, "skipping this document");
                    self.summary.declined += 1;
                }
                Err(e) => {
                    error!(source = %page.source_ref, error = %e, "error processing page");
                    self.summary.failed += 1;
                }
            }

            // Children are written under the mirrored path regardless of
            // this page's outcome; local output needs no identifier linkage.
            self.walk(&page.children, &dir_rel);
        }
    }

    fn export_page(&mut self, page: &Page, dir_rel: &Path) -> Result<bool> {
        let page_dir = self.output.join(dir_rel);
        fs::create_dir_all(&page_dir).map_err(|e| {
            Error::io(
                format!("failed to create directory {}", page_dir.display()),
                e,
            )
        })?;

        let source = self.input.join(&page.source_ref);
        let html = fs::read_to_string(&source)
            .map_err(|e| Error::io(format!("failed to read {}", source.display()), e))?;

        let source_dir = source.parent().unwrap_or(self.input);
        let relocated = attach::relocate_local(&html, source_dir, &page_dir)?;
        let converted = convert::convert(&relocated)?;

        if self.verify && !review::confirm_page(&source.display().to_string(), &converted.markdown)
        {
            return Ok(false);
        }

        let output_path = page_markdown_path(&page_dir);
        fs::write(&output_path, &converted.markdown)
            .map_err(|e| Error::io(format!("failed to write {}", output_path.display()), e))?;

        info!(path = %output_path.display(), "processed and saved");
        Ok(true)
    }
}

/// The page's Markdown file carries the directory's own name.
fn page_markdown_path(page_dir: &Path) -> PathBuf {
    let name = page_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| UNTITLED.to_string());
    page_dir.join(format!("{}.md", name))
}

/// Replaces reserved filesystem characters with underscores. Empty titles
/// fall back to a fixed placeholder name.
pub fn sanitize_title(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect();
    let trimmed = replaced.trim_matches(|c| c == ' ' || c == '.');

    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_title("a/b:c?d"), "a_b_c_d");
        assert_eq!(sanitize_title("plain name"), "plain name");
    }

    #[test]
    fn sanitize_trims_spaces_and_dots() {
        assert_eq!(sanitize_title("  name. "), "name");
    }

    #[test]
    fn sanitize_empty_falls_back() {
        assert_eq!(sanitize_title(""), UNTITLED);
        assert_eq!(sanitize_title(" . "), UNTITLED);
        assert_eq!(sanitize_title("???"), "___");
    }

    #[test]
    fn markdown_file_carries_directory_name() {
        let path = page_markdown_path(Path::new("/out/Guides"));
        assert_eq!(path, Path::new("/out/Guides/Guides.md"));
    }
}
