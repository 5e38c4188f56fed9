//! Remote publish orchestration.
//!
//! Walks the page forest depth-first, converting each page and creating
//! remote documents with parent linkage: a parent is always created before
//! its children, and a child carries the identifier of its nearest
//! successfully created ancestor. When a page fails (or the operator
//! declines it), its children are still attempted with that ancestor
//! identifier, or at top level if none exists; sibling subtrees are never
//! affected. The converted Markdown of every created document is also
//! archived locally, named by the source file stem.

use std::collections::HashSet;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use tracing::{debug, error, info, warn};

use crate::attach;
use crate::convert;
use crate::error::{Error, Result};
use crate::hierarchy::{self, Page};
use crate::remote::DocumentStore;
use crate::review;
use crate::summary::RunSummary;

const NAV_INDEX: &str = "index.html";

pub async fn run_publish<S: DocumentStore + ?Sized>(
    store: &S,
    input: &Path,
    archive: &Path,
    collection_id: &str,
    verify: bool,
) -> Result<RunSummary> {
    fs::create_dir_all(archive).map_err(|e| {
        Error::io(
            format!("failed to create output directory {}", archive.display()),
            e,
        )
    })?;

    let index = input.join(NAV_INDEX);
    let html = fs::read_to_string(&index)
        .map_err(|e| Error::io(format!("failed to read {}", index.display()), e))?;
    let forest = hierarchy::extract_pages(&html)?;

    let mut publisher = Publisher {
        store,
        input,
        archive,
        collection_id,
        verify,
        seen: HashSet::new(),
        summary: RunSummary::default(),
    };
    publisher.walk(&forest, None).await;

    info!(summary = %publisher.summary, "publish finished");
    Ok(publisher.summary)
}

struct Publisher<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    input: &'a Path,
    archive: &'a Path,
    collection_id: &'a str,
    verify: bool,
    /// Source references already processed this run.
    seen: HashSet<String>,
    summary: RunSummary,
}

impl<S: DocumentStore + ?Sized> Publisher<'_, S> {
    /// Recursion is boxed because the future type is self-referential. The
    /// walk is strictly sequential; the only suspension points are the
    /// store's rate-limited calls.
    fn walk<'a>(
        &'a mut self,
        pages: &'a [Page],
        parent: Option<String>,
    ) -> Pin<Box<dyn Future<Output = ()> + 'a>> {
        Box::pin(async move {
            for page in pages {
                if page.source_ref.is_empty() {
                    debug!(title = %page.title, "placeholder page, descending");
                    self.walk(&page.children, parent.clone()).await;
                    continue;
                }

                if !self.seen.insert(page.source_ref.clone()) {
                    info!(source = %page.source_ref, "already processed, skipping duplicate");
                    self.summary.duplicates += 1;
                    continue;
                }

                // Children inherit the last successfully created ancestor's
                // identifier; on failure or decline that is simply the
                // incoming parent (possibly none, i.e. top level).
                let mut next_parent = parent.clone();
                match self.publish_page(page, parent.as_deref()).await {
                    Ok(Some(document_id)) => {
                        self.summary.created += 1;
                        next_parent = Some(document_id);
                    }
                    Ok(None) => {
                        info!(source = %page.source_ref, "skipping this document");
                        self.summary.declined += 1;
                    }
                    Err(e) => {
                        error!(source = %page.source_ref, error = %e, "error processing page");
                        self.summary.failed += 1;
                    }
                }

                if !page.children.is_empty() {
                    self.walk(&page.children, next_parent).await;
                }
            }
        })
    }

    /// Runs one page through read → relocate → convert → verify → create.
    /// Returns the created document's identifier, or `None` when the
    /// operator declined persistence.
    async fn publish_page(&mut self, page: &Page, parent: Option<&str>) -> Result<Option<String>> {
        let source = self.input.join(&page.source_ref);
        let html = fs::read_to_string(&source)
            .map_err(|e| Error::io(format!("failed to read {}", source.display()), e))?;

        let source_dir = source.parent().unwrap_or(self.input);
        let relocated = attach::relocate_remote(&html, source_dir, self.store).await?;
        let converted = convert::convert(&relocated)?;

        if self.verify && !review::confirm_page(&source.display().to_string(), &converted.markdown)
        {
            return Ok(None);
        }

        let title = if page.title.is_empty() {
            converted.title.as_str()
        } else {
            page.title.as_str()
        };

        let document_id = self
            .store
            .create_document(title, &converted.markdown, self.collection_id, parent)
            .await?;
        info!(title, id = %document_id, "successfully created document");

        // Archive failures don't undo the remote creation; keep the
        // identifier so children stay linked.
        if let Err(e) = self.archive_markdown(&source, &converted.markdown) {
            warn!(source = %source.display(), error = %e, "failed to archive markdown copy");
        }

        Ok(Some(document_id))
    }

    fn archive_markdown(&self, source: &Path, markdown: &str) -> Result<()> {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".to_string());
        let path = self.archive.join(format!("{}.md", stem));
        fs::write(&path, markdown)
            .map_err(|e| Error::io(format!("failed to write {}", path.display()), e))?;
        info!(path = %path.display(), "archived markdown copy");
        Ok(())
    }
}
