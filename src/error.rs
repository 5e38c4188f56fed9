//! Pipeline error taxonomy.
//!
//! Errors at page granularity abort only that page; errors at run-setup
//! granularity (unreadable export root, missing navigation index) are
//! surfaced to the caller. Missing attachments are not represented here:
//! they are logged at the element level and the reference is left as-is.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The HTML could not be interpreted where a parse is required to
    /// proceed (e.g. the navigation index yields no page list).
    #[error("malformed HTML: {0}")]
    Parse(String),

    /// A file or directory operation failed.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// HTML-to-Markdown conversion produced no usable content.
    #[error("conversion failed: {0}")]
    Conversion(String),

    /// A remote call returned a non-success status or a response missing
    /// required fields. The pipeline performs no retries.
    #[error("remote call failed: {0}")]
    Remote(String),
}

impl Error {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }
}
