//! # Arbor
//!
//! Migrate an exported HTML knowledge base to Markdown or a remote wiki.
//!
//! Arbor reads an export directory (an `index.html` navigation shell plus
//! per-page HTML files and `attachments/` folders), recovers the page
//! hierarchy from the navigation lists, and migrates each page exactly
//! once: either onto a mirrored local directory tree of Markdown files, or
//! into a remote document-management instance with parent/child linkage
//! preserved and outbound calls rate limited.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────────────────────┐   ┌──────────────┐
//! │ Export dir │──▶│ hierarchy → attach →      │──▶│ Markdown tree │
//! │ index.html │   │ convert   (per page,      │   ├──────────────┤
//! │ pages + att│   │ depth-first, deduplicated)│   │ Remote API    │
//! └────────────┘   └───────────────────────────┘   │ (rate-limited)│
//!                                                  └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`hierarchy`] | Navigation-tree recovery |
//! | [`attach`] | Attachment relocation and reference rewriting |
//! | [`convert`] | HTML to Markdown conversion |
//! | [`rate`] | Sliding-window rate limiter |
//! | [`remote`] | Remote API client and `DocumentStore` seam |
//! | [`export`] | Local Markdown export orchestration |
//! | [`publish`] | Remote publish orchestration |
//! | [`review`] | Interactive verification prompt |
//! | [`summary`] | Per-run outcome accounting |

pub mod attach;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod publish;
pub mod rate;
pub mod remote;
pub mod review;
pub mod summary;
