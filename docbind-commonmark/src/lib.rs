//! # docbind-commonmark
//!
//! Per-document processing for docbind: frontmatter extraction, the inline
//! text transforms applied to MDX/Markdown sources, and the CommonMark
//! renderer used to turn a prepared body into HTML.
//!
//! ## Quick Start
//!
//! ```rust
//! use docbind_commonmark::{MarkdownOptions, MarkdownProcessor, parse_document};
//!
//! let source = "---\ntitle: Intro\n---\n# Hello\n";
//! let (metadata, body) = parse_document(source);
//! assert_eq!(
//!   metadata.frontmatter().and_then(|fm| fm.title()).as_deref(),
//!   Some("Intro")
//! );
//!
//! let processor = MarkdownProcessor::new(MarkdownOptions::default());
//! let html = processor.render(body);
//! assert!(html.contains("<h1"));
//! ```

pub mod error;
pub mod frontmatter;
pub mod processor;
pub mod transforms;
pub mod utils;

pub use crate::{
  error::FrontmatterError,
  frontmatter::{
    Frontmatter,
    Metadata,
    Related,
    parse_document,
    parse_frontmatter,
    split_frontmatter,
  },
  processor::{MarkdownOptions, MarkdownOptionsBuilder, MarkdownProcessor},
  transforms::{ImageRewrite, Transforms},
};
