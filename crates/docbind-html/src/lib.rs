//! Walking a documentation tree and assembling it into one HTML document.
//!
//! [`walker::collect_documents`] lists the documents in export order,
//! [`Assembler`] numbers them and accumulates their HTML, and
//! [`Templates`] wraps the result in the shared page envelope.
pub mod assembler;
pub mod error;
pub mod template;
pub mod toc;
pub mod version;
pub mod walker;

pub use crate::{
  assembler::{AssembledOutput, Assembler, PAGE_BREAK},
  error::HtmlError,
  template::Templates,
  toc::{NumberingState, TocBuilder, TocEntry},
  version::{OutputNames, find_latest_version},
  walker::collect_documents,
};
