use std::{io, path::PathBuf, process::ExitStatus};

use docbind_html::HtmlError;
use thiserror::Error;

/// Error type for a full export run.
#[derive(Debug, Error)]
pub enum ExportError {
  #[error(
    "No content directory configured. Set `content_dir` or configure a sync \
     source."
  )]
  NoContent,

  #[error(transparent)]
  Html(#[from] HtmlError),

  #[error("Failed to write {}: {source}", .path.display())]
  Write {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Content sync failed: {0}")]
  Sync(#[from] SyncError),

  #[error("PDF rendering failed: {0}")]
  Pdf(#[from] PdfError),
}

/// Errors from the PDF renderer.
#[derive(Debug, Error)]
pub enum PdfError {
  #[error("Failed to launch {}: {source}", .binary.display())]
  Launch {
    binary: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("{} exited with {status}: {stderr}", .binary.display())]
  Failed {
    binary: PathBuf,
    status: ExitStatus,
    stderr: String,
  },

  #[error("Failed to stage renderer input: {0}")]
  Io(#[from] io::Error),
}

/// Errors from keeping the sparse checkout up to date.
#[derive(Debug, Error)]
pub enum SyncError {
  #[error("Failed to run git {command}: {source}")]
  Launch {
    command: String,
    #[source]
    source:  io::Error,
  },

  #[error("git {command} exited with {status}: {stderr}")]
  Git {
    command: String,
    status:  ExitStatus,
    stderr:  String,
  },

  #[error("Failed to prepare checkout in {}: {source}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Errors from detecting the image base URL. Always recovered from by
/// falling back to the configured value.
#[derive(Debug, Error)]
pub enum CdnError {
  #[error("Invalid page URL '{url}': {reason}")]
  InvalidUrl { url: String, reason: String },

  #[error("Request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("No image references below a /docs/ path found on {0}")]
  NoMatch(String),
}
