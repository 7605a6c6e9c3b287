use std::{io, path::PathBuf};

use thiserror::Error;

/// Error type for docbind-html operations
#[derive(Debug, Error)]
pub enum HtmlError {
  #[error("Content directory does not exist: {}", .0.display())]
  MissingRoot(PathBuf),

  #[error("Failed to walk content directory {}: {source}", .root.display())]
  Walk {
    root:   PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("Template error: {0}")]
  Template(#[from] tera::Error),

  #[error("Failed to read template {}: {source}", .path.display())]
  TemplateFile {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
}
