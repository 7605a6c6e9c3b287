use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where to fetch the documentation sources from.
///
/// When present, the exporter keeps a sparse checkout of `docs_dir` from
/// `repo_url` in `repo_dir`, and reads content from `repo_dir/docs_dir`
/// unless an explicit content directory is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
  /// Remote repository URL.
  pub repo_url: String,

  /// Branch to check out.
  pub branch: String,

  /// Subdirectory of the repository holding the documentation.
  pub docs_dir: PathBuf,

  /// Local directory for the sparse checkout.
  pub repo_dir: PathBuf,
}

impl Default for SyncConfig {
  fn default() -> Self {
    Self {
      repo_url: "https://github.com/vercel/next.js.git".to_string(),
      branch:   "canary".to_string(),
      docs_dir: PathBuf::from("docs"),
      repo_dir: PathBuf::from("nextjs-docs"),
    }
  }
}

impl SyncConfig {
  /// Directory the documentation tree lands in after a sync.
  #[must_use]
  pub fn content_root(&self) -> PathBuf {
    self.repo_dir.join(&self.docs_dir)
  }

  /// Apply a single `sync.*` override.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key {
      "repo_url" => self.repo_url = value.to_string(),
      "branch" => self.branch = value.to_string(),
      "docs_dir" => self.docs_dir = PathBuf::from(value),
      "repo_dir" => self.repo_dir = PathBuf::from(value),
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: 'sync.{key}'. See documentation for \
           supported keys."
        )));
      },
    }
    Ok(())
  }
}
