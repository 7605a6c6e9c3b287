use thiserror::Error;

/// Reasons a frontmatter block could not be turned into metadata.
///
/// These never escape the public parsing API as hard failures; callers of
/// [`crate::parse_frontmatter`] only see `None`. The variants exist so the
/// cause can be logged.
#[derive(Debug, Error)]
pub enum FrontmatterError {
  #[error("YAML error: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("Frontmatter is not a mapping of keys to values")]
  NotAMapping,

  #[error("Frontmatter block is empty")]
  Empty,
}
