//! Release version detection and the output names derived from it.
use std::sync::LazyLock;

use docbind_commonmark::utils::never_matching_regex;
use regex::Regex;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"v(\d+\.\d+\.\d+)").unwrap_or_else(|e| {
    log::error!("Failed to compile VERSION_RE regex: {e}");
    never_matching_regex()
  })
});

fn parse_version(version: &str) -> Option<(u64, u64, u64)> {
  let mut parts = version.split('.').map(str::parse::<u64>);
  match (parts.next(), parts.next(), parts.next()) {
    (Some(Ok(major)), Some(Ok(minor)), Some(Ok(patch))) => {
      Some((major, minor, patch))
    },
    _ => None,
  }
}

/// Find the highest `vMAJOR.MINOR.PATCH` token in `text`, without the `v`.
///
/// Components compare numerically, so `v14.10.0` beats `v14.9.3`. Tokens
/// whose components overflow are ignored.
#[must_use]
pub fn find_latest_version(text: &str) -> Option<String> {
  VERSION_RE
    .captures_iter(text)
    .filter_map(|caps| caps.get(1))
    .filter_map(|m| parse_version(m.as_str()).map(|key| (key, m.as_str())))
    .max_by_key(|(key, _)| *key)
    .map(|(_, version)| version.to_string())
}

/// Document title and PDF file name for an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
  pub title:     String,
  pub file_name: String,
}

impl OutputNames {
  /// `"{project} v{version} Documentation"` and the same with spaces as
  /// underscores plus `.pdf`, or the versionless forms without a version.
  #[must_use]
  pub fn new(project: &str, version: Option<&str>) -> Self {
    let title = match version {
      Some(version) => format!("{project} v{version} Documentation"),
      None => format!("{project} Documentation"),
    };
    let file_name = format!("{}.pdf", title.replace(' ', "_"));
    Self { title, file_name }
  }
}
