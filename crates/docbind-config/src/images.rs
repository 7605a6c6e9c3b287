use serde::{Deserialize, Serialize};

use crate::{
  config::{parse_bool, parse_optional_string},
  error::ConfigError,
};

/// Base URL used when none is configured and detection is not requested.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://nextjs.org/_next/image?url=";

/// Query arguments appended to every rewritten image reference.
pub const DEFAULT_IMAGE_QUERY_ARGS: &str = "&w=1920&q=75";

/// Configuration for rewriting relative image references.
///
/// Documentation sources usually reference images relative to the site that
/// serves them, which a PDF renderer cannot resolve. With `rewrite` enabled,
/// every relative `src` (and themed `srcLight`/`srcDark`) attribute is
/// prefixed with `base_url` and suffixed with `query_args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
  /// Whether to rewrite image references at all.
  pub rewrite: bool,

  /// Prefix for rewritten references. Also the fallback when detection
  /// fails.
  pub base_url: String,

  /// Suffix appended after the relative path.
  pub query_args: String,

  /// Page to inspect for the image base URL. Detection is skipped when unset.
  pub detect_from: Option<String>,
}

impl Default for ImagesConfig {
  fn default() -> Self {
    Self {
      rewrite:     true,
      base_url:    DEFAULT_IMAGE_BASE_URL.to_string(),
      query_args:  DEFAULT_IMAGE_QUERY_ARGS.to_string(),
      detect_from: None,
    }
  }
}

impl ImagesConfig {
  /// Apply a single `images.*` override.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown or the value cannot be parsed.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key {
      "rewrite" => self.rewrite = parse_bool("images.rewrite", value)?,
      "base_url" => self.base_url = value.to_string(),
      "query_args" => self.query_args = value.to_string(),
      "detect_from" => self.detect_from = parse_optional_string(value),
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: 'images.{key}'. See documentation for \
           supported keys."
        )));
      },
    }
    Ok(())
  }
}
