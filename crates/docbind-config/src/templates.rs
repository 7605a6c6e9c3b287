use std::fmt;

/// Error type for template operations.
#[derive(Debug)]
pub enum TemplateError {
  /// The requested configuration format is not supported. Contains the name
  /// of the unsupported format.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration template in TOML, commented so that each key is
/// explained where it is set.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# docbind configuration file

# Directory containing the documentation tree. When unset, the sync checkout
# below is used instead.
# content_dir = "docs"

# Directory the PDF is written to
output_dir = "."

# Project name, used for the document title and the PDF file name
project = "Next.js"

# Also write the intermediate HTML (output.html and toc.html)
export_html = false

# File extensions treated as documents
extensions = ["md", "mdx"]

# Stylesheet replacing the built-in one
# stylesheet = "print.css"

# Directory with custom page.html, cover.html and toc.html templates.
# Use `docbind export-templates` to get a copy of the built-in ones.
# template_dir = "templates"

# Heading of the generated table of contents
toc_heading = "Table of Contents"

# Image reference rewriting
[images]
# Prefix relative image references with base_url and suffix them with query_args
rewrite = true
base_url = "https://nextjs.org/_next/image?url="
query_args = "&w=1920&q=75"

# Page to inspect for the image base URL. base_url is the fallback.
# detect_from = "https://nextjs.org/docs"

# Sparse checkout of the documentation sources
[sync]
repo_url = "https://github.com/vercel/next.js.git"
branch = "canary"
docs_dir = "docs"
repo_dir = "nextjs-docs"

# PDF renderer options
[pdf]
binary = "wkhtmltopdf"
encoding = "UTF-8"
page_size = "A4"
image_dpi = 150
image_quality = 75
smart_shrink = true

# Milliseconds to wait for JavaScript before printing
# javascript_delay = 200
"#;

/// Default configuration template in JSON. JSON has no comments, so every key
/// is spelled out with its default value.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "output_dir": ".",
  "project": "Next.js",
  "export_html": false,
  "extensions": ["md", "mdx"],
  "toc_heading": "Table of Contents",
  "images": {
    "rewrite": true,
    "base_url": "https://nextjs.org/_next/image?url=",
    "query_args": "&w=1920&q=75"
  },
  "sync": {
    "repo_url": "https://github.com/vercel/next.js.git",
    "branch": "canary",
    "docs_dir": "docs",
    "repo_dir": "nextjs-docs"
  },
  "pdf": {
    "binary": "wkhtmltopdf",
    "encoding": "UTF-8",
    "page_size": "A4",
    "image_dpi": 150,
    "image_quality": 75,
    "smart_shrink": true
  }
}
"#;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]

  use super::*;
  use crate::Config;

  #[test]
  fn test_toml_template_parses() {
    let config: Config =
      toml::from_str(DEFAULT_TOML_TEMPLATE).expect("template should parse");
    assert_eq!(config.project, "Next.js");
    assert!(config.image_rewrite().is_some());
    assert_eq!(config.pdf_config().image_dpi, 150);
  }

  #[test]
  fn test_json_template_matches_toml() {
    let json: Config = serde_json::from_str(DEFAULT_JSON_TEMPLATE)
      .expect("template should parse");
    let toml: Config =
      toml::from_str(DEFAULT_TOML_TEMPLATE).expect("template should parse");
    assert_eq!(json, toml);
  }

  #[test]
  fn test_unsupported_format() {
    let err = get_template("yaml").expect_err("yaml is not supported");
    assert_eq!(err.to_string(), "Unsupported config format: yaml");
  }
}
