use std::{
  fs,
  path::{Path, PathBuf},
  str::FromStr,
  sync::OnceLock,
};

use serde::{Deserialize, Serialize};

use crate::{
  error::ConfigError,
  images::ImagesConfig,
  pdf::PdfConfig,
  sync::SyncConfig,
};

/// Configuration for the docbind exporter.
///
/// [`Config`] holds everything that controls an export: where the content
/// tree lives (or where to fetch it from), how image references are
/// rewritten, the project name used for the output title, and the options
/// passed to the PDF renderer. Fields are typically loaded from a TOML or
/// JSON config file and can be overridden from the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Root of the documentation tree. Falls back to the sync checkout.
  pub content_dir: Option<PathBuf>,

  /// Directory the PDF (and optional HTML) is written to.
  pub output_dir: PathBuf,

  /// Project name used in the document title and output file name.
  pub project: String,

  /// Whether to also write the intermediate HTML for inspection.
  pub export_html: bool,

  /// File extensions treated as documents.
  pub extensions: Vec<String>,

  /// Stylesheet replacing the built-in one.
  pub stylesheet: Option<PathBuf>,

  /// Directory with custom `page.html`, `cover.html`, `toc.html` templates.
  /// Missing files fall back to the embedded ones.
  pub template_dir: Option<PathBuf>,

  /// Heading of the generated table of contents.
  pub toc_heading: String,

  /// Image reference rewriting.
  pub images: Option<ImagesConfig>,

  /// Content sync from a remote repository.
  pub sync: Option<SyncConfig>,

  /// PDF renderer options.
  pub pdf: Option<PdfConfig>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      content_dir:  None,
      output_dir:   PathBuf::from("."),
      project:      "Project".to_string(),
      export_html:  false,
      extensions:   vec!["md".to_string(), "mdx".to_string()],
      stylesheet:   None,
      template_dir: None,
      toc_heading:  "Table of Contents".to_string(),
      images:       None,
      sync:         None,
      pdf:          None,
    }
  }
}

/// Parse a boolean override value.
pub(crate) fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" => Ok(true),
    "false" | "no" | "0" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'. Expected true/false, \
         yes/no, or 1/0"
      )))
    },
  }
}

/// Parse a numeric override value.
pub(crate) fn parse_number<T: FromStr>(
  key: &str,
  value: &str,
) -> Result<T, ConfigError> {
  value.parse().map_err(|_| {
    ConfigError::Config(format!(
      "Invalid value for '{key}': '{value}'. Expected a positive integer"
    ))
  })
}

/// Empty values clear optional fields.
pub(crate) fn parse_optional_string(value: &str) -> Option<String> {
  (!value.is_empty()).then(|| value.to_string())
}

fn parse_optional_path(value: &str) -> Option<PathBuf> {
  (!value.is_empty()).then(|| PathBuf::from(value))
}

impl Config {
  /// Image rewrite settings, or `None` when rewriting is disabled.
  #[must_use]
  pub fn image_rewrite(&self) -> Option<&ImagesConfig> {
    self.images.as_ref().filter(|images| images.rewrite)
  }

  /// PDF options, falling back to the defaults.
  #[must_use]
  pub fn pdf_config(&self) -> PdfConfig {
    self.pdf.clone().unwrap_or_default()
  }

  /// Root directory of the documentation tree.
  ///
  /// Priority order:
  ///
  /// 1. Explicit `content_dir`
  /// 2. The sync checkout, `sync.repo_dir/sync.docs_dir`
  #[must_use]
  pub fn content_root(&self) -> Option<PathBuf> {
    self
      .content_dir
      .clone()
      .or_else(|| self.sync.as_ref().map(SyncConfig::content_root))
  }

  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  #[allow(
    clippy::option_if_let_else,
    reason = "Clearer with explicit match on extension"
  )]
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) => {
        match ext.to_lowercase().as_str() {
          "json" => {
            serde_json::from_str(&content).map_err(|e| {
              ConfigError::Config(format!(
                "Failed to parse JSON config from {}: {}",
                path.display(),
                e
              ))
            })
          },
          "toml" => {
            toml::from_str(&content).map_err(|e| {
              ConfigError::Config(format!(
                "Failed to parse TOML config from {}: {}",
                path.display(),
                e
              ))
            })
          },
          _ => {
            Err(ConfigError::Config(format!(
              "Unsupported config file format: {}",
              path.display()
            )))
          },
        }
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from files and `KEY=VALUE` overrides, merging them.
  ///
  /// Explicit config files are merged in order. Without any, a config file in
  /// a standard location is used if one exists, otherwise the defaults.
  /// Content sources are validated later, once CLI arguments have been
  /// applied.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file cannot be loaded or an override is
  /// invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged_config = Self::from_file(first).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load config from {}: {}",
          first.display(),
          e
        ))
      })?;

      for config_path in rest {
        let additional_config = Self::from_file(config_path).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to load config from {}: {}",
            config_path.display(),
            e
          ))
        })?;
        merged_config.merge(additional_config);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load discovered config from {}: {}",
          discovered_config.display(),
          e
        ))
      })?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// Nested keys use a dotted prefix, e.g. `pdf.page_size=Letter`.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  ///
  /// # Example
  ///
  /// ```rust, ignore
  /// config.apply_overrides(&vec![
  ///     "images.rewrite=false".to_string(),
  ///     "project=Next.js".to_string(),
  /// ])?;
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single override. Nested sections are created on first use.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown or the value cannot be parsed.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    if let Some((section, nested)) = key.split_once('.') {
      return match section {
        "images" => {
          self
            .images
            .get_or_insert_with(ImagesConfig::default)
            .apply_override(nested, value)
        },
        "sync" => {
          self
            .sync
            .get_or_insert_with(SyncConfig::default)
            .apply_override(nested, value)
        },
        "pdf" => {
          self
            .pdf
            .get_or_insert_with(PdfConfig::default)
            .apply_override(nested, value)
        },
        _ => {
          Err(ConfigError::Config(format!(
            "Unknown configuration key: '{key}'. See documentation for \
             supported keys."
          )))
        },
      };
    }

    match key {
      "content_dir" => self.content_dir = parse_optional_path(value),
      "output_dir" => self.output_dir = PathBuf::from(value),
      "project" => self.project = value.to_string(),
      "export_html" => self.export_html = parse_bool(key, value)?,
      "extensions" => {
        self.extensions = value
          .split(',')
          .map(|ext| ext.trim().trim_start_matches('.').to_string())
          .filter(|ext| !ext.is_empty())
          .collect();
      },
      "stylesheet" => self.stylesheet = parse_optional_path(value),
      "template_dir" => self.template_dir = parse_optional_path(value),
      "toc_heading" => self.toc_heading = value.to_string(),
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. See documentation for \
           supported keys."
        )));
      },
    }

    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - `extensions`: Other's entries are appended, skipping duplicates
  /// - Plain fields (String, bool, etc.): Other's value always replaces
  pub fn merge(&mut self, other: Self) {
    if other.content_dir.is_some() {
      self.content_dir = other.content_dir;
    }
    if other.stylesheet.is_some() {
      self.stylesheet = other.stylesheet;
    }
    if other.template_dir.is_some() {
      self.template_dir = other.template_dir;
    }
    if other.images.is_some() {
      self.images = other.images;
    }
    if other.sync.is_some() {
      self.sync = other.sync;
    }
    if other.pdf.is_some() {
      self.pdf = other.pdf;
    }

    for ext in other.extensions {
      if !self.extensions.contains(&ext) {
        self.extensions.push(ext);
      }
    }

    self.output_dir = other.output_dir;
    self.project = other.project;
    self.export_html = other.export_html;
    self.toc_heading = other.toc_heading;
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let config_filenames = [
          "docbind.toml",
          "docbind.json",
          ".docbind.toml",
          ".docbind.json",
          ".config/docbind.toml",
          ".config/docbind.json",
        ];

        let current_dir = std::env::current_dir().ok()?;
        for filename in &config_filenames {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let xdg_config_dir = PathBuf::from(xdg_config_home);
          for filename in &["docbind.toml", "docbind.json"] {
            let config_path = xdg_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        None
      })
      .clone()
  }

  /// Validate the content source and all paths specified in the
  /// configuration.
  ///
  /// A missing content directory is only an error when no sync is
  /// configured, since the sync creates it.
  ///
  /// # Errors
  ///
  /// Returns an error if no content source is configured, or if any
  /// configured path does not exist or is invalid.
  pub fn validate_paths(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    match (&self.content_dir, &self.sync) {
      (None, None) => {
        errors.push(
          "Either a content directory or a sync source must be provided."
            .to_string(),
        );
      },
      (Some(content_dir), None) => {
        if !content_dir.exists() {
          errors.push(format!(
            "Content directory does not exist: {}",
            content_dir.display()
          ));
        } else if !content_dir.is_dir() {
          errors.push(format!(
            "Content path is not a directory: {}",
            content_dir.display()
          ));
        }
      },
      (_, Some(_)) => {},
    }

    if let Some(ref stylesheet) = self.stylesheet {
      if !stylesheet.exists() {
        errors.push(format!(
          "Stylesheet file does not exist: {}",
          stylesheet.display()
        ));
      } else if !stylesheet.is_file() {
        errors.push(format!(
          "Stylesheet path is not a file: {}",
          stylesheet.display()
        ));
      }
    }

    if let Some(ref template_dir) = self.template_dir {
      if !template_dir.is_dir() {
        errors.push(format!(
          "Template directory does not exist: {}",
          template_dir.display()
        ));
      }
    }

    if self.extensions.is_empty() {
      errors.push("At least one document extension is required.".to_string());
    }

    if !errors.is_empty() {
      let error_message = errors.join("\n");
      return Err(ConfigError::Config(format!(
        "Configuration path validation errors:\n{error_message}"
      )));
    }

    Ok(())
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }

  /// Export embedded templates to a directory for customization
  ///
  /// # Errors
  ///
  /// Returns an error if the output directory cannot be created or a template
  /// cannot be written.
  pub fn export_templates(
    output_dir: &Path,
    force: bool,
  ) -> Result<(), ConfigError> {
    fs::create_dir_all(output_dir).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to create template directory: {}: {}",
        output_dir.display(),
        e
      ))
    })?;

    let mut templates: Vec<_> =
      docbind_templates::all_templates().into_iter().collect();
    templates.sort_unstable_by_key(|(name, _)| *name);

    for (filename, content) in templates {
      let file_path = output_dir.join(filename);

      if file_path.exists() && !force {
        log::warn!(
          "File {} already exists. Use --force to overwrite.",
          file_path.display()
        );
        continue;
      }

      fs::write(&file_path, content).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to write template file: {}: {}",
          file_path.display(),
          e
        ))
      })?;
      log::info!("Exported template: {}", file_path.display());
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::useless_vec,
    clippy::unwrap_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use super::*;

  #[test]
  fn test_config_merge_option_fields() {
    let mut base = Config::default();
    base.content_dir = Some(PathBuf::from("base-docs"));
    base.stylesheet = None;

    let mut override_config = Config::default();
    override_config.content_dir = None; // should not replace
    override_config.stylesheet = Some(PathBuf::from("print.css"));

    base.merge(override_config);

    assert_eq!(base.content_dir, Some(PathBuf::from("base-docs")));
    assert_eq!(base.stylesheet, Some(PathBuf::from("print.css")));
  }

  #[test]
  fn test_config_merge_extensions_deduplicate() {
    let mut base = Config::default();
    let mut override_config = Config::default();
    override_config.extensions.push("markdown".to_string());

    base.merge(override_config);

    assert_eq!(base.extensions, vec!["md", "mdx", "markdown"]);
  }

  #[test]
  fn test_config_merge_plain_fields() {
    let mut base = Config::default();
    base.export_html = true;

    let mut override_config = Config::default();
    override_config.project = "Next.js".to_string();

    base.merge(override_config);

    assert_eq!(base.project, "Next.js");
    assert!(!base.export_html);
  }

  #[test]
  fn test_apply_overrides_nested_sections() {
    let mut config = Config::default();

    config
      .apply_overrides(&vec![
        "images.rewrite=no".to_string(),
        "pdf.page_size=Letter".to_string(),
        "pdf.image_dpi=300".to_string(),
        "sync.branch=main".to_string(),
      ])
      .unwrap();

    assert!(config.image_rewrite().is_none());
    assert_eq!(config.pdf_config().page_size, "Letter");
    assert_eq!(config.pdf_config().image_dpi, 300);
    assert_eq!(config.sync.as_ref().unwrap().branch, "main");
  }

  #[test]
  fn test_apply_overrides_paths_and_lists() {
    let mut config = Config::default();

    config
      .apply_overrides(&vec![
        "content_dir=/tmp/docs".to_string(),
        "extensions=.md, mdx ,txt".to_string(),
      ])
      .unwrap();

    assert_eq!(config.content_dir, Some(PathBuf::from("/tmp/docs")));
    assert_eq!(config.extensions, vec!["md", "mdx", "txt"]);

    config.apply_override("content_dir", "").unwrap();
    assert_eq!(config.content_dir, None);
  }

  #[test]
  fn test_apply_overrides_invalid_format() {
    let mut config = Config::default();

    let result = config.apply_overrides(&vec!["no_equals_sign".to_string()]);

    assert!(
      result
        .unwrap_err()
        .to_string()
        .contains("Expected KEY=VALUE")
    );
  }

  #[test]
  fn test_apply_overrides_unknown_key() {
    let mut config = Config::default();

    for key in ["unknown_key=value", "pdf.colour=red", "nope.key=1"] {
      let result = config.apply_overrides(&vec![key.to_string()]);
      assert!(
        result
          .unwrap_err()
          .to_string()
          .contains("Unknown configuration key")
      );
    }
  }

  #[test]
  fn test_apply_overrides_invalid_values() {
    let mut config = Config::default();

    let result = config.apply_override("export_html", "maybe");
    assert!(result.unwrap_err().to_string().contains("Invalid boolean"));

    let result = config.apply_override("pdf.image_quality", "150");
    assert!(result.unwrap_err().to_string().contains("Invalid value"));

    let result = config.apply_override("pdf.image_dpi", "lots");
    assert!(result.unwrap_err().to_string().contains("Invalid value"));
  }

  #[test]
  fn test_content_root_priority() {
    let mut config = Config::default();
    assert_eq!(config.content_root(), None);

    config.sync = Some(SyncConfig::default());
    assert_eq!(
      config.content_root(),
      Some(PathBuf::from("nextjs-docs").join("docs"))
    );

    config.content_dir = Some(PathBuf::from("local"));
    assert_eq!(config.content_root(), Some(PathBuf::from("local")));
  }

  #[test]
  fn test_validate_requires_content_source() {
    let config = Config::default();
    let err = config.validate_paths().unwrap_err().to_string();
    assert!(err.contains("content directory or a sync source"));
  }
}
