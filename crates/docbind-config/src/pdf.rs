use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
  config::{parse_bool, parse_number},
  error::ConfigError,
};

/// Options handed to the PDF renderer.
///
/// The defaults match a screen-and-print friendly A4 export: 150 DPI images
/// at quality 75 keep the file size reasonable for documentation with many
/// screenshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
  /// Renderer executable, looked up in `PATH` when not absolute.
  pub binary: PathBuf,

  /// Input encoding declared to the renderer.
  pub encoding: String,

  /// Paper size, e.g. `A4` or `Letter`.
  pub page_size: String,

  /// Image resolution in DPI.
  pub image_dpi: u32,

  /// JPEG quality for embedded images, 0-100.
  pub image_quality: u32,

  /// Let the renderer shrink content to fit the page width.
  pub smart_shrink: bool,

  /// Milliseconds to wait for JavaScript before printing.
  pub javascript_delay: Option<u32>,
}

impl Default for PdfConfig {
  fn default() -> Self {
    Self {
      binary:           PathBuf::from("wkhtmltopdf"),
      encoding:         "UTF-8".to_string(),
      page_size:        "A4".to_string(),
      image_dpi:        150,
      image_quality:    75,
      smart_shrink:     true,
      javascript_delay: None,
    }
  }
}

impl PdfConfig {
  /// Apply a single `pdf.*` override.
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
      "binary" => self.binary = PathBuf::from(value),
      "encoding" => self.encoding = value.to_string(),
      "page_size" => self.page_size = value.to_string(),
      "image_dpi" => self.image_dpi = parse_number("pdf.image_dpi", value)?,
      "image_quality" => {
        let quality: u32 = parse_number("pdf.image_quality", value)?;
        if quality > 100 {
          return Err(ConfigError::Config(format!(
            "Invalid value for 'pdf.image_quality': '{value}'. Expected a \
             number between 0 and 100"
          )));
        }
        self.image_quality = quality;
      },
      "smart_shrink" => {
        self.smart_shrink = parse_bool("pdf.smart_shrink", value)?;
      },
      "javascript_delay" => {
        self.javascript_delay = if value.is_empty() {
          None
        } else {
          Some(parse_number("pdf.javascript_delay", value)?)
        };
      },
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: 'pdf.{key}'. See documentation for \
           supported keys."
        )));
      },
    }
    Ok(())
  }
}
