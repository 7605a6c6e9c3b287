//! HTML to PDF conversion through an external renderer.
//!
//! The assembled HTML and the cover page are staged in a temporary directory
//! and handed to `wkhtmltopdf`, which adds its own outline-based TOC page
//! after the cover.
use std::{
  fs::{self, OpenOptions, TryLockError},
  path::{Path, PathBuf},
  process::Command,
};

use docbind_config::pdf::PdfConfig;
use log::debug;
use tempfile::tempdir;

use crate::error::PdfError;

/// Options passed to the renderer for every export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfOptions {
  pub encoding:         String,
  pub page_size:        String,
  pub image_dpi:        u32,
  pub image_quality:    u32,
  pub smart_shrink:     bool,
  pub javascript_delay: Option<u32>,
}

impl Default for PdfOptions {
  fn default() -> Self {
    Self::from(&PdfConfig::default())
  }
}

impl From<&PdfConfig> for PdfOptions {
  fn from(config: &PdfConfig) -> Self {
    Self {
      encoding:         config.encoding.clone(),
      page_size:        config.page_size.clone(),
      image_dpi:        config.image_dpi,
      image_quality:    config.image_quality,
      smart_shrink:     config.smart_shrink,
      javascript_delay: config.javascript_delay,
    }
  }
}

impl PdfOptions {
  /// Command line flags for `wkhtmltopdf`.
  #[must_use]
  pub fn to_args(&self) -> Vec<String> {
    let mut args = vec![
      "--quiet".to_string(),
      "--enable-local-file-access".to_string(),
      "--encoding".to_string(),
      self.encoding.clone(),
      "--page-size".to_string(),
      self.page_size.clone(),
      "--image-dpi".to_string(),
      self.image_dpi.to_string(),
      "--image-quality".to_string(),
      self.image_quality.to_string(),
    ];

    if !self.smart_shrink {
      args.push("--disable-smart-shrinking".to_string());
    }

    if let Some(delay) = self.javascript_delay {
      args.push("--javascript-delay".to_string());
      args.push(delay.to_string());
    }

    args
  }
}

/// Something that turns a complete HTML document and a cover page into a
/// PDF file.
pub trait PdfRenderer {
  /// Render `html` with `cover_html` as its cover page to `output`.
  ///
  /// # Errors
  ///
  /// Returns an error if the renderer cannot be started or fails.
  fn render(
    &self,
    html: &str,
    options: &PdfOptions,
    cover_html: &str,
    output: &Path,
  ) -> Result<(), PdfError>;
}

/// Renderer backed by the `wkhtmltopdf` executable.
#[derive(Debug, Clone)]
pub struct Wkhtmltopdf {
  binary: PathBuf,
}

impl Wkhtmltopdf {
  #[must_use]
  pub fn new(binary: impl Into<PathBuf>) -> Self {
    Self {
      binary: binary.into(),
    }
  }

  #[must_use]
  pub fn from_config(config: &PdfConfig) -> Self {
    Self::new(&config.binary)
  }

  /// Full argument list for one invocation.
  #[must_use]
  pub fn command_args(
    options: &PdfOptions,
    cover: &Path,
    input: &Path,
    output: &Path,
  ) -> Vec<String> {
    let mut args = options.to_args();
    args.push("cover".to_string());
    args.push(cover.display().to_string());
    args.push("toc".to_string());
    args.push(input.display().to_string());
    args.push(output.display().to_string());
    args
  }
}

impl PdfRenderer for Wkhtmltopdf {
  fn render(
    &self,
    html: &str,
    options: &PdfOptions,
    cover_html: &str,
    output: &Path,
  ) -> Result<(), PdfError> {
    let staging = tempdir()?;
    let input = staging.path().join("input.html");
    let cover = staging.path().join("cover.html");
    fs::write(&input, html)?;
    fs::write(&cover, cover_html)?;

    let args = Self::command_args(options, &cover, &input, output);
    debug!("Running {} {}", self.binary.display(), args.join(" "));

    let result = Command::new(&self.binary).args(&args).output().map_err(
      |source| {
        PdfError::Launch {
          binary: self.binary.clone(),
          source,
        }
      },
    )?;

    if !result.status.success() {
      return Err(PdfError::Failed {
        binary: self.binary.clone(),
        status: result.status,
        stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
      });
    }

    debug!("Renderer wrote {}", output.display());
    Ok(())
  }
}

/// Whether `path` exists and is held open by another process.
///
/// The file is opened for appending and an exclusive lock is attempted
/// without blocking. A file that cannot be opened, or whose lock is held
/// elsewhere, counts as locked. A missing file is never locked.
#[must_use]
pub fn is_output_locked(path: &Path) -> bool {
  if !path.exists() {
    return false;
  }

  let file = match OpenOptions::new().append(true).open(path) {
    Ok(file) => file,
    Err(e) => {
      debug!("Cannot open {} for writing: {e}", path.display());
      return true;
    },
  };

  match file.try_lock() {
    Ok(()) => false,
    Err(TryLockError::WouldBlock) => true,
    Err(TryLockError::Error(e)) => {
      // Filesystems without lock support: opening succeeded, so assume free
      debug!("Cannot lock {}: {e}", path.display());
      false
    },
  }
}
