//! The export pipeline: content tree in, one PDF out.
use std::{
  fs,
  path::{Path, PathBuf},
};

use docbind_commonmark::{
  ImageRewrite,
  MarkdownOptions,
  MarkdownProcessor,
  Transforms,
};
use docbind_config::Config;
use docbind_html::{
  AssembledOutput,
  Assembler,
  OutputNames,
  Templates,
  collect_documents,
  find_latest_version,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};

use crate::{
  cdn,
  error::ExportError,
  pdf::{PdfOptions, PdfRenderer, is_output_locked},
  sync,
};

/// File name of the intermediate HTML written with `export_html`.
pub const HTML_OUTPUT: &str = "output.html";

/// File name of the TOC-only HTML written with `export_html`.
pub const TOC_OUTPUT: &str = "toc.html";

/// Per-run switches that are not part of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
  /// Sync the content checkout before exporting, when content comes from
  /// it.
  pub sync: bool,
}

impl Default for ExportOptions {
  fn default() -> Self {
    Self { sync: true }
  }
}

/// Outcome of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
  pub title:       String,
  pub output_path: PathBuf,
  /// Documents read and assembled.
  pub documents:   usize,
  /// Documents with a TOC entry.
  pub toc_entries: usize,
  /// Intermediate HTML file, when written.
  pub html_path:   Option<PathBuf>,
  /// False when rendering was skipped because the output file was locked.
  pub rendered:    bool,
}

/// Today's date for the cover page.
fn today() -> String {
  jiff::Zoned::now().strftime("%Y-%m-%d").to_string()
}

fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
  fs::write(path, content).map_err(|source| {
    ExportError::Write {
      path: path.to_path_buf(),
      source,
    }
  })
}

fn progress_bar(len: usize) -> ProgressBar {
  let bar = ProgressBar::new(len as u64);
  if let Ok(style) =
    ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {wide_msg}")
  {
    bar.set_style(style);
  }
  bar
}

/// Build the transform passes for `config`, resolving the image base URL.
#[must_use]
pub fn build_transforms(config: &Config) -> Transforms {
  let transforms = Transforms::new();
  match config.image_rewrite() {
    Some(images) => {
      transforms.with_image_rewrite(ImageRewrite {
        base_url:   cdn::resolve_base_url(images),
        query_args: images.query_args.clone(),
      })
    },
    None => transforms,
  }
}

/// Read, transform and assemble every document under `root`.
///
/// Files that cannot be read are logged and skipped.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked.
pub fn assemble(
  config: &Config,
  root: &Path,
  transforms: Transforms,
) -> Result<Assembler, ExportError> {
  let files = collect_documents(root, &config.extensions)?;
  info!("Converting {} documents from {}", files.len(), root.display());

  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let mut assembler = Assembler::new(root, processor, transforms);

  let progress = progress_bar(files.len());
  for file in &files {
    progress.set_message(file.display().to_string());
    match fs::read_to_string(file) {
      Ok(raw) => {
        assembler.push_document(file, &raw);
      },
      Err(e) => warn!("Skipping {}: {e}", file.display()),
    }
    progress.inc(1);
  }
  progress.finish_and_clear();

  Ok(assembler)
}

/// Run a full export with `config`, rendering through `renderer`.
///
/// # Errors
///
/// Returns an error if the content sync fails, the content tree cannot be
/// walked, an output file cannot be written, or the renderer fails. A locked
/// output file is not an error: rendering is skipped and reported in
/// [`ExportReport::rendered`].
pub fn export(
  config: &Config,
  renderer: &dyn PdfRenderer,
  options: ExportOptions,
) -> Result<ExportReport, ExportError> {
  if options.sync && config.content_dir.is_none() {
    if let Some(sync_config) = &config.sync {
      sync::sync_content(sync_config)?;
    }
  }

  let root = config.content_root().ok_or(ExportError::NoContent)?;
  let transforms = build_transforms(config);
  let assembler = assemble(config, &root, transforms)?;

  let documents = assembler.len();
  let toc_entries = assembler.toc().entries().len();
  let version = find_latest_version(assembler.pages());
  let names = OutputNames::new(&config.project, version.as_deref());
  info!("Converted {documents} documents for '{}'", names.title);

  let templates = Templates::from_config(config)?;
  let AssembledOutput { combined, toc, .. } =
    assembler.finish(&templates, &names.title, &config.toc_heading)?;

  fs::create_dir_all(&config.output_dir).map_err(|source| {
    ExportError::Write {
      path: config.output_dir.clone(),
      source,
    }
  })?;

  let html_path = if config.export_html {
    let html_path = config.output_dir.join(HTML_OUTPUT);
    write_file(&html_path, &combined)?;
    write_file(&config.output_dir.join(TOC_OUTPUT), &toc)?;
    info!("HTML exported to {}", html_path.display());
    Some(html_path)
  } else {
    None
  };

  let cover = templates.render_cover(&names.title, &today())?;
  let output_path = config.output_dir.join(&names.file_name);

  let mut report = ExportReport {
    title: names.title,
    output_path,
    documents,
    toc_entries,
    html_path,
    rendered: false,
  };

  if is_output_locked(&report.output_path) {
    error!(
      "{} is open in another process. Close it and try again.",
      report.output_path.display()
    );
    return Ok(report);
  }

  let pdf_options = PdfOptions::from(&config.pdf_config());
  renderer.render(&combined, &pdf_options, &cover, &report.output_path)?;
  report.rendered = true;

  Ok(report)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_transforms_follow_image_config() {
    let mut config = Config::default();
    assert!(build_transforms(&config).image_rewrite().is_none());

    config.images = Some(docbind_config::images::ImagesConfig {
      base_url: "https://cdn.example.com/".to_string(),
      query_args: "?w=1".to_string(),
      ..Default::default()
    });
    let transforms = build_transforms(&config);
    let images = transforms.image_rewrite();
    assert_eq!(
      images.map(|images| images.base_url.as_str()),
      Some("https://cdn.example.com/")
    );
    assert_eq!(images.map(|images| images.query_args.as_str()), Some("?w=1"));
  }

  #[test]
  fn test_cover_date_format() {
    let date = today();
    assert_eq!(date.len(), 10);
    assert_eq!(date.chars().filter(|c| *c == '-').count(), 2);
  }
}
