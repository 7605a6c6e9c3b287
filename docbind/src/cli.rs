use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use docbind_config::{Config, images::ImagesConfig};

/// Command line interface for docbind
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "docbind: bind a documentation tree into one PDF"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`]). Defaults to `export`.
  #[command(subcommand)]
  pub command: Option<Commands>,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", global = true, action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the docbind CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Export the documentation tree to PDF.
  Export(ExportArgs),

  /// Create or update the sparse checkout of the documentation sources.
  Sync,

  /// Initialize a new docbind configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "docbind.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Export default templates to a directory for customization.
  ExportTemplates {
    /// Output directory for template files.
    #[arg(short, long, default_value = "templates")]
    output_dir: PathBuf,

    /// Whether to overwrite existing files.
    #[arg(long)]
    force: bool,
  },
}

/// Options of the `export` subcommand. Each one overrides the matching
/// configuration key.
#[derive(Args, Debug, Default, Clone)]
pub struct ExportArgs {
  /// Directory containing the documentation tree.
  #[arg(short = 'i', long)]
  pub content_dir: Option<PathBuf>,

  /// Directory to write the PDF to.
  #[arg(short, long)]
  pub output_dir: Option<PathBuf>,

  /// Project name used for the title and file name.
  #[arg(short, long)]
  pub project: Option<String>,

  /// Stylesheet replacing the built-in one.
  #[arg(short, long)]
  pub stylesheet: Option<PathBuf>,

  /// Directory with custom templates.
  #[arg(long = "template-dir")]
  pub template_dir: Option<PathBuf>,

  /// Also write the intermediate HTML.
  #[arg(long = "html", action = clap::ArgAction::SetTrue)]
  pub export_html: bool,

  /// Use the existing checkout without syncing it first.
  #[arg(long = "no-sync", action = clap::ArgAction::SetTrue)]
  pub no_sync: bool,

  /// Page to detect the image base URL from.
  #[arg(long = "detect-images", value_name = "URL")]
  pub detect_images: Option<String>,

  /// Leave image references as they are.
  #[arg(long = "no-image-rewrite", action = clap::ArgAction::SetTrue, conflicts_with = "detect_images")]
  pub no_image_rewrite: bool,
}

impl ExportArgs {
  /// Apply these options on top of `config`.
  pub fn apply(&self, config: &mut Config) {
    if let Some(ref content_dir) = self.content_dir {
      config.content_dir = Some(content_dir.clone());
    }
    if let Some(ref output_dir) = self.output_dir {
      config.output_dir.clone_from(output_dir);
    }
    if let Some(ref project) = self.project {
      config.project.clone_from(project);
    }
    if let Some(ref stylesheet) = self.stylesheet {
      config.stylesheet = Some(stylesheet.clone());
    }
    if let Some(ref template_dir) = self.template_dir {
      config.template_dir = Some(template_dir.clone());
    }
    if self.export_html {
      config.export_html = true;
    }
    if let Some(ref page_url) = self.detect_images {
      config
        .images
        .get_or_insert_with(ImagesConfig::default)
        .detect_from = Some(page_url.clone());
    }
    if self.no_image_rewrite {
      config.images.get_or_insert_with(ImagesConfig::default).rewrite = false;
    }
  }
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]

  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_is_consistent() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_export_args_override_config() {
    let cli = Cli::try_parse_from([
      "docbind",
      "--config",
      "project=FromConfig",
      "export",
      "--content-dir",
      "docs",
      "--project",
      "Next.js",
      "--html",
      "--detect-images",
      "https://nextjs.org/docs",
    ])
    .expect("valid arguments");

    assert!(matches!(cli.command, Some(Commands::Export(_))));
    let Some(Commands::Export(args)) = cli.command else {
      return;
    };

    let mut config = Config::default();
    config
      .apply_overrides(&cli.config_overrides)
      .expect("valid overrides");
    args.apply(&mut config);

    assert_eq!(config.project, "Next.js");
    assert_eq!(config.content_dir, Some(PathBuf::from("docs")));
    assert!(config.export_html);
    assert_eq!(
      config.image_rewrite().and_then(|i| i.detect_from.as_deref()),
      Some("https://nextjs.org/docs")
    );
  }

  #[test]
  fn test_no_image_rewrite() {
    let cli = Cli::try_parse_from(["docbind", "export", "--no-image-rewrite"])
      .expect("valid arguments");
    assert!(matches!(cli.command, Some(Commands::Export(_))));
    let Some(Commands::Export(args)) = cli.command else {
      return;
    };

    let mut config = Config::default();
    args.apply(&mut config);
    assert!(config.image_rewrite().is_none());
  }

  #[test]
  fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["docbind", "sync", "-v", "-c", "a.toml"])
      .expect("valid arguments");
    assert!(cli.verbose);
    assert_eq!(cli.config_files, [PathBuf::from("a.toml")]);
    assert!(matches!(cli.command, Some(Commands::Sync)));
  }
}
