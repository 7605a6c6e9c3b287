use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate_to, shells};
use clap_mangen::Man;

const BIN_NAME: &str = "docbind";

#[derive(Parser)]
#[command(author, version, about)]
struct Xtask {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build distribution artifacts for the docbind CLI
  Dist {
    /// Output directory for generated files.
    #[arg(short, long, default_value = "dist", value_parser = clap::value_parser!(std::path::PathBuf))]
    output_dir: PathBuf,

    /// Only generate shell completions.
    #[arg(long, conflicts_with_all = ["manpage_only", "config_only"])]
    completions_only: bool,

    /// Only generate manpage.
    #[arg(long, conflicts_with_all = ["completions_only", "config_only"])]
    manpage_only: bool,

    /// Only generate the example configuration files.
    #[arg(long, conflicts_with_all = ["completions_only", "manpage_only"])]
    config_only: bool,
  },
}

fn main() -> Result<()> {
  let xtask = Xtask::parse();

  match xtask.command {
    Commands::Dist {
      output_dir,
      completions_only,
      manpage_only,
      config_only,
    } => {
      if completions_only {
        generate_completions(&output_dir)?;
      } else if manpage_only {
        generate_manpage(&output_dir)?;
      } else if config_only {
        generate_example_configs(&output_dir)?;
      } else {
        generate_completions(&output_dir)?;
        generate_manpage(&output_dir)?;
        generate_example_configs(&output_dir)?;
      }
    },
  }

  Ok(())
}

/// Generate shell completions for various shells.
fn generate_completions(output_dir: &Path) -> Result<()> {
  let completions_dir = output_dir.join("completions");
  fs::create_dir_all(&completions_dir)?;
  let mut cmd = docbind::cli::Cli::command();
  generate_to(shells::Bash, &mut cmd, BIN_NAME, &completions_dir)?;
  generate_to(shells::Zsh, &mut cmd, BIN_NAME, &completions_dir)?;
  generate_to(shells::Fish, &mut cmd, BIN_NAME, &completions_dir)?;
  generate_to(shells::PowerShell, &mut cmd, BIN_NAME, &completions_dir)?;
  println!(
    "Shell completions generated in {}",
    completions_dir.display()
  );
  Ok(())
}

/// Generate the manpage for the docbind CLI.
fn generate_manpage(output_dir: &Path) -> Result<()> {
  let man_dir = output_dir.join("man");
  fs::create_dir_all(&man_dir)?;
  let cmd = docbind::cli::Cli::command();
  let man = Man::new(cmd);
  let file_path = man_dir.join(format!("{BIN_NAME}.1"));
  let mut file = fs::File::create(&file_path).with_context(|| {
    format!("Failed to create manpage file at {}", file_path.display())
  })?;
  man
    .render(&mut file)
    .with_context(|| "Failed to render manpage")?;
  println!("Manpage generated in {}", man_dir.display());
  Ok(())
}

/// Write the commented default configuration in every supported format.
fn generate_example_configs(output_dir: &Path) -> Result<()> {
  fs::create_dir_all(output_dir)?;
  for format in ["toml", "json"] {
    let path = output_dir.join(format!("{BIN_NAME}.example.{format}"));
    docbind_config::Config::generate_default_config(format, &path)
      .with_context(|| {
        format!("Failed to write example config {}", path.display())
      })?;
  }
  println!("Example configs generated in {}", output_dir.display());
  Ok(())
}
