use std::fs;

use color_eyre::eyre::{Context, Result, bail};
use docbind::{
  cli::{Cli, Commands, ExportArgs},
  export::{self, ExportOptions},
  pdf::Wkhtmltopdf,
  sync,
};
use docbind_config::{Config, sync::SyncConfig};
use log::{LevelFilter, info, warn};

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match &cli.command {
    Some(Commands::Init {
      output,
      format,
      force,
    }) => {
      if output.exists() && !force {
        bail!(
          "Configuration file already exists: {}. Use --force to overwrite.",
          output.display()
        );
      }

      if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
          fs::create_dir_all(parent).wrap_err_with(|| {
            format!("Failed to create directory: {}", parent.display())
          })?;
          info!("Created directory: {}", parent.display());
        }
      }

      Config::generate_default_config(format, output).wrap_err_with(|| {
        format!("Failed to generate configuration file: {}", output.display())
      })?;

      info!(
        "Configuration file created successfully. Edit it to customize your \
         export."
      );
      Ok(())
    },

    Some(Commands::ExportTemplates { output_dir, force }) => {
      Config::export_templates(output_dir, *force).wrap_err_with(|| {
        format!("Failed to export templates to {}", output_dir.display())
      })
    },

    Some(Commands::Sync) => {
      let config = load_config(&cli)?;
      let sync_config = config.sync.unwrap_or_else(|| {
        info!("No sync source configured, using the defaults");
        SyncConfig::default()
      });
      sync::sync_content(&sync_config).wrap_err("Content sync failed")
    },

    Some(Commands::Export(args)) => run_export(&cli, args),
    None => run_export(&cli, &ExportArgs::default()),
  }
}

fn load_config(cli: &Cli) -> Result<Config> {
  Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")
}

fn run_export(cli: &Cli, args: &ExportArgs) -> Result<()> {
  let mut config = load_config(cli)?;
  args.apply(&mut config);
  config.validate_paths()?;

  info!("Starting export...");
  let renderer = Wkhtmltopdf::from_config(&config.pdf_config());
  let report = export::export(&config, &renderer, ExportOptions {
    sync: !args.no_sync,
  })
  .wrap_err("Export failed")?;

  info!(
    "Exported {} documents ({} in the table of contents)",
    report.documents, report.toc_entries
  );
  if report.rendered {
    info!("Created {}", report.output_path.display());
  } else {
    warn!("PDF was not written: {}", report.output_path.display());
  }

  Ok(())
}
