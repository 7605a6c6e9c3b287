//! Sparse checkout of the documentation directory of a remote repository.
use std::{fs, path::Path, process::Command, time::Duration};

use docbind_config::sync::SyncConfig;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use crate::error::SyncError;

/// Run one git command in `dir`, failing on a non-zero exit.
fn git(dir: &Path, args: &[&str]) -> Result<(), SyncError> {
  let command = args.join(" ");
  debug!("git {command} (in {})", dir.display());

  let output = Command::new("git")
    .current_dir(dir)
    .args(args)
    .output()
    .map_err(|source| {
      SyncError::Launch {
        command: command.clone(),
        source,
      }
    })?;

  if !output.status.success() {
    return Err(SyncError::Git {
      command,
      status: output.status,
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    });
  }
  Ok(())
}

fn spinner() -> ProgressBar {
  let spinner = ProgressBar::new_spinner();
  if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
    spinner.set_style(style);
  }
  spinner.enable_steady_tick(Duration::from_millis(120));
  spinner
}

/// Content of `.git/info/sparse-checkout` for `docs_dir`.
#[must_use]
pub fn sparse_checkout_pattern(docs_dir: &Path) -> String {
  let dir = docs_dir.to_string_lossy().replace('\\', "/");
  format!("/{}\n", dir.trim_matches('/'))
}

/// Whether `repo_dir` already holds a checkout to update.
#[must_use]
pub fn is_checkout(repo_dir: &Path) -> bool {
  repo_dir.join(".git").is_dir()
}

/// Create or update the sparse checkout described by `config`.
///
/// A new checkout is initialised with sparse checkout of `docs_dir` only,
/// fetched and switched to `branch`. An existing one is fetched, switched to
/// `branch` and pulled.
///
/// # Errors
///
/// Returns an error if the directory cannot be prepared or any git command
/// fails.
pub fn sync_content(config: &SyncConfig) -> Result<(), SyncError> {
  let repo_dir = config.repo_dir.as_path();
  let progress = spinner();

  let result = if is_checkout(repo_dir) {
    info!("Updating documentation checkout in {}", repo_dir.display());
    update_checkout(config, &progress)
  } else {
    info!(
      "Cloning {} from {} into {}",
      config.docs_dir.display(),
      config.repo_url,
      repo_dir.display()
    );
    create_checkout(config, &progress)
  };

  progress.finish_and_clear();
  result?;

  info!("Documentation checkout is up to date");
  Ok(())
}

fn create_checkout(
  config: &SyncConfig,
  progress: &ProgressBar,
) -> Result<(), SyncError> {
  let repo_dir = config.repo_dir.as_path();
  let io_error = |source| {
    SyncError::Io {
      path: repo_dir.to_path_buf(),
      source,
    }
  };

  fs::create_dir_all(repo_dir).map_err(io_error)?;

  progress.set_message("Initialising repository");
  git(repo_dir, &["init", "--quiet"])?;
  git(repo_dir, &["config", "core.sparseCheckout", "true"])?;

  let info_dir = repo_dir.join(".git").join("info");
  fs::create_dir_all(&info_dir).map_err(io_error)?;
  fs::write(
    info_dir.join("sparse-checkout"),
    sparse_checkout_pattern(&config.docs_dir),
  )
  .map_err(io_error)?;

  git(repo_dir, &["remote", "add", "origin", &config.repo_url])?;

  progress.set_message(format!("Fetching {}", config.branch));
  git(repo_dir, &[
    "fetch",
    "--quiet",
    "--depth",
    "1",
    "origin",
    &config.branch,
  ])?;

  progress.set_message(format!("Checking out {}", config.branch));
  git(repo_dir, &["checkout", "--quiet", &config.branch])
}

fn update_checkout(
  config: &SyncConfig,
  progress: &ProgressBar,
) -> Result<(), SyncError> {
  let repo_dir = config.repo_dir.as_path();

  progress.set_message(format!("Fetching {}", config.branch));
  git(repo_dir, &[
    "fetch",
    "--quiet",
    "--depth",
    "1",
    "origin",
    &config.branch,
  ])?;

  progress.set_message(format!("Checking out {}", config.branch));
  git(repo_dir, &["checkout", "--quiet", &config.branch])?;

  progress.set_message(format!("Pulling {}", config.branch));
  git(repo_dir, &[
    "pull",
    "--quiet",
    "--ff-only",
    "origin",
    &config.branch,
  ])
}
