//! Deterministic enumeration of the documents under a content root.
use std::path::{Component, Path, PathBuf};

use log::{trace, warn};
use walkdir::WalkDir;

use crate::error::HtmlError;

/// File names that stand for their containing folder.
pub const INDEX_DOCUMENTS: [&str; 2] = ["index.md", "index.mdx"];

/// Prefix given to index file names in the sort key. It sorts before every
/// character a file name can contain.
const INDEX_SORT_SENTINEL: char = '\0';

/// Whether `path` is the index document of its folder.
#[must_use]
pub fn is_index_document(path: &Path) -> bool {
  path
    .file_name()
    .and_then(|name| name.to_str())
    .is_some_and(|name| INDEX_DOCUMENTS.contains(&name))
}

/// Sort key for a document: its `/`-joined path with the index file name
/// prefixed by the sentinel, so an index document sorts ahead of its
/// siblings while everything else stays lexicographic.
fn sort_key(path: &Path) -> String {
  let mut key = String::with_capacity(path.as_os_str().len() + 1);
  let mut components = path.components().peekable();

  while let Some(component) = components.next() {
    let part = component.as_os_str().to_string_lossy();
    let is_last = components.peek().is_none();
    if is_last && INDEX_DOCUMENTS.contains(&part.as_ref()) {
      key.push(INDEX_SORT_SENTINEL);
    }
    key.push_str(&part);
    if !is_last && !matches!(component, Component::RootDir) {
      key.push('/');
    }
  }

  key
}

/// Numbering depth of a document below `root`.
///
/// This is the number of folders between the root and the file. An index
/// document below the top level represents its folder, so it takes the depth
/// of that folder's siblings instead.
#[must_use]
pub fn document_depth(root: &Path, path: &Path) -> usize {
  let relative = path.strip_prefix(root).unwrap_or(path);
  let depth = relative.components().count().saturating_sub(1);

  if depth > 0 && is_index_document(path) {
    depth - 1
  } else {
    depth
  }
}

/// Collect every document under `root` with one of `extensions`, index
/// documents first within each folder and lexicographic otherwise.
///
/// # Errors
///
/// Returns an error if `root` does not exist or cannot be read. Unreadable
/// entries below the root are logged and skipped.
pub fn collect_documents(
  root: &Path,
  extensions: &[String],
) -> Result<Vec<PathBuf>, HtmlError> {
  if !root.is_dir() {
    return Err(HtmlError::MissingRoot(root.to_path_buf()));
  }

  let mut keyed = Vec::with_capacity(100);

  for entry in WalkDir::new(root).follow_links(true) {
    let entry = match entry {
      Ok(entry) => entry,
      Err(source) if source.depth() == 0 => {
        return Err(HtmlError::Walk {
          root: root.to_path_buf(),
          source,
        });
      },
      Err(e) => {
        warn!("Skipping unreadable entry: {e}");
        continue;
      },
    };

    if !entry.file_type().is_file() {
      continue;
    }

    let path = entry.into_path();
    let wanted = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| {
        extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext))
      });
    if wanted {
      keyed.push((sort_key(&path), path));
    }
  }

  keyed.sort_unstable_by(|a, b| a.0.cmp(&b.0));
  trace!("Found {} documents under {}", keyed.len(), root.display());

  Ok(keyed.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]

  use std::fs;

  use tempfile::TempDir;

  use super::*;

  fn md() -> Vec<String> {
    vec!["md".to_string(), "mdx".to_string()]
  }

  fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).expect("create dirs");
    }
    fs::write(path, "x").expect("write file");
  }

  fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
    files
      .iter()
      .map(|path| {
        path
          .strip_prefix(root)
          .expect("inside root")
          .to_string_lossy()
          .replace('\\', "/")
      })
      .collect()
  }

  #[test]
  fn test_index_sorts_first_in_folder() {
    let dir = TempDir::new().expect("tempdir");
    touch(dir.path(), "b.md");
    touch(dir.path(), "a.md");
    touch(dir.path(), "index.md");

    let files = collect_documents(dir.path(), &md()).expect("walk");
    assert_eq!(relative(dir.path(), &files), ["index.md", "a.md", "b.md"]);
  }

  #[test]
  fn test_nested_order() {
    let dir = TempDir::new().expect("tempdir");
    touch(dir.path(), "01-app/02-routing/index.mdx");
    touch(dir.path(), "01-app/02-routing/01-pages.mdx");
    touch(dir.path(), "01-app/01-start.mdx");
    touch(dir.path(), "01-app/index.mdx");
    touch(dir.path(), "index.mdx");
    touch(dir.path(), "02-pages/index.mdx");
    touch(dir.path(), "01-app/logo.png");

    let files = collect_documents(dir.path(), &md()).expect("walk");
    assert_eq!(relative(dir.path(), &files), [
      "index.mdx",
      "01-app/index.mdx",
      "01-app/01-start.mdx",
      "01-app/02-routing/index.mdx",
      "01-app/02-routing/01-pages.mdx",
      "02-pages/index.mdx",
    ]);
  }

  #[test]
  fn test_missing_root_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let err = collect_documents(&dir.path().join("nope"), &md())
      .expect_err("missing root");
    assert!(matches!(err, HtmlError::MissingRoot(_)));
  }

  #[test]
  fn test_extension_filter_ignores_case() {
    let dir = TempDir::new().expect("tempdir");
    touch(dir.path(), "a.MD");
    touch(dir.path(), "b.mdx");
    touch(dir.path(), "Makefile");
    touch(dir.path(), "c.txt");

    let files = collect_documents(dir.path(), &md()).expect("walk");
    assert_eq!(relative(dir.path(), &files), ["a.MD", "b.mdx"]);

    let files =
      collect_documents(dir.path(), &["txt".to_string()]).expect("walk");
    assert_eq!(relative(dir.path(), &files), ["c.txt"]);
  }

  #[test]
  fn test_document_depth() {
    let root = Path::new("docs");
    assert_eq!(document_depth(root, Path::new("docs/index.mdx")), 0);
    assert_eq!(document_depth(root, Path::new("docs/a.mdx")), 0);
    assert_eq!(document_depth(root, Path::new("docs/app/index.mdx")), 0);
    assert_eq!(document_depth(root, Path::new("docs/app/a.mdx")), 1);
    assert_eq!(document_depth(root, Path::new("docs/app/b/index.md")), 1);
    assert_eq!(document_depth(root, Path::new("docs/app/b/c.md")), 2);
  }

  #[test]
  fn test_is_index_document() {
    assert!(is_index_document(Path::new("a/index.md")));
    assert!(is_index_document(Path::new("index.mdx")));
    assert!(!is_index_document(Path::new("a/index.html")));
    assert!(!is_index_document(Path::new("a/reindex.md")));
  }
}
