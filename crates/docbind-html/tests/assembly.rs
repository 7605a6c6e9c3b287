#![allow(clippy::expect_used, reason = "Fine in tests")]
use std::{fs, path::Path};

use docbind_commonmark::{MarkdownProcessor, Transforms};
use docbind_html::{
  Assembler,
  PAGE_BREAK,
  Templates,
  collect_documents,
  find_latest_version,
};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).expect("create dirs");
  }
  fs::write(path, content).expect("write document");
}

fn assemble(root: &Path) -> Assembler {
  let files = collect_documents(root, &["md".to_string()]).expect("walk");
  let mut assembler =
    Assembler::new(root, MarkdownProcessor::default(), Transforms::new());
  for file in &files {
    let raw = fs::read_to_string(file).expect("read document");
    assembler.push_document(file, &raw);
  }
  assembler
}

#[test]
fn three_documents_end_to_end() {
  let dir = TempDir::new().expect("tempdir");
  write(dir.path(), "index.md", "---\ntitle: Intro\n---\nWelcome text.\n");
  write(dir.path(), "a.md", "---\ntitle: Alpha\n---\nAlpha text.\n");
  write(dir.path(), "b.md", "Just Bravo text.\n");

  let assembler = assemble(dir.path());
  assert_eq!(assembler.len(), 3);

  let anchors: Vec<_> = assembler
    .toc()
    .entries()
    .iter()
    .map(|entry| entry.anchor.as_str())
    .collect();
  assert_eq!(anchors, ["Intro", "1 - Alpha"]);

  let pages = assembler.pages().to_string();
  assert_eq!(pages.matches(PAGE_BREAK).count(), 2);
  assert!(!pages.trim_end().ends_with(PAGE_BREAK.trim_end()));

  let welcome = pages.find("Welcome text.").expect("intro body");
  let alpha = pages.find("Alpha text.").expect("alpha body");
  let bravo = pages.find("Just Bravo text.").expect("bravo body");
  assert!(welcome < alpha && alpha < bravo);

  let templates = Templates::load(None, None).expect("templates");
  let output = assembler
    .finish(&templates, "Docs Documentation", "Table of Contents")
    .expect("finish");

  for document in [&output.combined, &output.toc, &output.pages] {
    assert!(document.trim_start().starts_with("<html>"));
    assert!(document.trim_end().ends_with("</html>"));
  }

  assert!(output.toc.contains("<a href=\"#1 - Alpha\">1 - Alpha</a>"));
  assert!(!output.toc.contains("Alpha text."));
  assert!(!output.pages.contains("Table of Contents"));

  let toc_at = output.combined.find("Table of Contents").expect("toc");
  let intro_at = output.combined.find("<h1 id=\"Intro\">").expect("intro");
  assert!(toc_at < intro_at);
}

#[test]
fn nested_tree_numbering() {
  let dir = TempDir::new().expect("tempdir");
  let doc = |title: &str| format!("---\ntitle: {title}\n---\n");
  write(dir.path(), "index.md", &doc("Home"));
  write(dir.path(), "01-app/index.md", &doc("App"));
  write(dir.path(), "01-app/01-start.md", &doc("Start"));
  write(dir.path(), "01-app/02-routing/index.md", &doc("Routing"));
  write(dir.path(), "01-app/02-routing/01-pages.md", &doc("Pages"));
  write(dir.path(), "01-app/03-api.md", &doc("API"));
  write(dir.path(), "02-pages/index.md", &doc("Pages Router"));

  let assembler = assemble(dir.path());
  let anchors: Vec<_> = assembler
    .toc()
    .entries()
    .iter()
    .map(|entry| entry.anchor.clone())
    .collect();

  assert_eq!(anchors, [
    "Home",
    "1 - App",
    "1.1 - Start",
    "1.2 - Routing",
    "1.2.1 - Pages",
    "1.3 - API",
    "2 - Pages Router",
  ]);
}

#[test]
fn code_samples_are_shown_as_text() {
  let dir = TempDir::new().expect("tempdir");
  write(
    dir.path(),
    "index.md",
    "---\ntitle: Layouts\n---\n```tsx filename=\"app/layout.tsx\" \
     switcher\nexport default function Layout() {\n  return \
     <html><body /></html>\n}\n```\n",
  );

  let assembler = assemble(dir.path());
  let pages = assembler.pages();
  assert!(
    pages.contains(r#"<div class="code-header"><i>app/layout.tsx (tsx)</i></div>"#)
  );
  assert!(pages.contains("return &lt;html&gt;&lt;body /&gt;&lt;/html&gt;"));
}

#[test]
fn version_is_found_in_pages() {
  let dir = TempDir::new().expect("tempdir");
  write(
    dir.path(),
    "index.md",
    "---\ntitle: Upgrading\n---\nFrom v14.2.3 to v15.0.0.\n",
  );

  let assembler = assemble(dir.path());
  assert_eq!(
    find_latest_version(assembler.pages()).as_deref(),
    Some("15.0.0")
  );
}
