//! Accumulates per-document HTML into the combined export document.
use std::{
  fmt::Write,
  path::{Path, PathBuf},
};

use docbind_commonmark::{
  Frontmatter,
  MarkdownProcessor,
  Metadata,
  Transforms,
  parse_document,
  utils::title_case,
};
use html_escape::{encode_double_quoted_attribute, encode_safe, encode_text};
use log::{debug, trace};

use crate::{
  error::HtmlError,
  template::Templates,
  toc::{TocBuilder, TocEntry},
  walker::document_depth,
};

/// Marker separating documents in the output.
pub const PAGE_BREAK: &str = "<div class=\"page-break\"></div>\n";

/// The three complete HTML documents produced by an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledOutput {
  /// TOC followed by every page. This is what gets rendered to PDF.
  pub combined: String,
  /// The TOC on its own.
  pub toc:      String,
  /// The pages without the TOC.
  pub pages:    String,
}

/// Documentation path shown under each heading: the path below the content
/// root with `/` separators, a leading `/` and no extension.
#[must_use]
pub fn documentation_path(root: &Path, path: &Path) -> String {
  let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
  let mut out = String::new();
  for component in relative.components() {
    out.push('/');
    out.push_str(&component.as_os_str().to_string_lossy());
  }
  out
}

/// Title of a document without a `title` key: its file stem, title-cased
/// and escaped.
fn fallback_title(path: &Path) -> String {
  let stem = path
    .file_stem()
    .map(|stem| stem.to_string_lossy())
    .unwrap_or_default();
  encode_safe(&title_case(&stem)).into_owned()
}

/// Write the metadata header of a document. Frontmatter values are already
/// escaped.
fn write_header(
  out: &mut String,
  entry: &TocEntry,
  doc_path: &str,
  frontmatter: &Frontmatter,
) {
  let _ = writeln!(
    out,
    "<h1 id=\"{}\">{}</h1>",
    encode_double_quoted_attribute(&entry.anchor),
    entry.anchor
  );
  let _ = writeln!(
    out,
    "<div class=\"doc-path\"><p>Documentation path: {}</p></div>",
    encode_text(doc_path)
  );
  let _ = writeln!(
    out,
    "<p><strong>Description:</strong> {}</p>",
    frontmatter
      .description()
      .as_deref()
      .unwrap_or("No description")
  );

  if let Some(related) = frontmatter.related() {
    out.push_str("<div class=\"related\">\n");
    out.push_str("<p><strong>Related:</strong></p>\n");
    let _ = writeln!(
      out,
      "<p><strong>Title:</strong> {}</p>",
      related.title.as_deref().unwrap_or("Related")
    );
    let _ = writeln!(
      out,
      "<p><strong>Related Description:</strong> {}</p>",
      related
        .description
        .as_deref()
        .unwrap_or("No related description")
    );
    out.push_str("<p><strong>Links:</strong></p>\n<ul>\n");
    for link in &related.links {
      let _ = writeln!(out, "<li>{link}</li>");
    }
    out.push_str("</ul>\n</div>\n");
  }

  if let Some(source) = frontmatter.source() {
    let _ = writeln!(
      out,
      "<div class=\"source\"><p><strong>Source:</strong> <a \
       href=\"{source}\">{source}</a></p></div>"
    );
  }

  out.push_str("<br/>\n");
}

/// Owns the page buffer and the TOC while documents are added in traversal
/// order.
///
/// Each document contributes a metadata header (when it has valid
/// frontmatter) and its rendered body. Documents are separated by
/// [`PAGE_BREAK`], with no break after the last one.
#[derive(Debug)]
pub struct Assembler {
  root:       PathBuf,
  processor:  MarkdownProcessor,
  transforms: Transforms,
  toc:        TocBuilder,
  pages:      String,
  documents:  usize,
}

impl Assembler {
  /// Create an assembler for documents below `root`.
  #[must_use]
  pub fn new(
    root: impl Into<PathBuf>,
    processor: MarkdownProcessor,
    transforms: Transforms,
  ) -> Self {
    Self {
      root: root.into(),
      processor,
      transforms,
      toc: TocBuilder::new(),
      pages: String::with_capacity(64 * 1024),
      documents: 0,
    }
  }

  /// Add one document. Returns its TOC entry if it has valid frontmatter.
  ///
  /// Documents whose frontmatter declares a `source` only contribute their
  /// header; their body is a pointer, not content.
  pub fn push_document(
    &mut self,
    path: &Path,
    raw: &str,
  ) -> Option<&TocEntry> {
    let text = self.transforms.preprocess(raw);
    let (metadata, body) = parse_document(&text);

    if self.documents > 0 {
      self.pages.push_str(PAGE_BREAK);
    }
    self.documents += 1;

    let mut numbered = false;
    let mut render_body = true;

    match &metadata {
      Metadata::Valid(frontmatter) => {
        let depth = document_depth(&self.root, path);
        let title = frontmatter
          .title()
          .unwrap_or_else(|| fallback_title(path));
        let doc_path = documentation_path(&self.root, path);

        let entry = self.toc.push(depth, title);
        trace!("Numbered {} as '{}'", path.display(), entry.anchor);
        write_header(&mut self.pages, entry, &doc_path, frontmatter);

        numbered = true;
        render_body = frontmatter.source().is_none();
      },
      Metadata::Absent | Metadata::Malformed => {
        debug!("{} has no usable frontmatter", path.display());
      },
    }

    if render_body {
      let html = self.processor.render(&self.transforms.prepare_body(body));
      self.pages.push_str(&html);
    }

    if numbered {
      self.toc.entries().last()
    } else {
      None
    }
  }

  /// The page HTML accumulated so far.
  #[must_use]
  pub fn pages(&self) -> &str {
    &self.pages
  }

  #[must_use]
  pub const fn toc(&self) -> &TocBuilder {
    &self.toc
  }

  /// Number of documents added.
  #[must_use]
  pub const fn len(&self) -> usize {
    self.documents
  }

  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.documents == 0
  }

  /// Wrap the pages, the TOC, and their combination in the page envelope.
  ///
  /// # Errors
  ///
  /// Returns an error if a template fails to render.
  pub fn finish(
    self,
    templates: &Templates,
    title: &str,
    toc_heading: &str,
  ) -> Result<AssembledOutput, HtmlError> {
    let toc_block =
      templates.render_toc(toc_heading, &self.toc.render_entries())?;

    let toc = templates.render_page(title, &toc_block)?;
    let pages = templates.render_page(title, &self.pages)?;

    let mut body = toc_block;
    body.push_str(&self.pages);
    let combined = templates.render_page(title, &body)?;

    Ok(AssembledOutput {
      combined,
      toc,
      pages,
    })
  }
}
