//! Hierarchical section numbering and the table of contents built from it.
use std::fmt::Write;

use html_escape::encode_double_quoted_attribute;

/// Per-depth section counters.
///
/// The first document advanced through the state is the root title page: it
/// gets an empty label and does not count. Every later document increments
/// the counter at its depth and resets all deeper counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberingState {
  counters: Vec<u32>,
  started:  bool,
}

impl NumberingState {
  #[must_use]
  pub const fn new() -> Self {
    Self {
      counters: Vec::new(),
      started:  false,
    }
  }

  /// Advance numbering for a document at `depth` and return its label, e.g.
  /// `"2.1.3"`. The label of the root document is empty.
  pub fn advance(&mut self, depth: usize) -> String {
    if self.counters.len() <= depth {
      self.counters.resize(depth + 1, 0);
    }

    if !self.started {
      self.started = true;
      return String::new();
    }

    self.counters[depth] += 1;
    for counter in &mut self.counters[depth + 1..] {
      *counter = 0;
    }

    let mut label = String::new();
    for (i, counter) in self.counters[..=depth].iter().enumerate() {
      if i > 0 {
        label.push('.');
      }
      let _ = write!(label, "{counter}");
    }
    label
  }

  #[must_use]
  pub fn counters(&self) -> &[u32] {
    &self.counters
  }
}

/// One line of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
  /// Dot-separated section number, empty for the root document.
  pub label:  String,
  pub title:  String,
  pub depth:  usize,
  /// Heading id and link target: `"{label} - {title}"`, or the bare title for
  /// the root document.
  pub anchor: String,
}

impl TocEntry {
  fn new(label: String, title: String, depth: usize) -> Self {
    let anchor = if label.is_empty() {
      title.clone()
    } else {
      format!("{label} - {title}")
    };
    Self {
      label,
      title,
      depth,
      anchor,
    }
  }
}

/// Number of `&nbsp;` per depth level in the rendered TOC.
const INDENT_PER_LEVEL: usize = 5;

/// Builds TOC entries in traversal order.
#[derive(Debug, Clone, Default)]
pub struct TocBuilder {
  numbering: NumberingState,
  entries:   Vec<TocEntry>,
}

impl TocBuilder {
  #[must_use]
  pub const fn new() -> Self {
    Self {
      numbering: NumberingState::new(),
      entries:   Vec::new(),
    }
  }

  /// Number a document at `depth` titled `title` and record its entry.
  ///
  /// `title` is inserted into markup as is and must already be escaped.
  pub fn push(&mut self, depth: usize, title: String) -> &TocEntry {
    let label = self.numbering.advance(depth);
    let index = self.entries.len();
    self.entries.push(TocEntry::new(label, title, depth));
    &self.entries[index]
  }

  #[must_use]
  pub fn entries(&self) -> &[TocEntry] {
    &self.entries
  }

  #[must_use]
  pub const fn numbering(&self) -> &NumberingState {
    &self.numbering
  }

  /// Render the entry lines, one indented link per entry.
  #[must_use]
  pub fn render_entries(&self) -> String {
    let mut out = String::with_capacity(self.entries.len() * 64);
    for entry in &self.entries {
      out.push_str(&"&nbsp;".repeat(INDENT_PER_LEVEL * entry.depth));
      let _ = writeln!(
        out,
        "<a href=\"#{}\">{}</a><br/>",
        encode_double_quoted_attribute(&entry.anchor),
        entry.anchor
      );
    }
    out
  }
}
