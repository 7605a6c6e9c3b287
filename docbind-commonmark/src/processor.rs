//! CommonMark rendering for prepared document bodies.
//!
//! The exporter only needs `render(text) -> html`; the extension set is
//! described by [`MarkdownOptions`] and mapped onto comrak's options.
//!
//! # Examples
//!
//! ```
//! use docbind_commonmark::{MarkdownOptionsBuilder, MarkdownProcessor};
//!
//! let options = MarkdownOptionsBuilder::new().tables(true).build();
//! let processor = MarkdownProcessor::new(options);
//! let html = processor.render("| a |\n|---|\n| b |\n");
//! assert!(html.contains("<table>"));
//! ```
use comrak::{markdown_to_html, options::Options};
use log::debug;

/// Markdown extensions the renderer is asked to honour.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct MarkdownOptions {
  /// Fenced code blocks. Always part of CommonMark; kept for completeness.
  pub fenced_code: bool,

  pub tables: bool,

  pub footnotes: bool,

  /// Generate `id` attributes for headings.
  pub toc: bool,

  /// `*[HTML]: ...` abbreviation definitions. No comrak equivalent.
  pub abbreviations: bool,

  /// `{: .class}` attribute lists. No comrak equivalent.
  pub attribute_lists: bool,

  pub definition_lists: bool,

  /// Curly quotes, dashes and ellipses.
  pub smart_punctuation: bool,

  /// `> [!NOTE]` style callouts.
  pub admonitions: bool,
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    Self {
      fenced_code:       true,
      tables:            true,
      footnotes:         true,
      toc:               true,
      abbreviations:     true,
      attribute_lists:   true,
      definition_lists:  true,
      smart_punctuation: true,
      admonitions:       true,
    }
  }
}

impl MarkdownOptions {
  /// Options with every extension turned off; plain CommonMark.
  #[must_use]
  pub const fn commonmark() -> Self {
    Self {
      fenced_code:       true,
      tables:            false,
      footnotes:         false,
      toc:               false,
      abbreviations:     false,
      attribute_lists:   false,
      definition_lists:  false,
      smart_punctuation: false,
      admonitions:       false,
    }
  }
}

/// Builder for [`MarkdownOptions`], starting from plain CommonMark.
#[derive(Debug, Clone)]
pub struct MarkdownOptionsBuilder {
  options: MarkdownOptions,
}

impl MarkdownOptionsBuilder {
  #[must_use]
  pub const fn new() -> Self {
    Self {
      options: MarkdownOptions::commonmark(),
    }
  }

  #[must_use]
  pub const fn tables(mut self, enabled: bool) -> Self {
    self.options.tables = enabled;
    self
  }

  #[must_use]
  pub const fn footnotes(mut self, enabled: bool) -> Self {
    self.options.footnotes = enabled;
    self
  }

  #[must_use]
  pub const fn toc(mut self, enabled: bool) -> Self {
    self.options.toc = enabled;
    self
  }

  #[must_use]
  pub const fn definition_lists(mut self, enabled: bool) -> Self {
    self.options.definition_lists = enabled;
    self
  }

  #[must_use]
  pub const fn smart_punctuation(mut self, enabled: bool) -> Self {
    self.options.smart_punctuation = enabled;
    self
  }

  #[must_use]
  pub const fn admonitions(mut self, enabled: bool) -> Self {
    self.options.admonitions = enabled;
    self
  }

  #[must_use]
  pub const fn abbreviations(mut self, enabled: bool) -> Self {
    self.options.abbreviations = enabled;
    self
  }

  #[must_use]
  pub const fn attribute_lists(mut self, enabled: bool) -> Self {
    self.options.attribute_lists = enabled;
    self
  }

  #[must_use]
  pub fn build(self) -> MarkdownOptions {
    self.options
  }
}

impl Default for MarkdownOptionsBuilder {
  fn default() -> Self {
    Self::new()
  }
}

/// Renders Markdown bodies to HTML fragments.
#[derive(Debug, Clone)]
pub struct MarkdownProcessor {
  options: MarkdownOptions,
}

impl MarkdownProcessor {
  #[must_use]
  pub fn new(options: MarkdownOptions) -> Self {
    if options.abbreviations || options.attribute_lists {
      debug!(
        "Abbreviations and attribute lists are not supported by the \
         renderer and will be left as text"
      );
    }
    Self { options }
  }

  #[must_use]
  pub const fn options(&self) -> &MarkdownOptions {
    &self.options
  }

  /// Render Markdown to an HTML fragment.
  ///
  /// Raw HTML in the input is passed through, which is what lets the
  /// pre-escaped code blocks and code headers from the transform passes
  /// survive rendering.
  #[must_use]
  pub fn render(&self, markdown: &str) -> String {
    markdown_to_html(markdown, &self.comrak_options())
  }

  /// Build comrak options from [`MarkdownOptions`].
  fn comrak_options(&self) -> Options<'_> {
    let mut options = Options::default();
    options.extension.table = self.options.tables;
    options.extension.footnotes = self.options.footnotes;
    options.extension.description_lists = self.options.definition_lists;
    options.extension.alerts = self.options.admonitions;
    options.extension.strikethrough = true;
    options.extension.header_ids =
      self.options.toc.then(String::new);
    options.parse.smart = self.options.smart_punctuation;
    options.render.r#unsafe = true;
    options
  }
}

impl Default for MarkdownProcessor {
  fn default() -> Self {
    Self::new(MarkdownOptions::default())
  }
}
