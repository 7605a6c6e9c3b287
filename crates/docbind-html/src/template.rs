use std::{fs, path::Path};

use docbind_config::Config;
use docbind_templates as templates;
use log::debug;
use tera::{Context, Tera};

use crate::error::HtmlError;

const PAGE: &str = "page.html";
const COVER: &str = "cover.html";
const TOC: &str = "toc.html";

/// Load a template from the custom template directory, falling back to the
/// embedded one when it has no such file.
fn template_content(
  template_dir: Option<&Path>,
  name: &str,
  fallback: &str,
) -> Result<String, HtmlError> {
  if let Some(dir) = template_dir {
    let path = dir.join(name);
    if path.is_file() {
      debug!("Using custom template: {}", path.display());
      return fs::read_to_string(&path)
        .map_err(|source| HtmlError::TemplateFile { path, source });
    }
  }
  Ok(fallback.to_string())
}

/// The page envelope, cover and TOC templates with the stylesheet they
/// inline.
#[derive(Debug)]
pub struct Templates {
  tera:       Tera,
  stylesheet: String,
}

impl Templates {
  /// Load templates and stylesheet, preferring `template_dir` and
  /// `stylesheet` over the embedded defaults.
  ///
  /// # Errors
  ///
  /// Returns an error if a custom file cannot be read or a template does not
  /// parse.
  pub fn load(
    template_dir: Option<&Path>,
    stylesheet: Option<&Path>,
  ) -> Result<Self, HtmlError> {
    let mut tera = Tera::default();
    for (name, fallback) in [
      (PAGE, templates::PAGE_TEMPLATE),
      (COVER, templates::COVER_TEMPLATE),
      (TOC, templates::TOC_TEMPLATE),
    ] {
      let content = template_content(template_dir, name, fallback)?;
      tera.add_raw_template(name, &content)?;
    }

    let stylesheet = match stylesheet {
      Some(path) => {
        fs::read_to_string(path).map_err(|source| {
          HtmlError::TemplateFile {
            path: path.to_path_buf(),
            source,
          }
        })?
      },
      None => {
        template_content(template_dir, "default.css", templates::DEFAULT_CSS)?
      },
    };

    Ok(Self { tera, stylesheet })
  }

  /// Load the templates selected by `config`.
  ///
  /// # Errors
  ///
  /// See [`Templates::load`].
  pub fn from_config(config: &Config) -> Result<Self, HtmlError> {
    Self::load(config.template_dir.as_deref(), config.stylesheet.as_deref())
  }

  #[must_use]
  pub fn stylesheet(&self) -> &str {
    &self.stylesheet
  }

  fn base_context(&self, title: &str) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("stylesheet", &self.stylesheet);
    context
  }

  /// Wrap `content` in the shared page envelope.
  ///
  /// # Errors
  ///
  /// Returns an error if the template fails to render.
  pub fn render_page(
    &self,
    title: &str,
    content: &str,
  ) -> Result<String, HtmlError> {
    let mut context = self.base_context(title);
    context.insert("content", content);
    Ok(self.tera.render(PAGE, &context)?)
  }

  /// Render the cover page.
  ///
  /// # Errors
  ///
  /// Returns an error if the template fails to render.
  pub fn render_cover(
    &self,
    title: &str,
    date: &str,
  ) -> Result<String, HtmlError> {
    let mut context = self.base_context(title);
    context.insert("date", date);
    Ok(self.tera.render(COVER, &context)?)
  }

  /// Render the TOC block around already rendered entry lines.
  ///
  /// # Errors
  ///
  /// Returns an error if the template fails to render.
  pub fn render_toc(
    &self,
    heading: &str,
    entries: &str,
  ) -> Result<String, HtmlError> {
    let mut context = Context::new();
    context.insert("heading", heading);
    context.insert("entries", entries);
    Ok(self.tera.render(TOC, &context)?)
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]

  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_embedded_page_envelope() {
    let templates = Templates::load(None, None).expect("templates");
    let html = templates
      .render_page("A <b> title", "<p>Body</p>")
      .expect("render");

    assert!(html.contains("<html>"));
    assert!(html.contains("</html>"));
    assert!(html.contains("<p>Body</p>"));
    assert!(html.contains("A &lt;b&gt; title"));
    assert!(html.contains(".page-break"));
  }

  #[test]
  fn test_cover_has_title_and_date() {
    let templates = Templates::load(None, None).expect("templates");
    let html = templates
      .render_cover("Next.js v15.0.0 Documentation", "2024-10-21")
      .expect("render");
    assert!(html.contains("Next.js v15.0.0 Documentation"));
    assert!(html.contains("Date: 2024-10-21"));
  }

  #[test]
  fn test_custom_template_dir_and_stylesheet() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
      dir.path().join("page.html"),
      "<html><body class=\"custom\">{{ content | safe }}</body></html>",
    )
    .expect("write template");
    let css = dir.path().join("print.css");
    fs::write(&css, "body { color: red; }").expect("write css");

    let templates =
      Templates::load(Some(dir.path()), Some(&css)).expect("templates");
    assert_eq!(templates.stylesheet(), "body { color: red; }");

    let page = templates.render_page("t", "<p>x</p>").expect("render");
    assert_eq!(page, "<html><body class=\"custom\"><p>x</p></body></html>");

    // toc.html is not overridden
    let toc = templates.render_toc("Contents", "").expect("render");
    assert!(toc.contains("<h1>Contents</h1>"));
  }

  #[test]
  fn test_missing_stylesheet_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = Templates::load(None, Some(&dir.path().join("missing.css")))
      .expect_err("missing stylesheet");
    assert!(matches!(err, HtmlError::TemplateFile { .. }));
  }
}
