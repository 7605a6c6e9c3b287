use std::collections::HashMap;

pub const PAGE_TEMPLATE: &str = include_str!("../templates/page.html");
pub const COVER_TEMPLATE: &str = include_str!("../templates/cover.html");
pub const TOC_TEMPLATE: &str = include_str!("../templates/toc.html");

pub const DEFAULT_CSS: &str = include_str!("../templates/default.css");

#[must_use]
pub fn all_templates() -> HashMap<&'static str, &'static str> {
  let mut templates = HashMap::new();
  templates.insert("page.html", PAGE_TEMPLATE);
  templates.insert("cover.html", COVER_TEMPLATE);
  templates.insert("toc.html", TOC_TEMPLATE);
  templates.insert("default.css", DEFAULT_CSS);
  templates
}
