//! Text rewrite passes applied to document sources before rendering.
//!
//! Each pass is a plain `&str -> String` function and can be used on its own.
//! [`Transforms`] bundles the configured passes in the order the exporter
//! applies them.
use std::sync::LazyLock;

use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::{Captures, Regex};

use crate::utils::{FenceTracker, never_matching_regex, opening_fence};

static IMAGE_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"\bsrc(?:Light|Dark)?="([^"]*)""#).unwrap_or_else(|e| {
    log::error!("Failed to compile IMAGE_SRC_RE regex: {e}");
    never_matching_regex()
  })
});

static ANNOTATED_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r#"(?ms)^( {0,3})```(\w+)?[ \t]+filename="([^"]+)"([^\r\n]*)(\r?\n)(.*?)^( {0,3}```[ \t]*\r?)$"#,
  )
  .unwrap_or_else(|e| {
    log::error!("Failed to compile ANNOTATED_FENCE_RE regex: {e}");
    never_matching_regex()
  })
});

/// Marker token that requests a language switcher on an annotated block.
/// It has no meaning on paper and is dropped from the header.
const SWITCHER_MARKER: &str = "switcher";

/// Whether an attribute value points somewhere on its own and must not be
/// prefixed with the image base URL.
fn is_absolute_reference(value: &str) -> bool {
  if value.starts_with("//") || value.starts_with('#') {
    return true;
  }

  // scheme ":" per RFC 3986, checked before any path separator
  value.split_once(':').is_some_and(|(scheme, _)| {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
      && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
  })
}

/// Rewrite relative image references to absolute URLs.
///
/// Every `src="..."`, `srcLight="..."` and `srcDark="..."` attribute holding a
/// relative path becomes `src="{base_url}{path}{query_args}"`. Absolute
/// references, and values already carrying `base_url`, are left untouched, so
/// running the pass twice changes nothing.
#[must_use]
pub fn rewrite_image_paths(
  text: &str,
  base_url: &str,
  query_args: &str,
) -> String {
  IMAGE_SRC_RE
    .replace_all(text, |caps: &Captures| {
      let path = &caps[1];
      let already_rewritten = !base_url.is_empty() && path.starts_with(base_url);
      if path.is_empty() || already_rewritten || is_absolute_reference(path) {
        caps[0].to_string()
      } else {
        format!("src=\"{base_url}{path}{query_args}\"")
      }
    })
    .into_owned()
}

/// Surface the `filename="..."` annotation of fenced code blocks.
///
/// A fence such as `` ```js filename="app.js" switcher `` is preceded by a
/// visible header naming the file, language and any extra attribute tokens,
/// then re-emitted as a plain `` ```js `` fence. The code between the fences
/// and the closing fence are carried over byte for byte. Fences indented up
/// to three spaces keep their indentation, and the header takes the same
/// indentation and line ending as the fence.
#[must_use]
pub fn annotate_code_blocks(text: &str) -> String {
  ANNOTATED_FENCE_RE
    .replace_all(text, |caps: &Captures| {
      let indent = &caps[1];
      let language = caps.get(2).map_or("", |m| m.as_str());
      let filename = &caps[3];
      let newline = &caps[5];
      let code = &caps[6];
      let closing = &caps[7];

      let mut label = encode_text(filename).into_owned();
      if !language.is_empty() {
        label.push_str(&format!(" ({language})"));
      }
      for token in caps[4]
        .split_whitespace()
        .filter(|token| *token != SWITCHER_MARKER)
      {
        label.push(' ');
        label.push_str(&encode_text(token));
      }

      format!(
        "{indent}<div class=\"code-header\"><i>{label}</i></div>{newline}{newline}{indent}```{language}{newline}{code}{closing}"
      )
    })
    .into_owned()
}

/// A fenced block collected by [`escape_code_blocks`].
struct PendingBlock {
  indent:   usize,
  language: Option<String>,
  content:  String,
}

impl PendingBlock {
  fn push_line(&mut self, line: &str) {
    // Strip up to the fence's own indentation, as CommonMark does
    let strip = line
      .bytes()
      .take(self.indent)
      .take_while(|b| *b == b' ')
      .count();
    self.content.push_str(&line[strip..]);
  }

  fn write_to(&self, out: &mut String) {
    let indent = " ".repeat(self.indent);
    out.push_str(&indent);
    match &self.language {
      Some(language) => {
        out.push_str("<pre><code class=\"language-");
        out.push_str(&encode_double_quoted_attribute(language));
        out.push_str("\">");
      },
      None => out.push_str("<pre><code>"),
    }

    // Every line keeps the fence indentation so the HTML block stays inside
    // its container, such as a list item
    let escaped = encode_text(&self.content);
    for (i, line) in escaped.split_inclusive('\n').enumerate() {
      if i > 0 {
        out.push_str(&indent);
      }
      out.push_str(line);
    }
    if !self.content.is_empty() {
      if !self.content.ends_with('\n') {
        out.push('\n');
      }
      out.push_str(&indent);
    }
    out.push_str("</code></pre>\n");
  }
}

/// Escape the literal content of every fenced code block.
///
/// Each fence is replaced by a raw `<pre><code>` HTML block whose content has
/// `&`, `<` and `>` escaped, so markup inside code samples (JSX, HTML) is
/// shown as text instead of being interpreted by the Markdown renderer. Text
/// outside fences is copied unchanged; an unclosed fence runs to the end of
/// the input.
#[must_use]
pub fn escape_code_blocks(text: &str) -> String {
  let mut out = String::with_capacity(text.len() + text.len() / 8);
  let mut tracker = FenceTracker::new();
  let mut pending: Option<PendingBlock> = None;

  for line in text.split_inclusive('\n') {
    let next = tracker.process_line(line);

    match (pending.as_mut(), next.in_code_block()) {
      (None, true) => {
        let fence = opening_fence(line);
        pending = Some(PendingBlock {
          indent:   fence.as_ref().map_or(0, |f| f.indent),
          language: fence.and_then(|f| f.language),
          content:  String::new(),
        });
      },
      (Some(block), true) => block.push_line(line),
      (Some(block), false) => {
        block.write_to(&mut out);
        pending = None;
      },
      (None, false) => out.push_str(line),
    }

    tracker = next;
  }

  if let Some(block) = pending {
    block.write_to(&mut out);
  }

  out
}

/// Image rewrite settings: the base URL and the query string appended to
/// every rewritten reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRewrite {
  pub base_url:   String,
  pub query_args: String,
}

/// The configured set of transform passes.
#[derive(Debug, Clone, Default)]
pub struct Transforms {
  images: Option<ImageRewrite>,
}

impl Transforms {
  /// Transforms with code annotation and escaping only.
  #[must_use]
  pub const fn new() -> Self {
    Self { images: None }
  }

  /// Enable image reference rewriting.
  #[must_use]
  pub fn with_image_rewrite(mut self, images: ImageRewrite) -> Self {
    self.images = Some(images);
    self
  }

  #[must_use]
  pub const fn image_rewrite(&self) -> Option<&ImageRewrite> {
    self.images.as_ref()
  }

  /// Passes applied to the whole raw document, frontmatter included.
  #[must_use]
  pub fn preprocess(&self, raw: &str) -> String {
    let text = match &self.images {
      Some(images) => {
        rewrite_image_paths(raw, &images.base_url, &images.query_args)
      },
      None => raw.to_string(),
    };
    annotate_code_blocks(&text)
  }

  /// Passes applied to a body after the frontmatter has been split off.
  #[must_use]
  pub fn prepare_body(&self, body: &str) -> String {
    escape_code_blocks(body)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const BASE: &str = "https://cdn.example.com/_next/image?url=";
  const ARGS: &str = "&w=1920&q=75";

  #[test]
  fn test_rewrite_themed_and_plain_sources() {
    let input = r#"<Image srcLight="/docs/light/a.png" srcDark="/docs/dark/a.png" src="/b.png" />"#;
    let output = rewrite_image_paths(input, BASE, ARGS);
    assert_eq!(
      output,
      format!(
        r#"<Image src="{BASE}/docs/light/a.png{ARGS}" src="{BASE}/docs/dark/a.png{ARGS}" src="{BASE}/b.png{ARGS}" />"#
      )
    );
  }

  #[test]
  fn test_rewrite_is_idempotent() {
    let input = r#"<img src="/docs/a.png" /> and <img srcDark="img/b.png" />"#;
    let once = rewrite_image_paths(input, BASE, ARGS);
    let twice = rewrite_image_paths(&once, BASE, ARGS);
    assert_eq!(once, twice);
  }

  #[test]
  fn test_rewrite_skips_absolute_references() {
    let input = r#"<img src="https://example.com/a.png" /><img src="data:image/png;base64,AAA" /><img src="//x/y.png" />"#;
    assert_eq!(rewrite_image_paths(input, BASE, ARGS), input);
  }

  #[test]
  fn test_rewrite_ignores_other_attributes() {
    let input = r#"<a href="/docs/a" data-source="/x.png">"#;
    assert_eq!(rewrite_image_paths(input, BASE, ARGS), input);
  }

  #[test]
  fn test_annotate_code_block() {
    let input = "Intro\n\n```js filename=\"app.js\"\nconst a = <App />;\n```\n";
    let output = annotate_code_blocks(input);
    assert_eq!(
      output,
      "Intro\n\n<div class=\"code-header\"><i>app.js (js)</i></div>\n\n```js\nconst a = <App />;\n```\n"
    );
  }

  #[test]
  fn test_annotate_extra_attributes_and_switcher() {
    let input =
      "```tsx filename=\"app/page.tsx\" highlight={3} switcher\nx\n```";
    let output = annotate_code_blocks(input);
    assert!(output.starts_with(
      "<div class=\"code-header\"><i>app/page.tsx (tsx) highlight={3}</i></div>"
    ));
    assert!(!output.contains("switcher"));
    assert!(output.ends_with("```tsx\nx\n```"));
  }

  #[test]
  fn test_annotate_without_language() {
    let output = annotate_code_blocks("``` filename=\"notes.txt\"\nhello\n```");
    assert!(output.starts_with("<div class=\"code-header\"><i>notes.txt</i></div>"));
    assert!(output.ends_with("```\nhello\n```"));
  }

  #[test]
  fn test_annotate_leaves_plain_fences() {
    let input = "```js\nconsole.log(1)\n```\n";
    assert_eq!(annotate_code_blocks(input), input);
  }

  #[test]
  fn test_escape_code_blocks() {
    let input = "Text <b>kept</b>\n\n```jsx\n<Button onClick={go}>Go</Button>\n```\nAfter\n";
    let output = escape_code_blocks(input);
    assert_eq!(
      output,
      "Text <b>kept</b>\n\n<pre><code class=\"language-jsx\">&lt;Button onClick={go}&gt;Go&lt;/Button&gt;\n</code></pre>\nAfter\n"
    );
  }

  #[test]
  fn test_escape_unclosed_block_runs_to_end() {
    let output = escape_code_blocks("~~~\na < b");
    assert_eq!(output, "<pre><code>a &lt; b\n</code></pre>\n");
  }

  #[test]
  fn test_escape_keeps_list_item_indentation() {
    let input = "1. Install:\n\n   ```bash\n   npm i * foo *\n   echo <done>\n   ```\n\n2. Next\n";
    assert_eq!(
      escape_code_blocks(input),
      "1. Install:\n\n   <pre><code class=\"language-bash\">npm i * foo *\n   echo &lt;done&gt;\n   </code></pre>\n\n2. Next\n"
    );
  }

  #[test]
  fn test_annotate_fence_in_list_item() {
    let input = "1. Step\n\n   ```js filename=\"app.js\"\n   x\n   ```\n";
    assert_eq!(
      annotate_code_blocks(input),
      "1. Step\n\n   <div class=\"code-header\"><i>app.js (js)</i></div>\n\n   ```js\n   x\n   ```\n"
    );
  }

  #[test]
  fn test_annotate_crlf_fence() {
    let input = "```js filename=\"a.js\"\r\nx\r\n```\r\nAfter\r\n";
    assert_eq!(
      annotate_code_blocks(input),
      "<div class=\"code-header\"><i>a.js (js)</i></div>\r\n\r\n```js\r\nx\r\n```\r\nAfter\r\n"
    );
  }

  #[test]
  fn test_annotate_ignores_deeply_indented_fence() {
    let input = "    ```js filename=\"app.js\"\n    x\n    ```\n";
    assert_eq!(annotate_code_blocks(input), input);
  }

  #[test]
  fn test_transforms_pipeline() {
    let transforms = Transforms::new().with_image_rewrite(ImageRewrite {
      base_url:   BASE.to_string(),
      query_args: ARGS.to_string(),
    });
    let raw = "---\ntitle: T\n---\n<img src=\"/a.png\" />\n";
    let pre = transforms.preprocess(raw);
    assert!(pre.contains(&format!("src=\"{BASE}/a.png{ARGS}\"")));
    assert!(pre.starts_with("---\ntitle: T\n---\n"));
  }
}
