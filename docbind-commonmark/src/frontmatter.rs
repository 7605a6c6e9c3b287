//! Frontmatter extraction and decoding.
//!
//! A document may start with a `---` delimited YAML block. The block is split
//! off the body, raw `<...>` markup inside it is masked before decoding (YAML
//! would otherwise read a leading `>` or `<` as syntax), and the original
//! markup is restored, HTML-escaped, into the decoded string values.
use std::sync::LazyLock;

use log::{debug, warn};
use regex::{Captures, Regex};
use serde_yaml::{Mapping, Value};

use crate::{error::FrontmatterError, utils::never_matching_regex};

/// Marker line that opens and closes a frontmatter block.
pub const FRONTMATTER_DELIMITER: &str = "---";

static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"<[^>]+>").unwrap_or_else(|e| {
    log::error!("Failed to compile HTML_TAG_RE regex: {e}");
    never_matching_regex()
  })
});

/// Split raw document text into its frontmatter block and body.
///
/// The first line, trimmed, must be exactly `---`. The block is everything up
/// to the next line consisting of `---`, and the body is everything after that
/// closing line, untouched. Text without an opening delimiter, or with an
/// opener that is never closed, is returned whole as the body.
#[must_use]
pub fn split_frontmatter(text: &str) -> (Option<&str>, &str) {
  let Some((first_line, rest)) = text.split_once('\n') else {
    return (None, text);
  };

  if first_line.trim() != FRONTMATTER_DELIMITER {
    return (None, text);
  }

  let mut offset = 0;
  for line in rest.split_inclusive('\n') {
    let content = line.strip_suffix('\n').unwrap_or(line);
    let content = content.strip_suffix('\r').unwrap_or(content);

    if content == FRONTMATTER_DELIMITER {
      let block = &rest[..offset];
      let block = block.strip_suffix('\n').unwrap_or(block);
      let block = block.strip_suffix('\r').unwrap_or(block);
      let body = &rest[offset + line.len()..];
      return (Some(block), body);
    }

    offset += line.len();
  }

  debug!("Frontmatter opener without a closing delimiter, treating as body");
  (None, text)
}

/// Placeholders standing in for raw markup while a block is decoded.
///
/// Owned by a single parse call; the pairs are kept in substitution order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagMask {
  pairs: Vec<(String, String)>,
}

impl TagMask {
  /// Replace every `<...>` run in `block` with a placeholder token.
  #[must_use]
  pub fn apply(block: &str) -> (String, Self) {
    let mut pairs = Vec::new();
    let masked = HTML_TAG_RE
      .replace_all(block, |caps: &Captures| {
        let placeholder = format!("__HTML_TAG_{}__", pairs.len());
        pairs.push((placeholder.clone(), caps[0].to_string()));
        placeholder
      })
      .into_owned();

    (masked, Self { pairs })
  }

  /// The `(placeholder, original)` pairs, in the order they were created.
  #[must_use]
  pub fn pairs(&self) -> &[(String, String)] {
    &self.pairs
  }

  /// Put the original markup back into `value` and HTML-escape the result.
  #[must_use]
  pub fn restore_escaped(&self, value: &str) -> String {
    let mut restored = value.to_string();
    for (placeholder, original) in &self.pairs {
      if restored.contains(placeholder.as_str()) {
        restored = restored.replace(placeholder.as_str(), original);
      }
    }
    html_escape::encode_safe(&restored).into_owned()
  }

  fn restore_value(&self, value: &mut Value) {
    match value {
      Value::String(s) => *s = self.restore_escaped(s),
      Value::Sequence(items) => {
        for item in items {
          self.restore_value(item);
        }
      },
      Value::Mapping(map) => {
        for (_, item) in map.iter_mut() {
          self.restore_value(item);
        }
      },
      Value::Tagged(tagged) => self.restore_value(&mut tagged.value),
      Value::Null | Value::Bool(_) | Value::Number(_) => {},
    }
  }
}

/// Decoded frontmatter: an ordered mapping of keys to YAML values.
///
/// All string values have already been HTML-escaped and are safe to insert
/// into generated markup as text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
  fields: Mapping,
}

/// The optional `related` section of a document's frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Related {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub links:       Vec<String>,
}

impl Frontmatter {
  /// Raw access to the decoded value for `key`.
  #[must_use]
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.fields.get(key)
  }

  /// Scalar value for `key` rendered as a string. Mappings, sequences and
  /// nulls yield `None`.
  #[must_use]
  pub fn get_str(&self, key: &str) -> Option<String> {
    self.get(key).and_then(scalar_to_string)
  }

  #[must_use]
  pub fn title(&self) -> Option<String> {
    self.get_str("title")
  }

  #[must_use]
  pub fn description(&self) -> Option<String> {
    self.get_str("description")
  }

  /// External reference the document points at. Documents declaring one are
  /// not rendered from Markdown.
  #[must_use]
  pub fn source(&self) -> Option<String> {
    self.get_str("source")
  }

  /// The `related` block, if it is a non-empty mapping.
  #[must_use]
  pub fn related(&self) -> Option<Related> {
    let Some(Value::Mapping(related)) = self.get("related") else {
      return None;
    };
    if related.is_empty() {
      return None;
    }

    let links = match related.get("links") {
      Some(Value::Sequence(items)) => {
        items.iter().filter_map(scalar_to_string).collect()
      },
      Some(other) => scalar_to_string(other).into_iter().collect(),
      None => Vec::new(),
    };

    Some(Related {
      title: related.get("title").and_then(scalar_to_string),
      description: related.get("description").and_then(scalar_to_string),
      links,
    })
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.fields.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }
}

fn scalar_to_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Tagged(tagged) => scalar_to_string(&tagged.value),
    Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
  }
}

/// Decode a frontmatter block, reporting why it failed if it did.
///
/// # Errors
///
/// Returns an error if the block is blank, is not valid YAML, or does not
/// decode to a mapping.
pub fn try_parse_frontmatter(
  block: &str,
) -> Result<Frontmatter, FrontmatterError> {
  if block.trim().is_empty() {
    return Err(FrontmatterError::Empty);
  }

  let (masked, mask) = TagMask::apply(block);
  let mut value: Value = serde_yaml::from_str(&masked)?;
  mask.restore_value(&mut value);

  match value {
    Value::Mapping(fields) => Ok(Frontmatter { fields }),
    _ => Err(FrontmatterError::NotAMapping),
  }
}

/// Decode a frontmatter block. Any failure is reported as `None`.
#[must_use]
pub fn parse_frontmatter(block: &str) -> Option<Frontmatter> {
  try_parse_frontmatter(block)
    .inspect_err(|e| debug!("Discarding frontmatter: {e}"))
    .ok()
}

/// Metadata state of a single document.
#[derive(Debug, Clone, PartialEq)]
pub enum Metadata {
  /// No frontmatter block at all.
  Absent,
  /// A block was present but could not be decoded.
  Malformed,
  Valid(Frontmatter),
}

impl Metadata {
  #[must_use]
  pub const fn frontmatter(&self) -> Option<&Frontmatter> {
    match self {
      Self::Valid(frontmatter) => Some(frontmatter),
      Self::Absent | Self::Malformed => None,
    }
  }

  #[must_use]
  pub const fn is_valid(&self) -> bool {
    matches!(self, Self::Valid(_))
  }
}

/// Split and decode a whole document, returning its metadata and body.
///
/// Blank blocks count as absent metadata. Blocks that fail to decode are
/// logged and reported as [`Metadata::Malformed`]; the body is returned
/// either way.
#[must_use]
pub fn parse_document(text: &str) -> (Metadata, &str) {
  let (block, body) = split_frontmatter(text);

  let metadata = match block {
    None => Metadata::Absent,
    Some(block) if block.trim().is_empty() => Metadata::Absent,
    Some(block) => {
      match try_parse_frontmatter(block) {
        Ok(frontmatter) => Metadata::Valid(frontmatter),
        Err(e) => {
          warn!("Ignoring malformed frontmatter: {e}");
          Metadata::Malformed
        },
      }
    },
  };

  (metadata, body)
}
