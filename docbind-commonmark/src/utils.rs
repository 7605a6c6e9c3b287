//! Small text helpers shared by the transform passes.

/// Create a regex that never matches anything.
///
/// Used as a fallback when a static pattern fails to compile, so a broken
/// pattern degrades to "no match" instead of a panic.
///
/// # Panics
///
/// Panics if the fallback regex pattern `r"^\b$"` fails to compile, which
/// should never happen.
#[must_use]
pub fn never_matching_regex() -> regex::Regex {
  // Asserts something impossible, so this pattern is always valid
  regex::Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(clippy::unwrap_used, reason = "Literal pattern is valid")]
    regex::Regex::new(r"^\b$").unwrap()
  })
}

/// Title-case a file stem the way the TOC falls back to it when a document
/// has no `title`: the first letter of every alphabetic run is uppercased and
/// the rest lowercased, so `getting-started` becomes `Getting-Started`.
#[must_use]
pub fn title_case(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut prev_alpha = false;
  for c in text.chars() {
    if c.is_alphabetic() {
      if prev_alpha {
        out.extend(c.to_lowercase());
      } else {
        out.extend(c.to_uppercase());
      }
      prev_alpha = true;
    } else {
      out.push(c);
      prev_alpha = false;
    }
  }
  out
}

/// Opening fence of a code block, as seen by [`FenceTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
  /// Columns of indentation before the fence characters.
  pub indent: usize,
  /// First word of the info string, if any.
  pub language: Option<String>,
}

/// State tracking for code fence detection in markdown.
///
/// Tracks whether we're inside a fenced code block and the fence character
/// and count needed to close it. Feed it one line at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceTracker {
  in_code_block:    bool,
  code_fence_char:  Option<char>,
  code_fence_count: usize,
}

impl FenceTracker {
  #[must_use]
  pub const fn new() -> Self {
    Self {
      in_code_block:    false,
      code_fence_char:  None,
      code_fence_count: 0,
    }
  }

  #[must_use]
  pub const fn in_code_block(&self) -> bool {
    self.in_code_block
  }

  /// Process a line and return the updated state.
  ///
  /// A closing fence must use the opening character, be at least as long as
  /// the opener and carry no info string.
  #[must_use]
  pub fn process_line(&self, line: &str) -> Self {
    let Some((fence_char, fence_count, rest)) = parse_fence(line) else {
      return *self;
    };

    if !self.in_code_block {
      // Backtick info strings may not contain backticks
      if fence_char == '`' && rest.contains('`') {
        return *self;
      }
      return Self {
        in_code_block:    true,
        code_fence_char:  Some(fence_char),
        code_fence_count: fence_count,
      };
    }

    if self.code_fence_char == Some(fence_char)
      && fence_count >= self.code_fence_count
      && rest.trim().is_empty()
    {
      return Self::new();
    }

    *self
  }
}

/// Describe the fence that `line` opens. Returns `None` for non-fence lines.
#[must_use]
pub fn opening_fence(line: &str) -> Option<Fence> {
  let (_, _, rest) = parse_fence(line)?;
  let indent = line.len() - line.trim_start_matches(' ').len();
  let language = rest
    .split_whitespace()
    .next()
    .map(ToString::to_string);
  Some(Fence { indent, language })
}

fn parse_fence(line: &str) -> Option<(char, usize, &str)> {
  let line = line.trim_end_matches(['\n', '\r']);
  let trimmed = line.trim_start_matches(' ');
  // More than three spaces of indentation is an indented code block
  if line.len() - trimmed.len() > 3 {
    return None;
  }

  let fence_char = trimmed.chars().next()?;
  if fence_char != '`' && fence_char != '~' {
    return None;
  }

  let fence_count = trimmed.chars().take_while(|&c| c == fence_char).count();
  if fence_count < 3 {
    return None;
  }

  Some((fence_char, fence_count, &trimmed[fence_count..]))
}
