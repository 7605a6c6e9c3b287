//! Detection of the base URL documentation images are served from.
//!
//! A published documentation page references its images through an image
//! proxy or CDN, e.g. `/_next/image?url=%2Fdocs%2Flight%2Fa.png&w=1920`. The
//! part before the `/docs/` segment is the base URL relative image paths in
//! the sources must be prefixed with.
use std::{collections::HashMap, sync::LazyLock, time::Duration};

use docbind_commonmark::utils::never_matching_regex;
use docbind_config::images::ImagesConfig;
use log::{debug, info, warn};
use regex::Regex;
use reqwest::{Url, blocking::Client};

use crate::error::CdnError;

static IMAGE_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"\b(?:src|srcset|srcSet)="([^"]+)""#).unwrap_or_else(|e| {
    log::error!("Failed to compile IMAGE_ATTR_RE regex: {e}");
    never_matching_regex()
  })
});

/// Segments marking where the documentation path starts in a reference.
const DOCS_MARKERS: [&str; 3] = ["/docs/", "%2Fdocs%2F", "%2fdocs%2f"];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Split an attribute value into candidate URLs. `srcset` values list
/// several candidates, each followed by a width or density descriptor.
fn candidates(value: &str) -> impl Iterator<Item = &str> {
  value
    .split(',')
    .filter_map(|candidate| candidate.split_whitespace().next())
}

/// The part of `reference` before its documentation path segment.
fn docs_prefix(reference: &str) -> Option<&str> {
  DOCS_MARKERS
    .iter()
    .filter_map(|marker| reference.find(marker))
    .min()
    .map(|index| &reference[..index])
}

/// Pick the image base URL from the HTML of `page_url`.
///
/// Every `src`/`srcset` candidate containing a `/docs/` segment (plain or
/// percent-encoded) contributes the prefix before that segment, resolved
/// against `page_url`. The most frequent prefix wins; ties go to the
/// lexicographically smallest.
///
/// # Errors
///
/// Returns an error if `page_url` is not a valid URL or no reference
/// matches.
pub fn select_base_url(page_url: &str, html: &str) -> Result<String, CdnError> {
  let page = Url::parse(page_url).map_err(|e| {
    CdnError::InvalidUrl {
      url:    page_url.to_string(),
      reason: e.to_string(),
    }
  })?;

  let mut counts: HashMap<String, usize> = HashMap::new();
  for caps in IMAGE_ATTR_RE.captures_iter(html) {
    let Some(value) = caps.get(1) else {
      continue;
    };
    let value = value.as_str().replace("&amp;", "&");
    for candidate in candidates(&value) {
      let Some(prefix) = docs_prefix(candidate) else {
        continue;
      };
      match page.join(prefix) {
        Ok(url) => *counts.entry(url.to_string()).or_default() += 1,
        Err(e) => debug!("Ignoring image reference '{candidate}': {e}"),
      }
    }
  }

  counts
    .into_iter()
    .max_by(|(a, a_count), (b, b_count)| {
      a_count.cmp(b_count).then_with(|| b.cmp(a))
    })
    .map(|(prefix, _)| prefix)
    .ok_or_else(|| CdnError::NoMatch(page_url.to_string()))
}

/// Fetch `page_url` and detect the image base URL from it.
///
/// # Errors
///
/// Returns an error if the URL is invalid, the request fails, or the page
/// has no matching image references.
pub fn detect_base_url(page_url: &str) -> Result<String, CdnError> {
  Url::parse(page_url).map_err(|e| {
    CdnError::InvalidUrl {
      url:    page_url.to_string(),
      reason: e.to_string(),
    }
  })?;

  let client = Client::builder()
    .timeout(REQUEST_TIMEOUT)
    .user_agent(concat!("docbind/", env!("CARGO_PKG_VERSION")))
    .build()?;

  debug!("Fetching {page_url} for image base URL detection");
  let html = client.get(page_url).send()?.error_for_status()?.text()?;
  select_base_url(page_url, &html)
}

/// The base URL to rewrite image references with: detected from
/// `images.detect_from` when set, otherwise `images.base_url`. Detection
/// failures fall back to `images.base_url`.
#[must_use]
pub fn resolve_base_url(images: &ImagesConfig) -> String {
  let Some(page_url) = images.detect_from.as_deref() else {
    return images.base_url.clone();
  };

  match detect_base_url(page_url) {
    Ok(base_url) => {
      info!("Detected image base URL: {base_url}");
      base_url
    },
    Err(e) => {
      warn!(
        "Image base URL detection failed ({e}), using {}",
        images.base_url
      );
      images.base_url.clone()
    },
  }
}
