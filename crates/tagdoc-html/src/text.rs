use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;

// Any tag, including ones the browser would reject
static HTML_TAGS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"<[^>]*>").unwrap_or_else(|e| {
    log::error!("Failed to compile HTML_TAGS regex: {e}");
    never_matching_regex()
  })
});

#[allow(clippy::expect_used, reason = "This pattern is guaranteed to be valid")]
fn never_matching_regex() -> Regex {
  // an empty character class never matches
  Regex::new(r"[^\s\S]").expect("regex pattern [^\\s\\S] should always compile")
}

/// Removes every `<...>` tag from `text`.
#[must_use]
pub fn strip_html(text: &str) -> Cow<'_, str> {
  HTML_TAGS.replace_all(text, "")
}

/// True when `text` renders to nothing but whitespace.
#[must_use]
pub fn is_blank_html(text: &str) -> bool {
  strip_html(text).trim().is_empty()
}
