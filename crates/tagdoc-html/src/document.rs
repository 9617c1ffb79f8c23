//! The pre-parsed document consumed by the HTML writer.
//!
//! A [`Document`] is a flat sequence of [`TaggedLine`]s, each carrying the
//! raw text of one source line and the set of [`LineFlag`]s the source reader
//! attached to it, plus the table of contents collected while reading.

use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

/// Role of a tagged line. Flags are not exclusive: a definition may also
/// continue the previous line, a heading may suppress its section index.
#[derive(Debug, EnumSetType, Serialize, Deserialize)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "snake_case")]
pub enum LineFlag {
  /// The line produces HTML output.
  Html,
  /// Chapter heading; starts a new section (and file in multi-file mode).
  Heading,
  /// Named anchor point usable as a cross-reference target.
  Node,
  /// Documented symbol, emitted in bold and registered as a target.
  Definition,
  /// Table-of-contents marker.
  Toc,
  /// Render only the short in-page index at this marker.
  ShortToc,
  /// "See also" token, buffered until the next structural boundary.
  Xref,
  /// The line continues the previous one; no line break after it.
  Continue,
  /// The source line had no end-of-line; never counts as blank.
  NoEol,
  /// Do not generate a section table of contents under this heading.
  NoContent,
}

/// One line of input text and its semantic flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedLine {
  pub text:  String,
  #[serde(default)]
  pub flags: EnumSet<LineFlag>,
}

impl TaggedLine {
  pub fn new(text: impl Into<String>, flags: EnumSet<LineFlag>) -> Self {
    Self {
      text: text.into(),
      flags,
    }
  }

  /// Plain content line.
  pub fn html(text: impl Into<String>) -> Self {
    Self::new(text, LineFlag::Html.into())
  }

  pub fn heading(text: impl Into<String>) -> Self {
    Self::new(text, LineFlag::Html | LineFlag::Heading)
  }

  pub fn node(text: impl Into<String>) -> Self {
    Self::new(text, LineFlag::Html | LineFlag::Node)
  }

  pub fn definition(text: impl Into<String>) -> Self {
    Self::new(text, LineFlag::Html | LineFlag::Definition)
  }

  pub fn xref(text: impl Into<String>) -> Self {
    Self::new(text, LineFlag::Xref.into())
  }

  pub fn toc() -> Self {
    Self::new("", LineFlag::Toc.into())
  }

  /// Adds `flag` to the line.
  #[must_use]
  pub fn with(mut self, flag: LineFlag) -> Self {
    self.flags |= flag;
    self
  }

  #[must_use]
  pub fn has(&self, flag: LineFlag) -> bool {
    self.flags.contains(flag)
  }
}

/// Entry of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
  /// Primary text, also used as the anchor name.
  pub text:       String,
  /// Text displayed instead of `text` when present.
  #[serde(default)]
  pub alt:        Option<String>,
  /// Chapter-level entry.
  #[serde(default)]
  pub root:       bool,
  /// The entry is a separate document named after its text.
  #[serde(default)]
  pub other_file: bool,
  #[serde(default = "default_htmlable")]
  pub htmlable:   bool,
}

const fn default_htmlable() -> bool {
  true
}

impl TocEntry {
  /// Chapter-level entry.
  pub fn root(text: impl Into<String>) -> Self {
    Self {
      root: true,
      ..Self::child(text)
    }
  }

  /// Entry nested below the previous chapter.
  pub fn child(text: impl Into<String>) -> Self {
    Self {
      text:       text.into(),
      alt:        None,
      root:       false,
      other_file: false,
      htmlable:   true,
    }
  }

  /// Leading placeholder every table of contents starts with.
  #[must_use]
  pub fn sentinel() -> Self {
    Self {
      htmlable: false,
      ..Self::child("")
    }
  }

  #[must_use]
  pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
    self.alt = Some(alt.into());
    self
  }

  #[must_use]
  pub const fn in_other_file(mut self) -> Self {
    self.other_file = true;
    self
  }

  /// Text shown for the entry.
  #[must_use]
  pub fn display(&self) -> &str {
    self.alt.as_deref().unwrap_or(&self.text)
  }
}

/// A whole pre-parsed document. The first TOC entry is a sentinel and is
/// never rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  #[serde(default)]
  pub lines: Vec<TaggedLine>,
  #[serde(default)]
  pub toc:   Vec<TocEntry>,
}

impl Document {
  /// Real TOC entries, sentinel skipped.
  pub fn toc_entries(&self) -> &[TocEntry] {
    self.toc.get(1..).unwrap_or_default()
  }
}
