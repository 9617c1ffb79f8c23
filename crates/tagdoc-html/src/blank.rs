use std::io::{self, Write};

/// Collapses runs of blank source lines into a single break marker.
///
/// Blank lines are counted and turned into `<br>`, `<p>` or `<p><br>` just
/// before the next real content. Inside `<pre>` and `<ul>` regions nothing is
/// counted, the source spacing is kept as is.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BlankRun {
  pending: usize,
  depth:   usize,
}

impl BlankRun {
  #[must_use]
  pub const fn new() -> Self {
    Self {
      pending: 0,
      depth:   0,
    }
  }

  /// Number of blank lines waiting to be flushed.
  #[must_use]
  pub const fn pending(&self) -> usize {
    self.pending
  }

  /// True inside a `<pre>` or `<ul>` region.
  #[must_use]
  pub const fn in_block(&self) -> bool {
    self.depth > 0
  }

  /// Counts one blank line.
  pub const fn note_blank(&mut self) {
    if self.depth == 0 {
      self.pending += 1;
    }
  }

  /// A definition right after a blank run widens it into a paragraph break.
  pub const fn extend_run(&mut self) {
    if self.pending > 0 && self.depth == 0 {
      self.pending += 1;
    }
  }

  /// Drops the pending run without output.
  pub const fn reset(&mut self) {
    self.pending = 0;
  }

  /// Writes the marker for the pending run, if any, and resets it.
  ///
  /// # Errors
  ///
  /// Returns any error from the underlying writer.
  pub fn flush<W: Write + ?Sized>(
    &mut self,
    out: &mut W,
    br_as_p: bool,
  ) -> io::Result<()> {
    let marker: &[u8] = match self.pending {
      0 => return Ok(()),
      1 if br_as_p => b"<p>\n",
      1 => b"<br>\n",
      _ => b"<p><br>\n",
    };
    self.pending = 0;
    out.write_all(marker)
  }

  /// True when `text` opens a `<pre>` or `<ul>` region.
  #[must_use]
  pub fn opens_block(text: &str) -> bool {
    text.contains("<pre>") || text.contains("<ul>")
  }

  /// Updates the region depth from the tags found in an emitted line.
  pub fn track(&mut self, text: &str) {
    if Self::opens_block(text) {
      self.depth += 1;
      self.pending = 0;
    } else if text.contains("</pre>") || text.contains("</ul>") {
      self.depth = self.depth.saturating_sub(1);
    }
  }
}
