//! "See also" blocks.
//!
//! Cross-reference tokens are collected while scanning and written as one
//! sorted block right before the next heading, node, definition or table of
//! contents. In multi-file output the target file of a token is unknown at
//! that point, so links point at [`DEFERRED_PREFIX`] and are patched by
//! [`crate::postprocess`] once every file is written.

use std::io::{self, Write};

use crate::escape::write_escaped;

/// Placeholder written in place of the target filename of a deferred link.
pub const DEFERRED_PREFIX: &str = "post_process";

/// How cross-reference targets are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
  /// `#token`, the target lives in the same page.
  InPage,
  /// `post_process#token`, resolved after all files are written.
  Deferred,
}

impl LinkMode {
  #[must_use]
  pub const fn for_multifile(multifile: bool) -> Self {
    if multifile { Self::Deferred } else { Self::InPage }
  }

  fn prefix(self) -> &'static str {
    match self {
      Self::InPage => "",
      Self::Deferred => DEFERRED_PREFIX,
    }
  }
}

/// Tokens buffered since the last flush point.
#[derive(Debug, Default, Clone)]
pub struct XrefBuffer {
  tokens: Vec<String>,
}

impl XrefBuffer {
  #[must_use]
  pub const fn new() -> Self {
    Self { tokens: Vec::new() }
  }

  /// Queues a raw token; it may hold several `,` or `;` separated names.
  pub fn buffer(&mut self, token: impl Into<String>) {
    self.tokens.push(token.into());
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.tokens.is_empty()
  }

  /// Writes the buffered tokens as one sorted "See also" block and empties
  /// the buffer.
  ///
  /// Returns `false` without writing anything when the buffer is empty. The
  /// caller must drop any pending blank run when a block was written.
  ///
  /// # Errors
  ///
  /// Returns any error from the underlying writer. The buffer is emptied
  /// either way.
  pub fn flush<W: Write + ?Sized>(
    &mut self,
    out: &mut W,
    mode: LinkMode,
    css: bool,
  ) -> io::Result<bool> {
    if self.tokens.is_empty() {
      return Ok(false);
    }

    let mut tokens = std::mem::take(&mut self.tokens);
    tokens.sort_unstable();

    out.write_all(b"\n<blockquote")?;
    if css {
      out.write_all(b" class=\"xref\"")?;
    }
    out.write_all(b"><em>See also:</em>\n")?;

    let class = if css { "class=\"xref\" " } else { "" };
    let prefix = mode.prefix();
    let names = tokens
      .iter()
      .flat_map(|token| token.split([',', ';']))
      .map(str::trim)
      .filter(|name| !name.is_empty());

    for (i, name) in names.enumerate() {
      if i > 0 {
        out.write_all(b",\n")?;
      }
      write_escaped(
        out,
        &format!("<a {class}href=\"{prefix}#{name}\">{name}</a>"),
      )?;
    }

    out.write_all(b".</blockquote>\n")?;
    Ok(true)
  }
}
