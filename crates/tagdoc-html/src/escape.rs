//! Inline marker expansion.
//!
//! Source lines are already HTML, so only two things are rewritten on the way
//! out: stray ampersands, and the `<email>` / `<link>` shorthand markers.
//! Everything is streamed to the output; lines have no length limit.

use std::io::{self, Write};

const EMAIL_MARKER: &str = "<email>";
const LINK_MARKER: &str = "<link>";

/// Writes `text` with every `&` that does not start `&lt` or `&gt` turned
/// into `&amp;`.
///
/// `&lt` and `&gt` are completed to `&lt;` and `&gt;`; a `;` already present
/// is kept once. An `&` followed by `l` or `g` that is not one of those two
/// entities is written unchanged.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_escaped<W: Write + ?Sized>(
  out: &mut W,
  text: &str,
) -> io::Result<()> {
  let mut rest = text;

  while let Some(pos) = rest.find('&') {
    out.write_all(rest[..pos].as_bytes())?;
    let tail = &rest[pos..];

    rest = match tail.as_bytes() {
      [_, kind @ (b'l' | b'g'), b't', more @ ..] => {
        out.write_all(if *kind == b'l' { b"&lt;" } else { b"&gt;" })?;
        if more.first() == Some(&b';') {
          &tail[4..]
        } else {
          &tail[3..]
        }
      },
      [_, b'l' | b'g', ..] => {
        out.write_all(b"&")?;
        &tail[1..]
      },
      _ => {
        out.write_all(b"&amp;")?;
        &tail[1..]
      },
    };
  }

  out.write_all(rest.as_bytes())
}

/// True when the line holds an `<email>` or `<link>` marker.
#[must_use]
pub fn has_markers(text: &str) -> bool {
  text.contains(EMAIL_MARKER) || text.contains(LINK_MARKER)
}

/// Writes `text` expanding every `<email>` and `<link>` marker, left to
/// right, into an anchor whose target and label are the text following the
/// marker up to the next tag. The rest of the line is escaped as by
/// [`write_escaped`].
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_markers<W: Write + ?Sized>(
  out: &mut W,
  text: &str,
) -> io::Result<()> {
  let mut rest = text;

  while let Some((pos, is_email)) = next_marker(rest) {
    write_escaped(out, &rest[..pos])?;

    let after = &rest[pos..];
    let after = after.find('>').map_or("", |end| &after[end + 1..]);
    let label_end = after.find('<').unwrap_or(after.len());
    let label = &after[..label_end];

    let anchor = if is_email {
      format!("<a href=\"mailto:{label}\">{label}")
    } else {
      format!("<a href=\"{label}\">{label}")
    };
    write_escaped(out, &anchor)?;

    rest = &after[label_end..];
  }

  write_escaped(out, rest)
}

/// Position of the first marker in `text` and whether it is an email one.
fn next_marker(text: &str) -> Option<(usize, bool)> {
  match (text.find(EMAIL_MARKER), text.find(LINK_MARKER)) {
    (Some(email), Some(link)) if link < email => Some((link, false)),
    (Some(email), _) => Some((email, true)),
    (None, Some(link)) => Some((link, false)),
    (None, None) => None,
  }
}
