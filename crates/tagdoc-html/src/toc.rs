//! Table of contents rendering.
//!
//! Three views of the same entry list are produced:
//!
//! - the root index, one link per chapter, pointing into the page or at the
//!   numbered section files
//! - the in-page index, chapters with their sorted children nested below
//! - the section index, the sorted children of a single chapter, written
//!   under that chapter's heading in multi-file output

use std::{
  io::{self, Write},
  path::Path,
};

use crate::{
  document::TocEntry,
  escape::write_escaped,
  page::{file_name, section_path},
};

/// Renders table-of-contents lists for one run.
#[derive(Debug, Clone, Copy)]
pub struct TocRenderer<'a> {
  entries:   &'a [TocEntry],
  primary:   &'a Path,
  extension: &'a str,
}

impl<'a> TocRenderer<'a> {
  /// `entries` must not include the leading sentinel.
  #[must_use]
  pub const fn new(
    entries: &'a [TocEntry],
    primary: &'a Path,
    extension: &'a str,
  ) -> Self {
    Self {
      entries,
      primary,
      extension,
    }
  }

  /// Writes one link per chapter.
  ///
  /// Chapters living in another document link to that document, named after
  /// the lower-cased entry text. The others link to `#text` when `in_page`
  /// is set, otherwise to their numbered section file.
  ///
  /// # Errors
  ///
  /// Returns any error from the underlying writer.
  pub fn write_root_index<W: Write + ?Sized>(
    &self,
    out: &mut W,
    in_page: bool,
  ) -> io::Result<()> {
    let mut section = 0;

    out.write_all(b"<ul>\n")?;

    for entry in self.entries.iter().filter(|e| e.root && e.htmlable) {
      let href = if entry.other_file {
        format!("{}.{}", entry.text, self.extension).to_lowercase()
      } else if in_page {
        section += 1;
        format!("#{}", entry.text)
      } else {
        let path = section_path(self.primary, section, self.extension);
        section += 1;
        file_name(&path)
      };
      write_link(out, &href, entry.display())?;
    }

    out.write_all(b"</ul>\n")
  }

  /// Writes every chapter of this document with its children nested below
  /// it, children sorted case-insensitively.
  ///
  /// # Errors
  ///
  /// Returns any error from the underlying writer.
  pub fn write_in_page_index<W: Write + ?Sized>(
    &self,
    out: &mut W,
  ) -> io::Result<()> {
    let mut nested: Option<Vec<&TocEntry>> = None;

    out.write_all(b"<ul>\n")?;

    for entry in self.entries.iter().filter(|e| e.htmlable && !e.other_file) {
      if entry.root {
        if let Some(children) = nested.take() {
          write_sorted(out, children)?;
          out.write_all(b"</ul>\n")?;
        }
        write_link(out, &format!("#{}", entry.text), entry.display())?;
      } else if let Some(children) = nested.as_mut() {
        children.push(entry);
      } else {
        out.write_all(b"<ul>\n")?;
        nested = Some(vec![entry]);
      }
    }

    if let Some(children) = nested {
      write_sorted(out, children)?;
      out.write_all(b"</ul>\n")?;
    }

    out.write_all(b"</ul>\n")
  }

  /// Writes the sorted children of chapter number `part` (1-based, chapters
  /// in other documents not counted).
  ///
  /// # Errors
  ///
  /// Returns any error from the underlying writer.
  pub fn write_section_index<W: Write + ?Sized>(
    &self,
    out: &mut W,
    part: usize,
  ) -> io::Result<()> {
    out.write_all(b"\n<ul>\n")?;

    let mut passed = 0;
    let start = self
      .entries
      .iter()
      .position(|entry| {
        if passed == part {
          return true;
        }
        if entry.root && !entry.other_file {
          passed += 1;
        }
        false
      })
      .unwrap_or(self.entries.len());

    let children = self.entries[start..]
      .iter()
      .take_while(|entry| !entry.root)
      .filter(|entry| entry.htmlable)
      .collect();
    write_sorted(out, children)?;

    out.write_all(b"</ul>\n")
  }
}

fn write_link<W: Write + ?Sized>(
  out: &mut W,
  href: &str,
  text: &str,
) -> io::Result<()> {
  write_escaped(out, &format!("<li><a href=\"{href}\">{text}</a>\n"))
}

fn write_sorted<W: Write + ?Sized>(
  out: &mut W,
  mut entries: Vec<&TocEntry>,
) -> io::Result<()> {
  entries.sort_by_cached_key(|entry| entry.text.to_lowercase());
  for entry in entries {
    write_link(out, &format!("#{}", entry.text), entry.display())?;
  }
  Ok(())
}
