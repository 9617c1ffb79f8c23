//! The single forward pass turning tagged lines into HTML files.
//!
//! [`HtmlWriter`] owns all run state: the open output file, the blank-line
//! run, the pending cross references and the registry of link targets. In
//! multi-file mode every heading after the first closes the current file and
//! opens the next numbered one. When the pass ends, [`HtmlWriter::finish`]
//! closes the last file and hands the completed registry to the
//! cross-reference rewriter.

use std::{
  fs::File,
  io::{self, BufWriter, Write},
  path::{Path, PathBuf},
};

use log::{debug, info};
use tagdoc_config::Config;

use crate::{
  blank::BlankRun,
  document::{Document, LineFlag, TaggedLine},
  error::HtmlError,
  escape::{has_markers, write_escaped, write_markers},
  page::{section_path, write_close, write_footer, write_header},
  postprocess::{Registry, rewrite_all},
  text::is_blank_html,
  toc::TocRenderer,
  xref::{LinkMode, XrefBuffer},
};

/// Converts `document` into HTML at `path`, plus numbered section files next
/// to it in multi-file mode, then resolves the deferred cross references.
///
/// Returns every file written, primary first.
///
/// # Errors
///
/// Returns an error if the configuration is invalid (nothing is written
/// then), or if an output file cannot be created or written.
pub fn write_html(
  document: &Document,
  config: &Config,
  path: &Path,
) -> Result<Vec<PathBuf>, HtmlError> {
  let mut writer = HtmlWriter::create(document, config, path)?;
  for line in &document.lines {
    writer.write_line(line)?;
  }
  writer.finish()
}

fn write_err(path: &Path) -> impl FnOnce(io::Error) -> HtmlError + '_ {
  move |source| {
    HtmlError::Write {
      path: path.to_path_buf(),
      source,
    }
  }
}

/// Output of a closed run: every file written, primary first, and the link
/// targets each of them defines.
#[derive(Debug)]
pub struct ClosedRun {
  pub files:    Vec<PathBuf>,
  pub registry: Registry,
}

/// Emission state of one run.
#[derive(Debug)]
pub struct HtmlWriter<'a> {
  document: &'a Document,
  config:   &'a Config,
  mode:     LinkMode,
  primary:  PathBuf,
  path:     PathBuf,
  out:      BufWriter<File>,
  blanks:   BlankRun,
  xrefs:    XrefBuffer,
  registry: Registry,
  section:  usize,
  written:  Vec<PathBuf>,
}

impl<'a> HtmlWriter<'a> {
  /// Validates `config`, creates the primary file and writes its header.
  ///
  /// # Errors
  ///
  /// Returns [`HtmlError::Config`] before touching the filesystem when the
  /// configuration is incomplete, [`HtmlError::Create`] when the file cannot
  /// be created.
  pub fn create(
    document: &'a Document,
    config: &'a Config,
    path: &Path,
  ) -> Result<Self, HtmlError> {
    config.validate()?;

    let out = open(path)?;
    let mut writer = Self {
      document,
      config,
      mode: LinkMode::for_multifile(config.multifile),
      primary: path.to_path_buf(),
      path: path.to_path_buf(),
      out,
      blanks: BlankRun::new(),
      xrefs: XrefBuffer::new(),
      registry: Registry::new(),
      section: 0,
      written: vec![path.to_path_buf()],
    };

    write_header(&mut writer.out, config, None)
      .map_err(write_err(&writer.path))?;
    Ok(writer)
  }

  /// Emits one line.
  ///
  /// # Errors
  ///
  /// Returns an error if the output cannot be written or, on a heading in
  /// multi-file mode, the next file cannot be created.
  pub fn write_line(&mut self, line: &TaggedLine) -> Result<(), HtmlError> {
    if line.has(LineFlag::Html) {
      if line.has(LineFlag::Heading)
        || line.has(LineFlag::Node)
        || line.has(LineFlag::Definition)
      {
        self.flush_xrefs()?;
      }

      if line.has(LineFlag::Heading) {
        self.flush_blanks()?;
        self.start_section(line)?;
      } else if line.has(LineFlag::Node) {
        self.flush_blanks()?;
        self.write_node(&line.text)?;
      } else if line.has(LineFlag::Definition) {
        self.blanks.extend_run();
        self.flush_blanks()?;
        self.write_definition(line)?;
      } else if is_structural(line) {
        writeln!(self.out, "{}", line.text).map_err(write_err(&self.path))?;
        self.blanks.note_blank();
      } else if has_markers(&line.text) {
        self.flush_blanks()?;
        write_markers(&mut self.out, &line.text)
          .and_then(|()| self.out.write_all(b"\n"))
          .map_err(write_err(&self.path))?;
      } else {
        self.flush_blanks()?;
        write_escaped(&mut self.out, &line.text)
          .map_err(write_err(&self.path))?;
        self.end_line(line)?;
      }

      self.blanks.track(&line.text);
    } else if line.has(LineFlag::Toc) {
      self.flush_xrefs()?;
      self.flush_blanks()?;
      self.write_toc(line)?;
    } else if line.has(LineFlag::Xref) {
      self.xrefs.buffer(line.text.as_str());
    }

    Ok(())
  }

  /// Ends the pass: writes what is still pending and closes the last file.
  ///
  /// Deferred links are left as placeholders; the returned registry resolves
  /// them once every output handle is released.
  ///
  /// # Errors
  ///
  /// Returns an error if the last file cannot be written.
  pub fn close(mut self) -> Result<ClosedRun, HtmlError> {
    self.flush_xrefs()?;
    self.flush_blanks()?;

    if self.config.multifile && self.section > 1 {
      write_footer(&mut self.out, self.config, &self.primary)
        .map_err(write_err(&self.path))?;
    }
    self.close_current()?;

    let Self {
      out,
      registry,
      written,
      ..
    } = self;
    drop(out);

    Ok(ClosedRun {
      files: written,
      registry,
    })
  }

  /// Closes the run, then resolves deferred links in every file written.
  ///
  /// # Errors
  ///
  /// Returns an error if the last file cannot be written. Failures while
  /// resolving links are reported and leave the affected file as written.
  pub fn finish(self) -> Result<Vec<PathBuf>, HtmlError> {
    let ClosedRun { files, registry } = self.close()?;

    let rewritten = rewrite_all(&files, &registry);
    debug!(
      "Resolved cross references in {rewritten} of {} files",
      files.len()
    );

    Ok(files)
  }

  fn flush_xrefs(&mut self) -> Result<(), HtmlError> {
    let wrote = self
      .xrefs
      .flush(&mut self.out, self.mode, self.config.css)
      .map_err(write_err(&self.path))?;
    if wrote {
      self.blanks.reset();
    }
    Ok(())
  }

  fn flush_blanks(&mut self) -> Result<(), HtmlError> {
    self
      .blanks
      .flush(&mut self.out, self.config.br_as_p)
      .map_err(write_err(&self.path))
  }

  fn end_line(&mut self, line: &TaggedLine) -> Result<(), HtmlError> {
    let block = self.blanks.in_block() || BlankRun::opens_block(&line.text);
    if !line.has(LineFlag::NoEol) && !block {
      self.out.write_all(b"<br>").map_err(write_err(&self.path))?;
    }
    self.out.write_all(b"\n").map_err(write_err(&self.path))
  }

  fn start_section(&mut self, line: &TaggedLine) -> Result<(), HtmlError> {
    let multifile = self.config.multifile;

    if multifile && self.section > 0 {
      if self.section > 1 {
        write_footer(&mut self.out, self.config, &self.primary)
          .map_err(write_err(&self.path))?;
      }
      self.close_current()?;

      let next = section_path(
        &self.primary,
        self.section - 1,
        &self.config.html_extension,
      );
      self.out = open(&next)?;
      self.written.push(next.clone());
      self.path = next;
      write_header(&mut self.out, self.config, Some(&line.text))
        .map_err(write_err(&self.path))?;
    }

    write_escaped(&mut self.out, &format!("<h1>{}</h1>\n", line.text))
      .map_err(write_err(&self.path))?;

    if multifile && !line.has(LineFlag::NoContent) && self.section > 0 {
      TocRenderer::new(
        self.document.toc_entries(),
        &self.primary,
        &self.config.html_extension,
      )
      .write_section_index(&mut self.out, self.section)
      .map_err(write_err(&self.path))?;
    }

    self.section += 1;
    Ok(())
  }

  fn write_node(&mut self, text: &str) -> Result<(), HtmlError> {
    writeln!(
      self.out,
      "<br><center><h2><a name=\"{text}\">{text}</a></h2></center><p>"
    )
    .map_err(write_err(&self.path))?;
    self.registry.register(&self.path, text);
    Ok(())
  }

  fn write_definition(&mut self, line: &TaggedLine) -> Result<(), HtmlError> {
    self.registry.register(&self.path, &line.text);

    write_escaped(&mut self.out, &format!("<b>{}</b>", line.text))
      .map_err(write_err(&self.path))?;
    if !line.has(LineFlag::Continue) {
      self.out.write_all(b"<br>").map_err(write_err(&self.path))?;
    }
    self.out.write_all(b"\n").map_err(write_err(&self.path))
  }

  fn write_toc(&mut self, line: &TaggedLine) -> Result<(), HtmlError> {
    let toc = TocRenderer::new(
      self.document.toc_entries(),
      &self.primary,
      &self.config.html_extension,
    );

    let result = if self.config.multifile {
      toc.write_root_index(&mut self.out, false)
    } else if line.has(LineFlag::ShortToc) || self.config.short_toc {
      toc.write_in_page_index(&mut self.out)
    } else {
      toc
        .write_root_index(&mut self.out, true)
        .and_then(|()| toc.write_in_page_index(&mut self.out))
    };

    result.map_err(write_err(&self.path))
  }

  fn close_current(&mut self) -> Result<(), HtmlError> {
    write_close(&mut self.out)
      .and_then(|()| self.out.flush())
      .map_err(write_err(&self.path))
  }
}

/// Lines that render as nothing: they are written untouched and count
/// towards the blank run. List items never qualify.
fn is_structural(line: &TaggedLine) -> bool {
  !line.has(LineFlag::NoEol)
    && is_blank_html(&line.text)
    && !line.text.contains("<li>")
}

fn open(path: &Path) -> Result<BufWriter<File>, HtmlError> {
  info!("writing {}", path.display());
  File::create(path).map(BufWriter::new).map_err(|source| {
    HtmlError::Create {
      path: path.to_path_buf(),
      source,
    }
  })
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]

  use std::fs;

  use super::*;

  fn config() -> Config {
    Config {
      document_title: Some("Test".to_string()),
      html_footer: Some("Back to contents".to_string()),
      ..Default::default()
    }
  }

  fn body(html: &str) -> &str {
    let start = html.find("<body").unwrap();
    let start = start + html[start..].find('\n').unwrap() + 1;
    let end = html.rfind("\n</body>").unwrap();
    html[start..end].trim_end_matches('\n')
  }

  fn render(lines: Vec<TaggedLine>, config: &Config) -> String {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.html");
    let document = Document {
      lines,
      toc: Vec::new(),
    };
    write_html(&document, config, &path).unwrap();
    body(&fs::read_to_string(&path).unwrap()).to_string()
  }

  #[test]
  fn test_invalid_config_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.html");
    let err =
      write_html(&Document::default(), &Config::default(), &path).unwrap_err();

    assert!(matches!(err, HtmlError::Config(_)));
    assert!(!path.exists());
  }

  #[test]
  fn test_create_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.html");
    let err = write_html(&Document::default(), &config(), &path).unwrap_err();
    assert!(matches!(err, HtmlError::Create { .. }));
  }

  #[test]
  fn test_single_blank_line_before_content() {
    let html = render(
      vec![
        TaggedLine::html("one"),
        TaggedLine::html(""),
        TaggedLine::html("two"),
      ],
      &config(),
    );
    assert_eq!(html, "one<br>\n\n<br>\ntwo<br>");

    let br_as_p = Config {
      br_as_p: true,
      ..config()
    };
    let html = render(
      vec![
        TaggedLine::html("one"),
        TaggedLine::html(""),
        TaggedLine::html("two"),
      ],
      &br_as_p,
    );
    assert_eq!(html, "one<br>\n\n<p>\ntwo<br>");
  }

  #[test]
  fn test_blank_run_becomes_paragraph() {
    let html = render(
      vec![
        TaggedLine::html("one"),
        TaggedLine::html(""),
        TaggedLine::html("<p>"),
        TaggedLine::html(""),
        TaggedLine::html("two"),
      ],
      &config(),
    );
    assert_eq!(html, "one<br>\n\n<p>\n\n<p><br>\ntwo<br>");
  }

  #[test]
  fn test_blank_lines_inside_pre_are_kept() {
    let html = render(
      vec![
        TaggedLine::html("<pre>"),
        TaggedLine::html("code"),
        TaggedLine::html(""),
        TaggedLine::html(""),
        TaggedLine::html("more"),
        TaggedLine::html("</pre>"),
        TaggedLine::html("after"),
      ],
      &config(),
    );
    assert_eq!(html, "<pre>\ncode\n\n\nmore\n</pre>\nafter<br>");
  }

  #[test]
  fn test_list_item_is_not_blank() {
    let html = render(
      vec![
        TaggedLine::html("<ul>"),
        TaggedLine::html("<li>"),
        TaggedLine::html("</ul>"),
        TaggedLine::html("x"),
      ],
      &config(),
    );
    assert_eq!(html, "<ul>\n<li>\n</ul>\nx<br>");
  }

  #[test]
  fn test_no_eol_line_has_no_break() {
    let html = render(
      vec![TaggedLine::html("joined").with(LineFlag::NoEol)],
      &config(),
    );
    assert_eq!(html, "joined");
  }

  #[test]
  fn test_definition_escapes_and_registers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.html");
    let document = Document::default();
    let config = config();
    let mut writer = HtmlWriter::create(&document, &config, &path).unwrap();

    writer.write_line(&TaggedLine::definition("a & b")).unwrap();
    writer
      .write_line(&TaggedLine::definition("next").with(LineFlag::Continue))
      .unwrap();
    writer
      .write_line(&TaggedLine::definition("<b>styled</b>"))
      .unwrap();

    let closed = writer.close().unwrap();
    let tokens = closed.registry.find_by_file(&path).unwrap();
    assert_eq!(tokens, ["a & b".to_string(), "next".to_string()]);
    assert_eq!(closed.files, [path.clone()]);

    let html = fs::read_to_string(&path).unwrap();
    assert!(html.contains("<b>a &amp; b</b><br>\n<b>next</b>\n"));
  }

  #[test]
  fn test_definition_after_blank_line_opens_paragraph() {
    let html = render(
      vec![
        TaggedLine::html("text"),
        TaggedLine::html(""),
        TaggedLine::definition("void f();"),
      ],
      &config(),
    );
    assert_eq!(html, "text<br>\n\n<p><br>\n<b>void f();</b><br>");
  }

  #[test]
  fn test_xref_block_swallows_pending_blanks() {
    let html = render(
      vec![
        TaggedLine::html("text"),
        TaggedLine::xref("b, a"),
        TaggedLine::html(""),
        TaggedLine::node("Next"),
      ],
      &config(),
    );
    assert_eq!(
      html,
      "text<br>\n\n\n<blockquote class=\"xref\"><em>See also:</em>\n<a \
       class=\"xref\" href=\"#b\">b</a>,\n<a class=\"xref\" \
       href=\"#a\">a</a>.</blockquote>\n<br><center><h2><a \
       name=\"Next\">Next</a></h2></center><p>"
    );
  }

  #[test]
  fn test_trailing_xrefs_are_written() {
    let html = render(
      vec![TaggedLine::html("text"), TaggedLine::xref("end")],
      &config(),
    );
    assert!(html.ends_with("href=\"#end\">end</a>.</blockquote>"));
  }

  #[test]
  fn test_marker_line_has_no_break() {
    let html = render(
      vec![
        TaggedLine::html("mail <email>a@b.c</a>"),
        TaggedLine::html("next"),
      ],
      &config(),
    );
    assert_eq!(
      html,
      "mail <a href=\"mailto:a@b.c\">a@b.c</a>\nnext<br>"
    );
  }

  #[cfg(target_os = "linux")]
  fn open_files() -> Vec<PathBuf> {
    fs::read_dir("/proc/self/fd")
      .unwrap()
      .filter_map(|entry| fs::read_link(entry.ok()?.path()).ok())
      .collect()
  }

  #[test]
  #[cfg(target_os = "linux")]
  fn test_close_releases_every_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manual.html");
    let document = Document::default();
    let config = Config {
      multifile: true,
      ..config()
    };

    let mut writer = HtmlWriter::create(&document, &config, &path).unwrap();
    for line in [
      TaggedLine::heading("Contents"),
      TaggedLine::xref("blit"),
      TaggedLine::heading("Graphics"),
      TaggedLine::node("blit"),
    ] {
      writer.write_line(&line).unwrap();
    }
    let closed = writer.close().unwrap();

    let open = open_files();
    for file in &closed.files {
      let file = fs::canonicalize(file).unwrap();
      assert!(!open.contains(&file), "{} still open", file.display());
    }

    // placeholders stay until the rewrite pass
    let primary = fs::read_to_string(&closed.files[0]).unwrap();
    assert!(primary.contains("href=\"post_process#blit\""));
    assert_eq!(
      closed.registry.find_by_token("blit"),
      Some(closed.files[1].as_path())
    );
  }

  #[test]
  fn test_lines_without_html_flag_are_skipped() {
    let html = render(
      vec![
        TaggedLine::new("ignored", enumset::EnumSet::empty()),
        TaggedLine::html("kept"),
      ],
      &config(),
    );
    assert_eq!(html, "kept<br>");
  }
}
