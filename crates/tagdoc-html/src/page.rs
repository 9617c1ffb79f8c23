//! Per-file page frame: header, footer, closing tags and the names of the
//! numbered section files.

use std::{
  io::{self, Write},
  path::{Path, PathBuf},
};

use tagdoc_config::Config;

use crate::text::strip_html;

const DOCTYPE: &str = "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.0 \
                       Transitional//EN\" \
                       \"http://www.w3.org/TR/REC-html40/loose.dtd\">\n";

const STYLE_SHEET: &str = "<meta http-equiv=\"Content-Style-Type\" \
                           content=\"text/css\">
<style type=\"text/css\">
<!--
A.xref:link    {color: blue; text-decoration: none; background: rgb(255, 204, 50);}
A.xref:visited {color: blue; text-decoration: none; background: rgb(255, 204, 50);}
A.xref:hover   {color: blue; text-decoration: underline; background: rgb(255, 224, 150);}
A.xref:active  {color: red; text-decoration: none; background: rgb(255, 204, 50);}
blockquote.xref {border: medium solid rgb(255, 204, 51); color: black; background: rgb(255, 204, 50);}
blockquote.code {border: medium solid rgb(255, 204, 50); color: black; background: rgb(255, 255, 155);}
blockquote.text {border: medium solid rgb(175, 235, 255); color: black; background: rgb(210, 244, 255);}
-->
</style>
";

const BODY: &str = "</head><body bgcolor=\"#ffffff\" text=\"#000000\" \
                    link=\"#0000ee\" alink=\"#ff0000\" vlink=\"#551a8b\">\n";

/// Maximum number of stem characters kept in a numbered file name.
const STEM_PREFIX_LEN: usize = 5;

/// Writes the document head and opens the body.
///
/// `section` is the heading text of a numbered page; its tag-stripped form is
/// appended to the document title.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_header<W: Write + ?Sized>(
  out: &mut W,
  config: &Config,
  section: Option<&str>,
) -> io::Result<()> {
  out.write_all(DOCTYPE.as_bytes())?;
  out.write_all(b"<html><head><title>\n")?;
  out.write_all(config.title().as_bytes())?;
  if let Some(section) = section {
    let section = strip_html(section);
    if !section.is_empty() {
      write!(out, ": {section}")?;
    }
  }
  out.write_all(b"\n</title>\n")?;
  writeln!(
    out,
    "<meta http-equiv=\"Content-Type\" content=\"text/html; charset={}\">",
    config.charset
  )?;

  if config.css {
    out.write_all(STYLE_SHEET.as_bytes())?;
  }

  out.write_all(BODY.as_bytes())
}

/// Writes the "back to contents" link pointing at the primary file.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_footer<W: Write + ?Sized>(
  out: &mut W,
  config: &Config,
  primary: &Path,
) -> io::Result<()> {
  writeln!(
    out,
    "<hr><a href=\"{}\">{}</a>",
    file_name(primary),
    config.footer()
  )
}

/// Closes the body and the document.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_close<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
  out.write_all(b"\n</body>\n</html>\n")
}

/// Path of the numbered file holding section `index`.
///
/// The stem of `primary` is cut to its first five characters and followed by
/// the zero-padded index and `extension`: `allegro.html` becomes
/// `alleg000.html`.
#[must_use]
pub fn section_path(primary: &Path, index: usize, extension: &str) -> PathBuf {
  let name = file_name(primary);
  let stem = name.rfind('.').map_or(name.as_str(), |dot| &name[..dot]);
  let stem: String = stem.chars().take(STEM_PREFIX_LEN).collect();
  primary.with_file_name(format!("{stem}{index:03}.{extension}"))
}

/// Base name of `path`, as used in links between output files.
#[must_use]
pub fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]

  use super::*;

  fn config() -> Config {
    Config {
      document_title: Some("Allegro Manual".to_string()),
      html_footer: Some("Back to contents".to_string()),
      ..Default::default()
    }
  }

  #[test]
  fn test_section_path_truncates_stem() {
    let primary = Path::new("docs/allegro.html");
    assert_eq!(
      section_path(primary, 0, "html"),
      PathBuf::from("docs/alleg000.html")
    );
    assert_eq!(
      section_path(primary, 12, "htm"),
      PathBuf::from("docs/alleg012.htm")
    );
  }

  #[test]
  fn test_section_path_short_stem() {
    assert_eq!(
      section_path(Path::new("doc.html"), 1, "html"),
      PathBuf::from("doc001.html")
    );
    assert_eq!(
      section_path(Path::new("readme"), 2, "html"),
      PathBuf::from("readm002.html")
    );
  }

  #[test]
  fn test_header_with_css() {
    let mut out = Vec::new();
    write_header(&mut out, &config(), Some("<b>Intro</b>")).unwrap();
    let html = String::from_utf8(out).unwrap();

    assert!(html.starts_with("<!DOCTYPE HTML PUBLIC"));
    assert!(html.contains("<title>\nAllegro Manual: Intro\n</title>"));
    assert!(html.contains("charset=iso-8859-1\">"));
    assert!(html.contains("blockquote.xref"));
    assert!(html.ends_with("vlink=\"#551a8b\">\n"));
  }

  #[test]
  fn test_header_without_css_or_section() {
    let config = Config {
      css: false,
      charset: "utf-8".to_string(),
      ..config()
    };
    let mut out = Vec::new();
    write_header(&mut out, &config, Some("<hr>")).unwrap();
    let html = String::from_utf8(out).unwrap();

    assert!(html.contains("<title>\nAllegro Manual\n</title>"));
    assert!(html.contains("charset=utf-8"));
    assert!(!html.contains("<style"));
  }

  #[test]
  fn test_footer_links_primary_file_name() {
    let mut out = Vec::new();
    write_footer(&mut out, &config(), Path::new("out/allegro.html")).unwrap();
    assert_eq!(
      String::from_utf8(out).unwrap(),
      "<hr><a href=\"allegro.html\">Back to contents</a>\n"
    );
  }
}
