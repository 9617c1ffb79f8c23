use std::{fs, path::Path};

use log::debug;
use tagdoc_html::Document;

use crate::error::InputError;

/// Loads a pre-parsed document, picking the format from the file extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is neither `.json` nor
/// `.toml`, or does not describe a document.
pub fn load_document(path: &Path) -> Result<Document, InputError> {
  let format = path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(str::to_lowercase);

  let content = || {
    fs::read_to_string(path).map_err(|source| {
      InputError::Read {
        path: path.to_path_buf(),
        source,
      }
    })
  };

  let document: Document = match format.as_deref() {
    Some("json") => {
      serde_json::from_str(&content()?).map_err(|source| {
        InputError::Json {
          path: path.to_path_buf(),
          source,
        }
      })?
    },
    Some("toml") => {
      toml::from_str(&content()?).map_err(|source| {
        InputError::Toml {
          path: path.to_path_buf(),
          source,
        }
      })?
    },
    _ => return Err(InputError::Unsupported(path.to_path_buf())),
  };

  debug!(
    "Loaded {} lines and {} TOC entries from {}",
    document.lines.len(),
    document.toc.len(),
    path.display()
  );
  Ok(document)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]

  use std::fs;

  use tagdoc_html::{LineFlag, TaggedLine};

  use super::*;

  #[test]
  fn test_load_toml_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.toml");
    fs::write(
      &path,
      r#"
[[lines]]
text  = "Intro"
flags = ["html", "heading"]

[[lines]]
text  = "short"
flags = ["toc", "short_toc"]

[[toc]]
text = ""
htmlable = false

[[toc]]
text = "Intro"
root = true
"#,
    )
    .unwrap();

    let document = load_document(&path).unwrap();
    assert_eq!(document.lines[0], TaggedLine::heading("Intro"));
    assert!(document.lines[1].has(LineFlag::ShortToc));
    assert_eq!(document.toc_entries().len(), 1);
  }

  #[test]
  fn test_load_json_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.JSON");
    fs::write(&path, r#"{"lines": [{"text": "hi", "flags": ["html"]}]}"#)
      .unwrap();

    let document = load_document(&path).unwrap();
    assert_eq!(document.lines, [TaggedLine::html("hi")]);
    assert!(document.toc.is_empty());
  }

  #[test]
  fn test_unsupported_extension() {
    let err = load_document(Path::new("doc._tx")).unwrap_err();
    assert!(matches!(err, InputError::Unsupported(_)));
  }

  #[test]
  fn test_parse_error_names_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"lines\": [{\"flags\": [\"bogus\"]}]}").unwrap();

    let err = load_document(&path).unwrap_err();
    assert!(matches!(err, InputError::Json { .. }));
    assert!(err.to_string().contains("broken.json"));
  }
}
