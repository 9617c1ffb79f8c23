//! Deferred cross-reference resolution.
//!
//! While writing, every node and definition is recorded in a [`Registry`]
//! under the file it landed in. Once all files are closed, [`rewrite_all`]
//! reopens each of them and replaces the `post_process` placeholder of every
//! deferred link with the name of the file defining the token. Each file is
//! rewritten into a temporary sibling which replaces the original only when
//! the whole file went through.

use std::{
  borrow::Cow,
  fs::File,
  io::{self, BufRead, BufReader, BufWriter, Write},
  path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::{debug, error, warn};
use tempfile::NamedTempFile;

use crate::{error::HtmlError, page::file_name, xref::DEFERRED_PREFIX};

const ANCHOR_NAME: &str = "<a name=\"";

/// Extracts the link token from the text of a node or definition line.
///
/// The token is the value of an `<a name="...">` attribute, else the text
/// following a `#` up to the next `"`, else the whole text when it holds no
/// tag at all. Anything else is rejected, so decorated HTML never becomes a
/// link target.
#[must_use]
pub fn clean_token(text: &str) -> Option<&str> {
  if let Some(pos) = text.find(ANCHOR_NAME) {
    Some(quoted(&text[pos + ANCHOR_NAME.len()..]))
  } else if let Some(pos) = text.find('#') {
    Some(quoted(&text[pos + 1..]))
  } else if !text.contains(['<', '>']) {
    Some(text)
  } else {
    debug!("'{text}' was rejected as clean xref token");
    None
  }
}

/// Text up to the first `"`.
fn quoted(text: &str) -> &str {
  text.split('"').next().unwrap_or_default()
}

/// Anchor tokens defined by each output file, in registration order.
#[derive(Debug, Default, Clone)]
pub struct Registry {
  sections: IndexMap<PathBuf, Vec<String>>,
}

impl Registry {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Records the token carried by `text` as defined in `file`.
  ///
  /// Returns `false` when the text yields no usable token. Registering the
  /// same token twice for a file keeps a single entry.
  pub fn register(&mut self, file: &Path, text: &str) -> bool {
    let Some(token) = clean_token(text).filter(|token| !token.is_empty())
    else {
      return false;
    };

    let tokens = self.sections.entry(file.to_path_buf()).or_default();
    if !tokens.iter().any(|known| known == token) {
      tokens.push(token.to_string());
    }
    true
  }

  /// Tokens defined in `file`.
  #[must_use]
  pub fn find_by_file(&self, file: &Path) -> Option<&[String]> {
    self.sections.get(file).map(Vec::as_slice)
  }

  /// First file, in registration order, defining `token`.
  #[must_use]
  pub fn find_by_token(&self, token: &str) -> Option<&Path> {
    self
      .sections
      .iter()
      .find(|(_, tokens)| tokens.iter().any(|known| known == token))
      .map(|(file, _)| file.as_path())
  }

}

/// Resolves the deferred links of one line written to `file`.
///
/// Unknown tokens are left as they are and reported.
#[must_use]
pub fn rewrite_line<'l>(
  line: &'l str,
  file: &Path,
  registry: &Registry,
) -> Cow<'l, str> {
  let needle = format!("\"{DEFERRED_PREFIX}#");
  if !line.contains(&needle) {
    return Cow::Borrowed(line);
  }

  let mut result = String::with_capacity(line.len());
  let mut rest = line;

  while let Some(pos) = rest.find(&needle) {
    // keep the opening quote, `after` starts at the placeholder
    result.push_str(&rest[..=pos]);
    let after = &rest[pos + 1..];
    let target = &after[DEFERRED_PREFIX.len()..];

    let raw = quoted(&target[1..]);
    let owner = match clean_token(raw) {
      // link text went through the ampersand escaper, registered tokens not
      Some(token) => {
        let token = token.replace("&amp;", "&");
        registry.find_by_token(&token).or_else(|| {
          warn!("Didn't find xref for {token} in {}", file.display());
          None
        })
      },
      None => {
        warn!("Unusable xref token '{raw}' in {}", file.display());
        None
      },
    };

    match owner {
      None => result.push_str(DEFERRED_PREFIX),
      Some(owner) if owner == file => {},
      Some(owner) => result.push_str(&file_name(owner)),
    }

    rest = target;
  }

  result.push_str(rest);
  Cow::Owned(result)
}

/// Rewrites every deferred link of `file` in place.
///
/// The file is streamed line by line into a temporary file in the same
/// directory, which atomically replaces the original once complete. On
/// failure the temporary file is discarded and the original kept.
///
/// # Errors
///
/// Returns [`HtmlError::Rewrite`] if the file cannot be read, the temporary
/// file cannot be written, or the replacement fails.
pub fn rewrite_file(file: &Path, registry: &Registry) -> Result<(), HtmlError> {
  rewrite_into_temp(file, registry).map_err(|source| {
    HtmlError::Rewrite {
      path: file.to_path_buf(),
      source,
    }
  })
}

fn rewrite_into_temp(file: &Path, registry: &Registry) -> io::Result<()> {
  let mut reader = BufReader::new(File::open(file)?);
  let dir = file
    .parent()
    .filter(|parent| !parent.as_os_str().is_empty())
    .unwrap_or_else(|| Path::new("."));
  let mut temp = NamedTempFile::new_in(dir)?;

  {
    let mut writer = BufWriter::new(temp.as_file_mut());
    let mut line = String::new();
    while reader.read_line(&mut line)? > 0 {
      writer.write_all(rewrite_line(&line, file, registry).as_bytes())?;
      line.clear();
    }
    writer.flush()?;
  }

  temp.persist(file).map_err(|e| e.error)?;
  Ok(())
}

/// Rewrites every file in `files`, in order.
///
/// A file that fails is reported and left as written; the others are still
/// processed. Returns the number of files rewritten.
pub fn rewrite_all(files: &[PathBuf], registry: &Registry) -> usize {
  files
    .iter()
    .filter(|file| {
      match rewrite_file(file, registry) {
        Ok(()) => true,
        Err(e) => {
          error!("{e}");
          false
        },
      }
    })
    .count()
}
