use std::{
  fs,
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::ConfigError;

/// Configuration for a single tagdoc run.
///
/// [`Config`] holds the settings the HTML writer consumes: document title,
/// footer label, character set, output extension, and the switches that
/// select multi-file output, the short table of contents, embedded CSS and
/// how a single blank line is rendered. Fields are typically loaded from a
/// TOML or JSON config file, but can also be set via `--config KEY=VALUE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Title written into the `<title>` of every generated page. Required.
  pub document_title: Option<String>,

  /// Label of the "back to contents" link closing each numbered page.
  /// Required when `multifile` is set.
  pub html_footer: Option<String>,

  /// Character set announced in the `Content-Type` meta tag.
  pub charset: String,

  /// Extension (without the dot) of every generated file.
  pub html_extension: String,

  /// Split the document into one file per heading.
  pub multifile: bool,

  /// Render only the in-page index at table-of-contents markers.
  pub short_toc: bool,

  /// Embed the cross-reference style sheet and CSS classes.
  pub css: bool,

  /// Render a single blank line as `<p>` instead of `<br>`.
  pub br_as_p: bool,

  /// Set by the source reader when the obsolete `@h=` header tag was used.
  pub legacy_head_tag: bool,

  /// Set by the source reader when the obsolete `@f=`, `@f1=` or `@f2=`
  /// footer tags were used.
  pub legacy_footer_tags: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      document_title:     None,
      html_footer:        None,
      charset:            "iso-8859-1".to_string(),
      html_extension:     "html".to_string(),
      multifile:          false,
      short_toc:          false,
      css:                true,
      br_as_p:            false,
      legacy_head_tag:    false,
      legacy_footer_tags: false,
    }
  }
}

/// The settings one config file actually sets.
///
/// Keys missing from the file stay `None` and leave the value of earlier
/// files untouched when merged with [`Config::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
  pub document_title:     Option<String>,
  pub html_footer:        Option<String>,
  pub charset:            Option<String>,
  pub html_extension:     Option<String>,
  pub multifile:          Option<bool>,
  pub short_toc:          Option<bool>,
  pub css:                Option<bool>,
  pub br_as_p:            Option<bool>,
  pub legacy_head_tag:    Option<bool>,
  pub legacy_footer_tags: Option<bool>,
}

impl ConfigLayer {
  /// Load the settings of one config file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format
  /// is unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    read_file(path.as_ref())
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    read_file(path.as_ref())
  }

  /// Load configuration from config files and overrides, merging them.
  ///
  /// Files are merged in order, later ones taking precedence, then every
  /// `KEY=VALUE` override is applied. Validation is left to the caller so
  /// the writer can report every problem before producing output.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = Self::default();

    for config_path in config_files {
      let layer = ConfigLayer::from_file(config_path).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load config from {}: {}",
          config_path.display(),
          e
        ))
      })?;
      config.merge(layer);
    }

    if config_files.len() > 1 {
      log::info!("Loaded and merged {} config files", config_files.len());
    }

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  ///
  /// # Example
  ///
  /// ```rust, ignore
  /// config.apply_overrides(&vec![
  ///     "multifile=true".to_string(),
  ///     "document_title=Allegro Manual".to_string(),
  /// ])?;
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single configuration override by key.
  ///
  /// An empty value clears the optional text settings.
  ///
  /// # Errors
  ///
  /// Returns an error for unknown keys and unparsable boolean values.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    let optional = |value: &str| {
      if value.is_empty() {
        None
      } else {
        Some(value.to_string())
      }
    };

    match key {
      "document_title" => self.document_title = optional(value),
      "html_footer" => self.html_footer = optional(value),
      "charset" => value.clone_into(&mut self.charset),
      "html_extension" => {
        value.trim_start_matches('.').clone_into(&mut self.html_extension);
      },
      "multifile" => self.multifile = parse_bool(key, value)?,
      "short_toc" => self.short_toc = parse_bool(key, value)?,
      "css" => self.css = parse_bool(key, value)?,
      "br_as_p" => self.br_as_p = parse_bool(key, value)?,
      "legacy_head_tag" => self.legacy_head_tag = parse_bool(key, value)?,
      "legacy_footer_tags" => {
        self.legacy_footer_tags = parse_bool(key, value)?;
      },
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. See documentation for \
           supported keys."
        )));
      },
    }

    Ok(())
  }

  /// Merge the settings of a later config file into this one.
  ///
  /// Only keys the layer sets replace the current values, so a later file
  /// never resets a setting it does not mention.
  pub fn merge(&mut self, layer: ConfigLayer) {
    let ConfigLayer {
      document_title,
      html_footer,
      charset,
      html_extension,
      multifile,
      short_toc,
      css,
      br_as_p,
      legacy_head_tag,
      legacy_footer_tags,
    } = layer;

    if document_title.is_some() {
      self.document_title = document_title;
    }
    if html_footer.is_some() {
      self.html_footer = html_footer;
    }
    if let Some(charset) = charset {
      self.charset = charset;
    }
    if let Some(extension) = html_extension {
      extension.trim_start_matches('.').clone_into(&mut self.html_extension);
    }
    self.multifile = multifile.unwrap_or(self.multifile);
    self.short_toc = short_toc.unwrap_or(self.short_toc);
    self.css = css.unwrap_or(self.css);
    self.br_as_p = br_as_p.unwrap_or(self.br_as_p);
    self.legacy_head_tag = legacy_head_tag.unwrap_or(self.legacy_head_tag);
    self.legacy_footer_tags =
      legacy_footer_tags.unwrap_or(self.legacy_footer_tags);
  }

  /// Check the settings required before any output may be written.
  ///
  /// Every problem is collected, each followed by the line telling the user
  /// how to fix it.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::Validation`] listing all problems found.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if self.legacy_head_tag {
      errors.push(
        "The tag '@h=<html><head><title>#</title></head><body>' is obsolete."
          .to_string(),
      );
      errors.push(
        "Please use '@document_title blah blah blah' instead.".to_string(),
      );
      errors.push(
        "And make sure you aren't using any <head>, <title> or <body> tags!"
          .to_string(),
      );
    }

    if self
      .document_title
      .as_deref()
      .is_none_or(|title| title.trim().is_empty())
    {
      errors.push("Missing tag '@document_title=blah blah blah'.".to_string());
    }

    if self.legacy_footer_tags {
      errors.push(
        "The tags '@f=blah', '@f1=blah' and '@f2=blah' are obsolete."
          .to_string(),
      );
      errors.push(
        "Please use '@html_footer=Back to contents' or something similar \
         instead."
          .to_string(),
      );
      errors.push(
        "And make sure you aren't using any <head>, <title> or <body> tags!"
          .to_string(),
      );
    }

    if self.multifile && self.html_footer.is_none() {
      errors.push(
        "For multifile documents please use '@html_footer=Back to contents'."
          .to_string(),
      );
    }

    if self.html_extension.is_empty() {
      errors.push("The output extension must not be empty.".to_string());
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(ConfigError::Validation(errors))
    }
  }

  /// The document title, or an empty string before validation.
  #[must_use]
  pub fn title(&self) -> &str {
    self.document_title.as_deref().unwrap_or_default()
  }

  /// The footer label, or an empty string when unset.
  #[must_use]
  pub fn footer(&self) -> &str {
    self.html_footer.as_deref().unwrap_or_default()
  }

  /// Write a default configuration file in the requested format.
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unknown, serialization fails or the
  /// file cannot be written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let defaults = Self {
      document_title: Some("My documentation".to_string()),
      html_footer: Some("Back to contents".to_string()),
      ..Self::default()
    };

    let config_content = match format {
      "toml" => {
        toml::to_string_pretty(&defaults)
          .map_err(|e| ConfigError::Config(e.to_string()))?
      },
      "json" => serde_json::to_string_pretty(&defaults)?,
      _ => {
        return Err(ConfigError::Config(format!(
          "Unsupported config file format: {format}"
        )));
      },
    };

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
  let content = fs::read_to_string(path).map_err(|e| {
    ConfigError::Config(format!(
      "Failed to read config file: {}: {}",
      path.display(),
      e
    ))
  })?;

  match path.extension().and_then(|ext| ext.to_str()) {
    Some(ext) => {
      match ext.to_lowercase().as_str() {
        "json" => {
          serde_json::from_str(&content).map_err(|e| {
            ConfigError::Config(format!(
              "Failed to parse JSON config from {}: {}",
              path.display(),
              e
            ))
          })
        },
        "toml" => {
          toml::from_str(&content).map_err(|e| {
            ConfigError::Config(format!(
              "Failed to parse TOML config from {}: {}",
              path.display(),
              e
            ))
          })
        },
        _ => {
          Err(ConfigError::Config(format!(
            "Unsupported config file format: {}",
            path.display()
          )))
        },
      }
    },
    None => {
      Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )))
    },
  }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  value.parse().map_err(|_| {
    ConfigError::Config(format!(
      "Invalid boolean value for '{key}': '{value}'. Expected true or false"
    ))
  })
}
