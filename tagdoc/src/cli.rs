use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for tagdoc
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "tagdoc: tagged documentation to HTML"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Later files override earlier ones.
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the tagdoc CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new tagdoc configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "tagdoc.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Write a tagged document as HTML.
  Html {
    /// Pre-parsed document (JSON or TOML).
    input: PathBuf,

    /// Primary output file. Numbered section files are written next to it
    /// in multi-file mode.
    #[arg(short, long)]
    output: PathBuf,
  },
}

impl Cli {
  /// Parse command line arguments
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
