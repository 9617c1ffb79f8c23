use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, info};
use tagdoc::{
  cli::{Cli, Commands},
  input::load_document,
};
use tagdoc_config::Config;
use tagdoc_html::write_html;

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match &cli.command {
    Commands::Init {
      output,
      format,
      force,
    } => init_config(output, format, *force),

    Commands::Html { input, output } => {
      let config = Config::load(&cli.config_files, &cli.config_overrides)?;
      generate_html(&config, input, output)
    },
  }
}

/// Writes a default configuration file.
fn init_config(output: &Path, format: &str, force: bool) -> Result<()> {
  // Check if file already exists and that we're not forcing overwrite
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }

  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
    info!("Created directory: {}", parent.display());
  }

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!(
      "Failed to generate configuration file: {}",
      output.display()
    )
  })?;

  info!("Configuration file created successfully. Edit it to set the title.");
  Ok(())
}

/// Loads the document and writes it as HTML.
fn generate_html(config: &Config, input: &Path, output: &Path) -> Result<()> {
  let document = load_document(input)?;

  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create output directory: {}", parent.display())
    })?;
  }

  let files = write_html(&document, config, output)
    .wrap_err_with(|| format!("Failed to write {}", output.display()))?;

  info!(
    "Wrote {} file{} from {}",
    files.len(),
    if files.len() == 1 { "" } else { "s" },
    input.display()
  );
  Ok(())
}
