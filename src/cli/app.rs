//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_yaml::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use crate::access::ConfigHandler;
use crate::storage::{ConfigStore, StoreConfig};

#[derive(Parser)]
#[command(name = "xconfig")]
#[command(author, version, about = "Inspect and edit cached plugin configuration files")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Plugin data folder holding the resources
    #[arg(long, short = 'd', global = true, env = "XCONFIG_DATA_ROOT")]
    pub data_root: Option<PathBuf>,

    /// Directory of bundled templates
    #[arg(long, short = 't', global = true, env = "XCONFIG_TEMPLATES")]
    pub templates: Option<PathBuf>,

    /// Store settings file (TOML)
    #[arg(long, short = 'c', global = true, env = "XCONFIG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Identifies a resource on the command line
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// File name, e.g. config.yml
    pub file: String,

    /// Subfolder of the data root (empty for the root itself)
    #[arg(long, default_value = "")]
    pub folder: String,

    /// Create the file empty instead of from a template
    #[arg(long)]
    pub custom: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the resource if it doesn't exist yet
    Init {
        #[command(flatten)]
        target: Target,
    },

    /// Print the text at a path
    Get {
        #[command(flatten)]
        target: Target,

        /// Path inside the document, e.g. messages.join
        path: String,

        /// Value printed when the path is missing
        #[arg(long)]
        default: Option<String>,

        /// Translate color codes
        #[arg(long)]
        colorize: bool,
    },

    /// Set a value and save the resource
    Set {
        #[command(flatten)]
        target: Target,

        /// Path inside the document
        path: String,

        /// Value, parsed as a YAML scalar (`20`, `true`, `hello`)
        value: String,
    },

    /// Remove a path and save the resource
    Unset {
        #[command(flatten)]
        target: Target,

        /// Path inside the document
        path: String,
    },

    /// List the keys of the document or of one section
    Keys {
        #[command(flatten)]
        target: Target,

        /// Section to list instead of the top level
        #[arg(long)]
        section: Option<String>,
    },

    /// Print the whole document
    Show {
        #[command(flatten)]
        target: Target,
    },

    /// Delete the resource file
    Delete {
        #[command(flatten)]
        target: Target,
    },
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "xconfig=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Resolves store settings: config file, then command-line overrides
fn settings(cli: &Cli) -> Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load_file(path)?,
        None => {
            let root = cli.data_root.clone().unwrap_or_else(|| PathBuf::from("."));
            StoreConfig::discover(&root)?
        }
    };

    if let Some(root) = &cli.data_root {
        config.data_root = root.clone();
    }
    if let Some(templates) = &cli.templates {
        config.templates = Some(templates.clone());
    }

    config.validate().context("Invalid store settings")?;
    Ok(config)
}

fn open(store: &mut ConfigStore, target: &Target) -> Result<()> {
    anyhow::ensure!(!target.file.is_empty(), "The file name is empty");
    store
        .build(&target.folder, &target.file, target.custom)
        .with_context(|| format!("Failed to open {}", display_name(target)))?;
    Ok(())
}

fn require_path(path: &str) -> Result<()> {
    anyhow::ensure!(!path.is_empty(), "The path is empty");
    Ok(())
}

fn display_name(target: &Target) -> String {
    if target.folder.is_empty() {
        target.file.clone()
    } else {
        format!("{}/{}", target.folder, target.file)
    }
}

/// Reads a command-line value the way YAML would. Anything that isn't a
/// plain scalar (anchors, tags, collections) is kept as literal text.
fn parse_value(raw: &str) -> Result<Value> {
    match serde_yaml::from_str::<Value>(raw) {
        Ok(Value::Null) if matches!(raw.trim(), "" | "~" | "null" | "Null" | "NULL") => {
            anyhow::bail!("Refusing to write a null value; use 'unset' to remove a path")
        }
        Ok(scalar @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => Ok(scalar),
        _ => Ok(Value::String(raw.to_string())),
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = Output::new(cli.format);
    let config = settings(&cli)?;
    debug!(data_root = %config.data_root.display(), "xconfig starting");

    let mut store = config.open_store();

    match cli.command {
        Commands::Init { target } => {
            anyhow::ensure!(!target.file.is_empty(), "The file name is empty");
            let how = store
                .build(&target.folder, &target.file, target.custom)
                .with_context(|| format!("Failed to create {}", display_name(&target)))?;
            let path = store
                .path(&target.folder, &target.file)
                .map(|p| p.display().to_string())
                .unwrap_or_default();

            if output.is_json() {
                output.data(&serde_json::json!({
                    "file": display_name(&target),
                    "path": path,
                    "materialized": how.as_str(),
                }));
            } else {
                output.success(&format!("Ready: {}", path));
            }
        }

        Commands::Get { target, path, default, colorize } => {
            require_path(&path)?;
            open(&mut store, &target)?;
            let handler = ConfigHandler::new(&store);
            let colorize = colorize || config.colorize;

            let value = match default {
                Some(default) => Some(handler.text_or(&target.folder, &target.file, &path, &default, colorize)),
                None => handler.text(&target.folder, &target.file, &path, colorize),
            };
            let value = value.with_context(|| format!("No value at '{}' in {}", path, display_name(&target)))?;

            if output.is_json() {
                output.data(&serde_json::json!({
                    "file": display_name(&target),
                    "path": path,
                    "value": value,
                }));
            } else {
                println!("{}", value);
            }
        }

        Commands::Set { target, path, value } => {
            require_path(&path)?;
            open(&mut store, &target)?;
            let value = parse_value(&value)?;
            store.write(&target.folder, &target.file, &path, value)?;
            store.save(&target.folder, &target.file)?;
            output.success(&format!("Set '{}' in {}", path, display_name(&target)));
        }

        Commands::Unset { target, path } => {
            require_path(&path)?;
            open(&mut store, &target)?;
            let removed = store.unset(&target.folder, &target.file, &path)?;
            if removed {
                store.save(&target.folder, &target.file)?;
                output.success(&format!("Removed '{}' from {}", path, display_name(&target)));
            } else {
                output.success(&format!("Nothing at '{}' in {}", path, display_name(&target)));
            }
        }

        Commands::Keys { target, section } => {
            open(&mut store, &target)?;
            if let Some(section) = &section {
                require_path(section)?;
            }
            let keys = match &section {
                Some(section) => ConfigHandler::new(&store).section_keys(&target.folder, &target.file, section),
                None => store
                    .get(&target.folder, &target.file)
                    .map(|doc| doc.keys())
                    .unwrap_or_default(),
            };

            if output.is_json() {
                output.data(&keys);
            } else {
                for key in &keys {
                    output.line(key);
                }
            }
        }

        Commands::Show { target } => {
            open(&mut store, &target)?;
            let document = store
                .get(&target.folder, &target.file)
                .with_context(|| format!("{} is not loaded", display_name(&target)))?;

            if output.is_json() {
                output.data(document.as_mapping());
            } else {
                print!("{}", document.to_yaml()?);
            }
        }

        Commands::Delete { target } => {
            open(&mut store, &target)?;
            store.delete(&target.folder, &target.file)?;
            output.success(&format!("Deleted {}", display_name(&target)));
        }
    }

    debug!("command completed");
    Ok(())
}
