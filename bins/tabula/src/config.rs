use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use cursor_memory::MemoryCursorConfig;
use format_xml::XmlWriterOptions;

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "tabula", about = "Render tabular datasets as streaming JSON or XML")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a dataset to stdout
    Render(RenderArgs),
    /// Print the dataset's columns and properties as JSON
    Schema(SchemaArgs),
}

#[derive(Args, Clone, Debug)]
pub struct RenderArgs {
    /// Dataset JSON file, `-` for stdin
    #[arg(long)]
    pub input: PathBuf,
    /// Output format (overrides config)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
    /// XML root element name
    #[arg(long)]
    pub root: Option<String>,
    /// XML row element name
    #[arg(long)]
    pub row: Option<String>,
    /// One row per line (JSON) / indented elements (XML)
    #[arg(long)]
    pub pretty: bool,
    /// Path to TOML config file
    #[arg(long, env = "TABULA_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct SchemaArgs {
    /// Dataset JSON file, `-` for stdin
    #[arg(long)]
    pub input: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Xml,
}

// ---- TOML Config ----

#[derive(Debug, Default, Deserialize)]
pub struct TabulaConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub pretty: bool,
    #[serde(default)]
    pub xml: XmlConfig,
    /// Limits for the in-memory cursor.
    #[serde(default)]
    pub memory: MemoryCursorConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct XmlConfig {
    /// Root element name; falls back to `results`.
    pub root: Option<String>,
    /// Row element name; falls back to `result`.
    pub row: Option<String>,
    #[serde(flatten)]
    pub writer: XmlWriterOptions,
}

impl TabulaConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::Config {
            context: "read",
            detail: format!("'{}': {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| CliError::Config {
            context: "parse",
            detail: format!("'{}': {e}", path.display()),
        })
    }

    /// Config from `path`, or defaults when no path was given.
    pub fn load_opt(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
