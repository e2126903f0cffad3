//! Command-line interface for loom
//!
//! Parses the flags, wires the fixed source order into a [`ConfigLoader`] and
//! prints the resolved configuration.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ConfigLoader;

mod render;

pub use render::OutputFormat;

/// Resolve the loom server configuration from defaults, environment, config files and flags
#[derive(Parser, Debug)]
#[command(name = "loom")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The port to listen on.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<String>,

    /// A YAML config file or directory of YAML files to load, can be invoked
    /// multiple times and later files will override earlier.
    #[arg(short, long, value_name = "PATH")]
    pub config: Vec<PathBuf>,

    /// Defaults file loaded before everything else
    #[arg(long, value_name = "FILE", default_value = "defaults.yaml")]
    pub defaults: PathBuf,

    /// How to print the resolved configuration
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The flag object handed to the loader as the highest-priority source.
    ///
    /// Only flags that were actually given appear, so an absent `--port` never
    /// masks a lower-priority value.
    pub fn flag_values(&self) -> Map<String, Value> {
        let mut flags = Map::new();
        if let Some(port) = &self.port {
            flags.insert("port".to_string(), Value::String(port.clone()));
        }
        flags
    }

    pub fn loader(&self) -> ConfigLoader {
        ConfigLoader::standard(&self.defaults, self.config.iter().cloned(), self.flag_values())
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let loader = cli.loader();
    let config = loader.load().context("Failed to load configuration")?;

    print!("{}", render::render(&config, cli.format)?);
    Ok(())
}

// RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn port_flag_becomes_flat_key() {
        let cli = Cli::parse_from(["loom", "-p", "9090"]);
        assert_eq!(Value::Object(cli.flag_values()), json!({"port": "9090"}));
    }

    #[test]
    fn absent_flags_produce_empty_object() {
        let cli = Cli::parse_from(["loom"]);
        assert!(cli.flag_values().is_empty());
        assert_eq!(cli.defaults, PathBuf::from("defaults.yaml"));
    }

    #[test]
    fn config_is_repeatable_and_ordered() {
        let cli = Cli::parse_from(["loom", "-c", "a.yaml", "--config", "conf.d", "-c", "b.yaml"]);
        assert_eq!(
            cli.config,
            vec![PathBuf::from("a.yaml"), PathBuf::from("conf.d"), PathBuf::from("b.yaml")]
        );
    }
}
