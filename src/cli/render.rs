//! Printing the resolved configuration

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde_json::Value;

use crate::config::ConfigTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

pub fn render(config: &ConfigTree, format: OutputFormat) -> Result<String> {
    let value = Value::Object(config.clone());
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(&value).context("Failed to render YAML"),
        OutputFormat::Json => serde_json::to_string_pretty(&value)
            .map(|s| s + "\n")
            .context("Failed to render JSON"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ConfigTree {
        json!({"server": {"port": 9090}}).as_object().cloned().expect("object")
    }

    #[test]
    fn renders_yaml() {
        let out = render(&sample(), OutputFormat::Yaml).expect("yaml");
        assert_eq!(out, "server:\n  port: 9090\n");
    }

    #[test]
    fn renders_json() {
        let out = render(&sample(), OutputFormat::Json).expect("json");
        let parsed: Value = serde_json::from_str(&out).expect("valid json");
        assert_eq!(parsed, json!({"server": {"port": 9090}}));
    }
}
