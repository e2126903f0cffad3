//! Configuration sources and the collaborator that reads them

use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::LoadError;

/// Extensions picked up when an override path is a directory.
const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// One origin of configuration data.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// The well-known defaults file. A missing file is tolerated.
    DefaultsFile(PathBuf),
    /// Process environment variables.
    Environment,
    /// A user-supplied override file, or a directory of them.
    Overrides(PathBuf),
    /// Flags already parsed from the command line.
    CommandLine(Map<String, Value>),
}

/// Rank of a source. Lower ranks are merged first and lose conflicts.
///
/// Override files keep their command-line order through the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Defaults,
    Environment,
    Override(usize),
    CommandLine,
}

/// How a raw source came to be, which decides how its keys are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Environment,
    CommandLine,
}

/// Key/value data from one origin, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSource {
    pub kind: SourceKind,
    pub path: Option<PathBuf>,
    pub values: Value,
}

impl RawSource {
    pub fn file(path: impl Into<PathBuf>, values: Value) -> Self {
        Self { kind: SourceKind::File, path: Some(path.into()), values }
    }

    pub fn environment<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values =
            vars.into_iter().map(|(k, v)| (k.into(), Value::String(v.into()))).collect::<Map<_, _>>();
        Self { kind: SourceKind::Environment, path: None, values: Value::Object(values) }
    }

    pub fn command_line(values: Map<String, Value>) -> Self {
        Self { kind: SourceKind::CommandLine, path: None, values: Value::Object(values) }
    }
}

/// Turns a registered [`Source`] into raw key/value data.
///
/// One source may produce several raw sources (a directory of files), returned
/// in the order they should be merged.
pub trait SourceReader {
    fn read(&self, source: &Source) -> Result<Vec<RawSource>, LoadError>;
}

/// Reads YAML files from disk and variables from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSourceReader;

impl SourceReader for FsSourceReader {
    fn read(&self, source: &Source) -> Result<Vec<RawSource>, LoadError> {
        match source {
            Source::DefaultsFile(path) => {
                if !path.exists() {
                    tracing::warn!("Defaults file {} not found, skipping", path.display());
                    return Ok(Vec::new());
                }
                Ok(vec![read_file(path)?])
            }
            Source::Environment => Ok(vec![RawSource::environment(env_vars())]),
            Source::Overrides(path) => read_overrides(path),
            Source::CommandLine(flags) => Ok(vec![RawSource::command_line(flags.clone())]),
        }
    }
}

/// Snapshot of the process environment. Variables that are not valid UTF-8
/// cannot name or carry configuration and are skipped.
fn env_vars() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                tracing::trace!("Skipping non UTF-8 environment variable {:?}", key);
                None
            }
        })
        .collect()
}

fn read_overrides(path: &Path) -> Result<Vec<RawSource>, LoadError> {
    let metadata = fs::metadata(path).map_err(|e| LoadError::unreadable(path, e))?;
    if !metadata.is_dir() {
        return Ok(vec![read_file(path)?]);
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(path).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| LoadError::unreadable(path, e))?;
        // Follows symlinks, as in ConfigMap mounts and /etc/*.d layouts.
        if entry.path().is_file() && has_config_extension(entry.path()) {
            sources.push(read_file(entry.path())?);
        }
    }
    tracing::debug!("Found {} config files in {}", sources.len(), path.display());
    Ok(sources)
}

fn has_config_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CONFIG_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Parse one file as YAML (JSON documents parse as YAML too).
pub fn read_file(path: &Path) -> Result<RawSource, LoadError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::InvalidData => LoadError::malformed(Some(path.to_path_buf()), e),
        _ => LoadError::unreadable(path, e),
    })?;
    if content.trim().is_empty() {
        return Ok(RawSource::file(path, Value::Null));
    }
    let malformed = |e: &dyn std::fmt::Display| LoadError::malformed(Some(path.to_path_buf()), e);
    let mut yaml: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| malformed(&e))?;
    yaml.apply_merge().map_err(|e| malformed(&e))?;
    let values = serde_json::to_value(yaml).map_err(|e| malformed(&e))?;
    Ok(RawSource::file(path, values))
}
