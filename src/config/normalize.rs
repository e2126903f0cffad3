//! Source normalization
//!
//! Expands flat and aliased keys of one raw source into the nested tree shape
//! and coerces string scalars to booleans or numbers where that is unambiguous.
//!
//! Unmapped keys: file sources keep every top-level key as written. Environment
//! and command-line sources only keep an unmapped key when it names one of the
//! known sections, so unrelated variables such as `PATH` never leak into the
//! configuration.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};

use super::alias::AliasMap;
use super::error::LoadError;
use super::policy::DEEP_MERGE_SECTIONS;
use super::source::{RawSource, SourceKind};
use super::tree::{insert_path, ConfigTree, DottedPath};

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").expect("valid integer regex"));
static FLOAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(?:[0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)(?:[eE][-+]?[0-9]+)?$").expect("valid float regex")
});

#[derive(Debug, Clone, Copy)]
pub struct SourceNormalizer {
    aliases: AliasMap,
    known_sections: &'static [&'static str],
}

impl Default for SourceNormalizer {
    fn default() -> Self {
        Self::new(AliasMap::default(), DEEP_MERGE_SECTIONS)
    }
}

impl SourceNormalizer {
    pub fn new(aliases: AliasMap, known_sections: &'static [&'static str]) -> Self {
        Self { aliases, known_sections }
    }

    pub fn normalize(&self, raw: RawSource) -> Result<ConfigTree, LoadError> {
        let entries = match raw.values {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(LoadError::malformed(
                    raw.path,
                    format!("expected a mapping at the top level, found {}", type_name(&other)),
                ))
            }
        };

        let mut tree = ConfigTree::new();
        let mut aliased = Vec::new();

        for (key, value) in entries {
            if let Some(path) = self.resolve_alias(raw.kind, &key) {
                aliased.push((path, value));
            } else if self.keeps_unmapped(raw.kind, &key) {
                insert_path(&mut tree, &DottedPath::single(&key), coerce(value));
            } else {
                tracing::trace!("Dropping unmapped key {} from {:?} source", key, raw.kind);
            }
        }

        // Aliases are more specific than whole sections, so they land last.
        for (path, value) in aliased {
            insert_path(&mut tree, &path, coerce(value));
        }

        Ok(tree)
    }

    fn resolve_alias(&self, kind: SourceKind, key: &str) -> Option<DottedPath> {
        match kind {
            SourceKind::Environment => self.aliases.lookup_env(key),
            SourceKind::File | SourceKind::CommandLine => self.aliases.lookup(key),
        }
    }

    fn keeps_unmapped(&self, kind: SourceKind, key: &str) -> bool {
        match kind {
            SourceKind::File => true,
            SourceKind::Environment | SourceKind::CommandLine => self.known_sections.contains(&key),
        }
    }
}

/// Coerce a flat string scalar. Everything that is not a string is returned
/// untouched, including nested mappings.
pub fn coerce(value: Value) -> Value {
    let Value::String(s) = value else {
        return value;
    };
    match s.as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if INTEGER_RE.is_match(&s) {
        if let Ok(n) = s.parse::<i64>() {
            return Value::Number(n.into());
        }
        if let Ok(n) = s.parse::<u64>() {
            return Value::Number(n.into());
        }
    }
    if FLOAT_RE.is_match(&s) {
        if let Some(n) = s.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(s)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
