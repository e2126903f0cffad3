//! Flat alias table
//!
//! Flat keys (as given on the command line or in the environment) that map onto
//! nested paths of the configuration tree.

use super::tree::DottedPath;

/// `(flat key, dotted target path)` pairs.
pub const ALIASES: &[(&str, &str)] = &[
    ("host", "server.host"),
    ("port", "server.port"),
    ("dbHost", "db.host"),
    ("dbPort", "db.port"),
    ("dbName", "db.db"),
    ("storageLogsTable", "storage.logsTable"),
    ("storageMetaTable", "storage.metaTable"),
    ("storageDataDir", "storage.dataDir"),
    ("storageTailTimeout", "storage.tailTimeout"),
    ("storageCompress", "storage.compress"),
];

/// Read-only lookup over a static alias table.
#[derive(Debug, Clone, Copy)]
pub struct AliasMap {
    entries: &'static [(&'static str, &'static str)],
}

impl Default for AliasMap {
    fn default() -> Self {
        Self::new(ALIASES)
    }
}

impl AliasMap {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, flat_key: &str) -> Option<DottedPath> {
        self.entries
            .iter()
            .find(|(key, _)| *key == flat_key)
            .map(|(_, target)| DottedPath::parse(target))
    }

    /// Lookup for environment variable names.
    ///
    /// Tries the exact key first, then compares case-insensitively with
    /// underscores removed, so `DB_HOST` resolves like `dbHost`.
    pub fn lookup_env(&self, var_name: &str) -> Option<DottedPath> {
        if let Some(path) = self.lookup(var_name) {
            return Some(path);
        }
        let folded = fold_env_name(var_name);
        self.entries
            .iter()
            .find(|(key, _)| key.to_ascii_lowercase() == folded)
            .map(|(_, target)| DottedPath::parse(target))
    }
}

fn fold_env_name(name: &str) -> String {
    name.chars().filter(|c| *c != '_').map(|c| c.to_ascii_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_flat_keys_to_nested_paths() {
        let aliases = AliasMap::default();
        assert_eq!(aliases.lookup("host"), Some(DottedPath::parse("server.host")));
        assert_eq!(aliases.lookup("dbName"), Some(DottedPath::parse("db.db")));
        assert_eq!(
            aliases.lookup("storageTailTimeout"),
            Some(DottedPath::parse("storage.tailTimeout"))
        );
    }

    #[test]
    fn exact_lookup_is_case_sensitive() {
        let aliases = AliasMap::default();
        assert_eq!(aliases.lookup("HOST"), None);
        assert_eq!(aliases.lookup("dbhost"), None);
        assert_eq!(aliases.lookup("unknown"), None);
    }

    #[test]
    fn env_lookup_folds_case_and_underscores() {
        let aliases = AliasMap::default();
        assert_eq!(aliases.lookup_env("PORT"), Some(DottedPath::parse("server.port")));
        assert_eq!(aliases.lookup_env("DB_HOST"), Some(DottedPath::parse("db.host")));
        assert_eq!(
            aliases.lookup_env("STORAGE_DATA_DIR"),
            Some(DottedPath::parse("storage.dataDir"))
        );
        assert_eq!(aliases.lookup_env("PATH"), None);
    }

    #[test]
    fn every_target_lives_under_a_known_section() {
        let sections = ["server", "db", "storage", "tokens"];
        for (_, target) in ALIASES {
            let path = DottedPath::parse(target);
            assert!(sections.contains(&path.section().expect("non-empty")), "{target}");
        }
    }
}
