//! Per-section merge policy

/// How a top-level section combines with what earlier sources produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// The later source's subtree replaces the earlier one entirely.
    Replace,
    /// The subtrees are combined leaf by leaf; later leaves win.
    DeepMerge,
}

/// Sections that merge field by field. Everything else is replaced.
pub const DEEP_MERGE_SECTIONS: &[&str] = &["server", "db", "storage", "tokens"];

#[derive(Debug, Clone, Copy)]
pub struct MergePolicyTable {
    deep_merge: &'static [&'static str],
}

impl Default for MergePolicyTable {
    fn default() -> Self {
        Self::new(DEEP_MERGE_SECTIONS)
    }
}

impl MergePolicyTable {
    pub const fn new(deep_merge: &'static [&'static str]) -> Self {
        Self { deep_merge }
    }

    pub fn policy_for(&self, section: &str) -> MergePolicy {
        if self.deep_merge.contains(&section) {
            MergePolicy::DeepMerge
        } else {
            MergePolicy::Replace
        }
    }

    /// The sections this table names explicitly.
    pub fn sections(&self) -> &'static [&'static str] {
        self.deep_merge
    }

    pub fn is_known_section(&self, name: &str) -> bool {
        self.deep_merge.contains(&name)
    }
}
