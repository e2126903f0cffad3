//! Folding normalized trees into one configuration
//!
//! Sources are merged lowest priority first. Each top-level section follows its
//! [`MergePolicy`]: deep-merge sections keep leaves the incoming tree does not
//! mention, replace sections are swapped out wholesale.

use serde_json::Value;

use super::policy::{MergePolicy, MergePolicyTable};
use super::tree::ConfigTree;

/// Merge `incoming` on top of `accumulator`.
pub fn merge(
    mut accumulator: ConfigTree,
    incoming: ConfigTree,
    policies: &MergePolicyTable,
) -> ConfigTree {
    for (section, value) in incoming {
        match policies.policy_for(&section) {
            MergePolicy::Replace => {
                accumulator.insert(section, value);
            }
            MergePolicy::DeepMerge => match accumulator.get_mut(&section) {
                Some(existing) => deep_merge(existing, value),
                None => {
                    accumulator.insert(section, value);
                }
            },
        }
    }
    accumulator
}

/// Fold a sequence of trees, in ascending priority, starting from empty.
pub fn merge_all<I>(trees: I, policies: &MergePolicyTable) -> ConfigTree
where
    I: IntoIterator<Item = ConfigTree>,
{
    trees.into_iter().fold(ConfigTree::new(), |acc, tree| merge(acc, tree, policies))
}

fn deep_merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(target), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        // Scalars and sequences are leaves.
        (target, incoming) => *target = incoming,
    }
}
