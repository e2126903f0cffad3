//! Layered configuration loading and merging
//!
//! Combines the defaults file, the environment, override files and command-line
//! flags into one nested tree, with precedence CLI > Overrides > Env > Defaults.

pub mod alias;
pub mod error;
pub mod loader;
pub mod merge;
pub mod normalize;
pub mod policy;
pub mod source;
pub mod tree;

pub use alias::AliasMap;
pub use error::{LoadError, LoadErrorKind};
pub use loader::{ConfigLoader, LoaderState};
pub use merge::{merge, merge_all};
pub use normalize::SourceNormalizer;
pub use policy::{MergePolicy, MergePolicyTable};
pub use source::{FsSourceReader, Priority, RawSource, Source, SourceKind, SourceReader};
pub use tree::{get_path, insert_path, ConfigTree, DottedPath};
