//! Memoized, single-flight configuration loading
//!
//! A [`ConfigLoader`] collects sources, then on the first [`ConfigLoader::load`]
//! reads, normalizes and merges them in priority order. The outcome is terminal:
//! later calls get the cached tree (or the same error) without touching any
//! source again. Concurrent first calls wait for the one pipeline in flight.

use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use super::error::LoadError;
use super::merge::merge;
use super::normalize::SourceNormalizer;
use super::policy::MergePolicyTable;
use super::source::{FsSourceReader, Priority, Source, SourceReader};
use super::tree::ConfigTree;

/// Observable loader state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

enum State {
    Unloaded(Vec<(Priority, Source)>),
    Loading,
    Loaded(Arc<ConfigTree>),
    Failed(LoadError),
}

impl State {
    fn observe(&self) -> LoaderState {
        match self {
            State::Unloaded(_) => LoaderState::Unloaded,
            State::Loading => LoaderState::Loading,
            State::Loaded(_) => LoaderState::Loaded,
            State::Failed(_) => LoaderState::Failed,
        }
    }
}

pub struct ConfigLoader<R = FsSourceReader> {
    reader: R,
    normalizer: SourceNormalizer,
    policies: MergePolicyTable,
    state: Mutex<State>,
    settled: Condvar,
}

impl ConfigLoader<FsSourceReader> {
    pub fn new() -> Self {
        Self::with_reader(FsSourceReader)
    }

    /// A loader with the fixed source order: defaults file, environment,
    /// override paths as given, then command-line flags.
    pub fn standard(
        defaults: impl Into<PathBuf>,
        overrides: impl IntoIterator<Item = PathBuf>,
        flags: Map<String, Value>,
    ) -> Self {
        let loader = Self::new();
        let mut sources = vec![
            (Priority::Defaults, Source::DefaultsFile(defaults.into())),
            (Priority::Environment, Source::Environment),
        ];
        sources.extend(
            overrides
                .into_iter()
                .enumerate()
                .map(|(i, path)| (Priority::Override(i), Source::Overrides(path))),
        );
        sources.push((Priority::CommandLine, Source::CommandLine(flags)));

        *loader.lock() = State::Unloaded(sources);
        loader
    }
}

impl Default for ConfigLoader<FsSourceReader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: SourceReader> ConfigLoader<R> {
    pub fn with_reader(reader: R) -> Self {
        Self {
            reader,
            normalizer: SourceNormalizer::default(),
            policies: MergePolicyTable::default(),
            state: Mutex::new(State::Unloaded(Vec::new())),
            settled: Condvar::new(),
        }
    }

    pub fn state(&self) -> LoaderState {
        self.lock().observe()
    }

    /// Add a source. Only allowed before the first `load`.
    ///
    /// Sources with equal priority keep registration order.
    pub fn register_source(&self, source: Source, priority: Priority) -> Result<(), LoadError> {
        let mut state = self.lock();
        let State::Unloaded(sources) = &mut *state else {
            return Err(LoadError::SourcesSealed);
        };
        let at = sources.partition_point(|(p, _)| *p <= priority);
        sources.insert(at, (priority, source));
        Ok(())
    }

    /// Produce the merged configuration, running the pipeline at most once.
    pub fn load(&self) -> Result<Arc<ConfigTree>, LoadError> {
        let mut state = self.lock();
        while matches!(*state, State::Loading) {
            state = self.settled.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        match &*state {
            State::Loaded(tree) => return Ok(Arc::clone(tree)),
            State::Failed(err) => return Err(err.clone()),
            State::Unloaded(_) | State::Loading => {}
        }

        let State::Unloaded(sources) = std::mem::replace(&mut *state, State::Loading) else {
            unreachable!("waited until no load was in flight");
        };
        drop(state);

        let in_flight = InFlight { loader: self, done: false };
        let outcome = self.run(&sources).map(Arc::new);
        in_flight.settle(match &outcome {
            Ok(tree) => State::Loaded(Arc::clone(tree)),
            Err(err) => State::Failed(err.clone()),
        });

        outcome
    }

    fn run(&self, sources: &[(Priority, Source)]) -> Result<ConfigTree, LoadError> {
        let mut config = ConfigTree::new();
        for (priority, source) in sources {
            tracing::debug!("Loading config source {:?} ({:?})", source_label(source), priority);
            let raws = self.reader.read(source).inspect_err(|e| {
                tracing::debug!("Config source failed, aborting load: {e}");
            })?;
            for raw in raws {
                let tree = self.normalizer.normalize(raw)?;
                config = merge(config, tree, &self.policies);
            }
        }
        tracing::info!("Configuration loaded from {} sources", sources.len());
        Ok(config)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Publishes the outcome of the running pipeline and wakes waiters. If the
/// pipeline unwinds first, the load is marked failed so nobody waits forever.
struct InFlight<'a, R: SourceReader> {
    loader: &'a ConfigLoader<R>,
    done: bool,
}

impl<R: SourceReader> InFlight<'_, R> {
    fn settle(mut self, outcome: State) {
        self.publish(outcome);
    }

    fn publish(&mut self, outcome: State) {
        *self.loader.lock() = outcome;
        self.done = true;
        self.loader.settled.notify_all();
    }
}

impl<R: SourceReader> Drop for InFlight<'_, R> {
    fn drop(&mut self) {
        if !self.done {
            tracing::error!("Configuration load panicked while reading sources");
            self.publish(State::Failed(LoadError::Interrupted));
        }
    }
}

fn source_label(source: &Source) -> String {
    match source {
        Source::DefaultsFile(path) => format!("defaults {}", path.display()),
        Source::Environment => "environment".to_string(),
        Source::Overrides(path) => format!("override {}", path.display()),
        Source::CommandLine(_) => "command line".to_string(),
    }
}
