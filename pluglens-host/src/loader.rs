//! Loader façade
//!
//! Runs one load to completion on the calling thread:
//!
//! ```text
//! Idle ─► Opened ─► Probed ─┬─► CapabilityBound ─┐
//!   │        │              ├─► Introspected ────┼─► Closed
//!   │        │              └─► Failed ──────────┤
//!   └────────┴────────────────► Failed ──────────┘
//! ```
//!
//! Exactly one of `CapabilityBound`, `Introspected` or `Failed` is reached,
//! and `Closed` always follows. The root object is released before its module,
//! and the module is released on every path.

use crate::error::LoaderError;
use crate::introspect::{Introspector, MetadataIntrospector};
use crate::module::{LibraryOpener, ModuleOpener, PluginModule};
use crate::probe::{CapabilityContract, CapabilityProbe, ContractRegistry};
use crate::report::{CapabilityReport, Outcome};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// States of a single load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadState {
    Idle,
    Opened,
    Probed,
    CapabilityBound,
    Introspected,
    Failed,
    Closed,
}

/// Loader configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Contracts to probe, in priority order
    pub contracts: ContractRegistry,
}

impl LoaderConfig {
    /// Configuration with no contracts; every root object is introspected
    pub fn new() -> Self {
        Self {
            contracts: ContractRegistry::new(),
        }
    }

    /// Append a contract
    pub fn contract(mut self, contract: CapabilityContract) -> Self {
        self.contracts = self.contracts.register(contract);
        self
    }
}

impl Default for LoaderConfig {
    /// Probes `com.example.PluginInterface` only
    fn default() -> Self {
        Self {
            contracts: ContractRegistry::with_plugin_interface(),
        }
    }
}

/// Result of loading one module
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub path: PathBuf,

    #[serde(flatten)]
    pub outcome: Outcome,

    /// States visited, starting at `Idle`
    #[serde(skip)]
    pub states: Vec<LoadState>,
}

impl LoadReport {
    pub fn exit_code(&self) -> u8 {
        self.outcome.exit_code()
    }

    /// The terminal state reached before `Closed`
    pub fn terminal_state(&self) -> Option<LoadState> {
        self.states.iter().rev().copied().find(|state| {
            matches!(
                state,
                LoadState::CapabilityBound | LoadState::Introspected | LoadState::Failed
            )
        })
    }
}

/// Records and logs state transitions
struct Transitions<'p> {
    path: &'p Path,
    states: Vec<LoadState>,
}

impl<'p> Transitions<'p> {
    fn new(path: &'p Path) -> Self {
        Self {
            path,
            states: vec![LoadState::Idle],
        }
    }

    fn enter(&mut self, state: LoadState) {
        tracing::debug!(
            path = %self.path.display(),
            from = ?self.states.last(),
            to = ?state,
            "State transition"
        );
        self.states.push(state);
    }

    fn fail(&mut self, error: &LoaderError) -> Outcome {
        tracing::debug!(path = %self.path.display(), %error, "Load failed");
        self.enter(LoadState::Failed);
        Outcome::failed(error)
    }
}

/// Opens a module, probes its root object and introspects as a fallback
pub struct PluginLoader<O = LibraryOpener, I = MetadataIntrospector> {
    opener: O,
    probe: CapabilityProbe,
    introspector: I,
}

impl PluginLoader {
    /// Loader using the platform dynamic linker
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_parts(LibraryOpener, config, MetadataIntrospector)
    }
}

impl Default for PluginLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl<O: ModuleOpener, I: Introspector> PluginLoader<O, I> {
    /// Loader with a custom module opener and introspector
    pub fn with_parts(opener: O, config: LoaderConfig, introspector: I) -> Self {
        Self {
            opener,
            probe: CapabilityProbe::new(config.contracts),
            introspector,
        }
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    pub fn introspector(&self) -> &I {
        &self.introspector
    }

    pub fn contracts(&self) -> &ContractRegistry {
        self.probe.registry()
    }

    /// Load one module and report what it exposes
    ///
    /// Never panics on plugin-reported conditions; every failure is an
    /// [`Outcome::Failed`] carrying a message.
    pub fn load(&self, path: impl AsRef<Path>) -> LoadReport {
        let path = path.as_ref();
        let mut transitions = Transitions::new(path);
        tracing::info!(path = %path.display(), "Loading plugin");

        // 1. Open module
        let mut module = match self.opener.open(path) {
            Ok(module) => {
                transitions.enter(LoadState::Opened);
                module
            }
            Err(e) => {
                let outcome = transitions.fail(&e);
                transitions.enter(LoadState::Closed);
                return LoadReport {
                    path: path.to_path_buf(),
                    outcome,
                    states: transitions.states,
                };
            }
        };

        // 2-4. Root object, probe, introspect
        let outcome = self.inspect(&module, &mut transitions);

        // 5. Release
        module.close();
        transitions.enter(LoadState::Closed);

        if outcome.is_success() {
            tracing::info!(path = %path.display(), "Plugin loaded successfully");
        }

        LoadReport {
            path: path.to_path_buf(),
            outcome,
            states: transitions.states,
        }
    }

    /// Load each path independently
    pub fn load_all<P: AsRef<Path>>(&self, paths: impl IntoIterator<Item = P>) -> Vec<LoadReport> {
        paths.into_iter().map(|path| self.load(path)).collect()
    }

    fn inspect(&self, module: &O::Module, transitions: &mut Transitions<'_>) -> Outcome {
        let root = match module.root_object() {
            Ok(root) => root,
            Err(e) => return transitions.fail(&e),
        };
        transitions.enter(LoadState::Probed);

        if let Some(bound) = self.probe.probe(root.as_ref()) {
            transitions.enter(LoadState::CapabilityBound);
            return Outcome::Capability(CapabilityReport::from_bound(&bound));
        }

        let Some(root) = root.as_ref() else {
            return transitions.fail(&LoaderError::NullRoot {
                path: module.path().to_path_buf(),
            });
        };

        match self.introspector.introspect(root) {
            Ok(description) => {
                transitions.enter(LoadState::Introspected);
                Outcome::Introspected(description)
            }
            Err(e) => transitions.fail(&e),
        }
    }
}
