//! # pluglens
//!
//! Loads a native plugin module, instantiates its root object and reports
//! either the `com.example.PluginInterface` name and version or, when no
//! known contract is implemented, the declared methods, properties and
//! enumerations.
//!
//! ```text
//! pluglens --path plugins/demo.so
//! pluglens --path plugins/legacy.so --format json
//! pluglens --dir plugins
//! ```
//!
//! Exit code is 0 on success, 1 when loading fails, the module exports no
//! root object or no metadata is available, and 2 on usage errors.

pub mod cli;
pub mod logging;

pub use cli::{parse_contract, run, run_with, Cli, OutputFormat};
pub use logging::{init_subscriber, TracingConfig, TracingFormat};
